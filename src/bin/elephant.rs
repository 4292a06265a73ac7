use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use elephant::{RenderThreading, SceneConfig, SvgRenderer, SvgScene};

/// Config file to load instead of the built-in scene.
const SCENE_ENV: &str = "ELEPHANT_SCENE";

#[derive(Parser, Debug)]
#[command(name = "elephant", version, about = "Render the elephant parade short")]
struct Cli {
    /// Play the animation with ffplay instead of encoding it to a file.
    #[arg(long)]
    preview: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = load_scene()?;
    cfg.validate()?;

    let scene = SvgScene::load(&cfg)?;
    let missing = scene.missing_layers();
    if !missing.is_empty() {
        tracing::warn!(?missing, "scene drawing lacks some layers");
    }
    let mut renderer = SvgRenderer::new(scene)?;
    let threading = RenderThreading {
        parallel: true,
        ..RenderThreading::default()
    };

    if cli.preview {
        elephant::preview(&cfg, &mut renderer, threading)?;
    } else {
        let stats = elephant::render_to_file(&cfg, &mut renderer, threading)?;
        eprintln!(
            "wrote {} ({} frames)",
            cfg.assets.output.display(),
            stats.frames_total
        );
    }
    Ok(())
}

fn load_scene() -> anyhow::Result<SceneConfig> {
    match std::env::var_os(SCENE_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            SceneConfig::from_path(&path)
                .with_context(|| format!("load scene config '{}'", path.display()))
        }
        None => Ok(SceneConfig::default()),
    }
}
