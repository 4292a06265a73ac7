use std::fmt::Write as _;
use std::path::Path;

use crate::foundation::error::{ElephantError, ElephantResult};

/// One caption, shown on `[start_secs, end_secs)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubtitleCue {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

impl SubtitleCue {
    pub fn validate(&self) -> ElephantResult<()> {
        if !(self.start_secs.is_finite() && self.end_secs.is_finite()) {
            return Err(ElephantError::validation("subtitle times must be finite"));
        }
        if self.start_secs < 0.0 || self.end_secs <= self.start_secs {
            return Err(ElephantError::validation(format!(
                "subtitle '{}' must end after it starts, at a non-negative time",
                self.text
            )));
        }
        if self.text.contains("-->") {
            return Err(ElephantError::validation(
                "subtitle text must not contain '-->'",
            ));
        }
        Ok(())
    }
}

/// `HH:MM:SS.mmm`, rounded to the nearest millisecond.
pub fn vtt_timestamp(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let (h, rem) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (m, rem) = (rem / 60_000, rem % 60_000);
    let (s, ms) = (rem / 1000, rem % 1000);
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Render cues as a WebVTT document. Blank lines inside a caption are dropped, since they would
/// end the cue early.
pub fn to_webvtt(cues: &[SubtitleCue]) -> ElephantResult<String> {
    let mut out = String::from("WEBVTT\n");
    for (i, cue) in cues.iter().enumerate() {
        cue.validate()?;
        let text: Vec<&str> = cue
            .text
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        let _ = write!(
            out,
            "\n{}\n{} --> {}\n{}\n",
            i + 1,
            vtt_timestamp(cue.start_secs),
            vtt_timestamp(cue.end_secs),
            text.join("\n")
        );
    }
    Ok(out)
}

pub fn write_webvtt_file(cues: &[SubtitleCue], path: &Path) -> ElephantResult<()> {
    let doc = to_webvtt(cues)?;
    crate::encode::ffmpeg::ensure_parent_dir(path)?;
    std::fs::write(path, doc).map_err(|e| {
        ElephantError::evaluation(format!(
            "failed to write subtitles '{}': {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/subtitles.rs"]
mod tests;
