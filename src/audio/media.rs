use std::path::Path;

use crate::foundation::error::{ElephantError, ElephantResult};

/// Sample rate every clip is resampled to before mixing.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Channel layout of the mix.
pub const MIX_CHANNELS: u16 = 2;

const STAGE: &str = "audio decode";

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Decode any audio file `ffmpeg` understands into stereo `f32` PCM at `sample_rate`.
#[tracing::instrument(level = "debug", fields(path = %path.display()))]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ElephantResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ElephantError::encode(STAGE, format!("failed to run ffmpeg: {e}")))?;

    if !out.status.success() {
        return Err(ElephantError::encode(
            STAGE,
            format!(
                "ffmpeg failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let interleaved_f32 = f32le_to_samples(&out.stdout)?;
    Ok(AudioPcm {
        sample_rate,
        channels: MIX_CHANNELS,
        interleaved_f32,
    })
}

pub(crate) fn f32le_to_samples(bytes: &[u8]) -> ElephantResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(ElephantError::encode(
            STAGE,
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
