use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::foundation::error::{ElephantError, ElephantResult};

/// One clip placed on the scene clock.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioCue {
    pub start_secs: f64,
    pub clip: PathBuf,
    #[serde(default = "unit_volume")]
    pub volume: f32,
}

fn unit_volume() -> f32 {
    1.0
}

impl AudioCue {
    pub fn new(start_secs: f64, clip: impl Into<PathBuf>) -> Self {
        Self {
            start_secs,
            clip: clip.into(),
            volume: 1.0,
        }
    }
}

/// Cues must start at non-negative times in non-decreasing order, with a finite non-negative volume.
pub fn validate_cues(cues: &[AudioCue]) -> ElephantResult<()> {
    let mut prev = 0.0;
    for cue in cues {
        if !(cue.start_secs.is_finite() && cue.start_secs >= 0.0) {
            return Err(ElephantError::validation(format!(
                "audio cue '{}' must start at a non-negative time",
                cue.clip.display()
            )));
        }
        if cue.start_secs < prev {
            return Err(ElephantError::validation(
                "audio cues must be ordered by start time",
            ));
        }
        if !(cue.volume.is_finite() && cue.volume >= 0.0) {
            return Err(ElephantError::validation(format!(
                "audio cue '{}' volume must be finite and non-negative",
                cue.clip.display()
            )));
        }
        prev = cue.start_secs;
    }
    Ok(())
}

/// A decoded clip at its place in the mix.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    pub start_sample: u64,
    pub volume: f32,
    /// Interleaved PCM in the manifest's rate and channel layout.
    pub pcm: Arc<Vec<f32>>,
}

impl AudioSegment {
    fn end_sample(&self, channels: u16) -> u64 {
        self.start_sample + (self.pcm.len() / usize::from(channels.max(1))) as u64
    }
}

/// Everything needed to produce the mixed track.
#[derive(Clone, Debug)]
pub struct AudioManifest {
    pub sample_rate: u32,
    pub channels: u16,
    /// Length of the mix in sample frames: the latest end over all segments.
    pub total_samples: u64,
    pub segments: Vec<AudioSegment>,
}

impl AudioManifest {
    pub fn from_segments(sample_rate: u32, channels: u16, segments: Vec<AudioSegment>) -> Self {
        let total_samples = segments
            .iter()
            .map(|s| s.end_sample(channels))
            .max()
            .unwrap_or(0);
        Self {
            sample_rate,
            channels,
            total_samples,
            segments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_samples == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.total_samples as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Decode every cue's clip and place it on the timeline.
#[tracing::instrument(level = "debug", skip(cues), fields(cues = cues.len()))]
pub fn build_audio_manifest(cues: &[AudioCue]) -> ElephantResult<AudioManifest> {
    validate_cues(cues)?;
    let mut segments = Vec::with_capacity(cues.len());
    for cue in cues {
        let pcm = decode_audio_f32_stereo(&cue.clip, MIX_SAMPLE_RATE)?;
        tracing::debug!(
            clip = %cue.clip.display(),
            start = cue.start_secs,
            secs = pcm.duration_secs(),
            "decoded audio cue"
        );
        segments.push(segment_for(cue, pcm));
    }
    Ok(AudioManifest::from_segments(
        MIX_SAMPLE_RATE,
        MIX_CHANNELS,
        segments,
    ))
}

pub(crate) fn segment_for(cue: &AudioCue, pcm: AudioPcm) -> AudioSegment {
    AudioSegment {
        start_sample: secs_to_sample(cue.start_secs, pcm.sample_rate),
        volume: cue.volume,
        pcm: Arc::new(pcm.interleaved_f32),
    }
}

/// Nearest sample frame to `secs`.
pub fn secs_to_sample(secs: f64, sample_rate: u32) -> u64 {
    (secs.max(0.0) * f64::from(sample_rate)).round() as u64
}

/// Sum all segments into one interleaved buffer, clamped to `[-1, 1]`.
pub fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let channels = usize::from(manifest.channels.max(1));
    let mut out = vec![0.0f32; manifest.total_samples as usize * channels];

    for seg in &manifest.segments {
        let offset = seg.start_sample as usize * channels;
        let Some(dst) = out.get_mut(offset..) else {
            continue;
        };
        for (d, s) in dst.iter_mut().zip(seg.pcm.iter()) {
            *d += s * seg.volume;
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_mix_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> ElephantResult<()> {
    crate::encode::ffmpeg::ensure_parent_dir(out_path)?;

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ElephantError::evaluation(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
