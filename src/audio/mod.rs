/// `ffmpeg`-backed clip decoding.
pub mod media;
/// Cue list, manifest, and mixdown.
pub mod mix;
/// WebVTT caption output.
pub mod subtitles;
