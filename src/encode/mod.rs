//! Frame sinks.
//!
//! Sinks consume composed RGB24 frames strictly in frame order.

/// `ffmpeg` file encoder.
pub mod ffmpeg;
/// `ffplay` live preview.
pub mod preview;
/// Sink trait and the in-memory sink.
pub mod sink;
