use std::path::PathBuf;

/// Stream properties reported by a frame source or requested from an encoder.
///
/// `total_frames == 0` means the length is unknown (live streams, or
/// containers that do not record a frame count).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Parameters for opening an encoder: geometry and rate only.
    pub fn for_encoder(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            total_frames: 0,
            codec: String::new(),
            source_path: None,
        }
    }

    /// Returns a copy whose frame rate is replaced by `fallback` when the
    /// reported rate is missing or non-positive.
    pub fn with_fallback_fps(mut self, fallback: f64) -> Self {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            self.fps = fallback;
        }
        self
    }
}
