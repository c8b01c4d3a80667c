use std::path::Path;

/// Reads how many frames a video file holds without decoding it.
pub trait FrameCountProbe: Send {
    fn frame_count(&self, path: &Path) -> Result<usize, Box<dyn std::error::Error>>;
}
