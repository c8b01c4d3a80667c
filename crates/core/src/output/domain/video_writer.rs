use std::path::Path;

use crate::output::domain::encoder::EncoderCandidate;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// An encoder handle bound to one output file.
///
/// A handle may exist without being usable: `is_opened` reports whether the
/// underlying encoder actually started. Handles that never opened must still
/// be released.
pub trait VideoWriter: Send {
    fn is_opened(&self) -> bool;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes and closes the file. Calling it again is a no-op.
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

/// Creates writers for a given encoder candidate, so the output manager can
/// probe encoders without depending on a specific codec library.
pub trait VideoWriterFactory: Send {
    fn create(
        &self,
        path: &Path,
        candidate: &EncoderCandidate,
        metadata: &VideoMetadata,
    ) -> Result<Box<dyn VideoWriter>, Box<dyn std::error::Error>>;
}
