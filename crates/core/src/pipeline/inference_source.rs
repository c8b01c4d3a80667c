use crate::shared::detection::FrameResult;

/// Receives one processed frame at a time from an [`InferenceSource`].
///
/// Returning `false` asks the source to stop delivering frames.
pub trait FrameSink {
    fn on_prediction(&mut self, result: &FrameResult) -> bool;
}

/// External pipeline that reads an input reference, runs inference and
/// calls back into a [`FrameSink`] once per processed frame.
///
/// The source owns the loop; the session runner only sees the callbacks.
pub trait InferenceSource: Send {
    /// Reads frames for `reference` until the input is exhausted or the sink
    /// returns `false`. Returns the number of frames delivered.
    fn run(
        &mut self,
        reference: &str,
        sink: &mut dyn FrameSink,
    ) -> Result<usize, Box<dyn std::error::Error>>;

    /// Releases any resources held by the source. Safe to call repeatedly.
    fn terminate(&mut self);
}
