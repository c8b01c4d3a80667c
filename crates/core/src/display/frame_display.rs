use crate::shared::frame::Frame;

/// What the display surface asks the session to do after showing a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayAction {
    Continue,
    Quit,
}

/// Surface that shows letterboxed frames to the operator.
///
/// Implementations may be a window, a preview file, or nothing at all.
/// Returning [`DisplayAction::Quit`] ends the session the same way a quit
/// key does.
pub trait FrameDisplay: Send {
    fn show(&mut self, frame: &Frame) -> Result<DisplayAction, Box<dyn std::error::Error>>;
}

/// Headless display that accepts every frame.
pub struct NullDisplay;

impl FrameDisplay for NullDisplay {
    fn show(&mut self, _frame: &Frame) -> Result<DisplayAction, Box<dyn std::error::Error>> {
        Ok(DisplayAction::Continue)
    }
}
