use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::display::frame_display::{DisplayAction, FrameDisplay};
use crate::display::letterbox::fit_to_canvas;
use crate::output::video_output_manager::VideoOutputManager;
use crate::shared::detection::FrameResult;

use super::inference_source::FrameSink;
use super::session_logger::SessionLogger;
use super::session_metrics::SessionMetrics;

pub const FIRST_FRAME_FAILED: &str =
    "First frame save failed - check video writer initialization";

/// Why a sink asked the source to stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The display requested quit.
    Quit,
    /// The shared cancel flag was raised.
    Cancelled,
    /// The configured frame limit was reached.
    FrameLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quit => write!(f, "quit requested"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::FrameLimit => write!(f, "frame limit reached"),
        }
    }
}

/// Frame callback for one session.
///
/// Shows a letterboxed copy of each frame, forwards the full-resolution
/// frame to the output manager and accounts metrics. Borrowed state is owned
/// by the runner.
pub struct DisplaySink<'a> {
    manager: &'a mut VideoOutputManager,
    metrics: &'a mut SessionMetrics,
    display: &'a mut dyn FrameDisplay,
    logger: &'a mut dyn SessionLogger,
    canvas: (u32, u32),
    cancelled: Arc<AtomicBool>,
    max_frames: Option<usize>,
    handled: usize,
    display_failed: bool,
    first_failure_recorded: bool,
    stop_reason: Option<StopReason>,
}

impl<'a> DisplaySink<'a> {
    pub fn new(
        manager: &'a mut VideoOutputManager,
        metrics: &'a mut SessionMetrics,
        display: &'a mut dyn FrameDisplay,
        logger: &'a mut dyn SessionLogger,
        canvas: (u32, u32),
        cancelled: Arc<AtomicBool>,
        max_frames: Option<usize>,
    ) -> Self {
        Self {
            manager,
            metrics,
            display,
            logger,
            canvas,
            cancelled,
            max_frames,
            handled: 0,
            display_failed: false,
            first_failure_recorded: false,
            stop_reason: None,
        }
    }

    pub fn handled(&self) -> usize {
        self.handled
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    fn stop(&mut self, reason: StopReason) -> bool {
        if self.stop_reason.is_none() {
            self.logger.info(&format!("Stopping session: {reason}"));
            self.stop_reason = Some(reason);
        }
        false
    }

    fn show(&mut self, result: &FrameResult) -> DisplayAction {
        let (width, height) = self.canvas;
        let letterboxed = fit_to_canvas(&result.frame, width, height);
        match self.display.show(&letterboxed) {
            Ok(action) => action,
            Err(e) => {
                if !self.display_failed {
                    self.display_failed = true;
                    self.logger.warn(&format!("Display failed: {e}"));
                }
                DisplayAction::Continue
            }
        }
    }
}

impl FrameSink for DisplaySink<'_> {
    fn on_prediction(&mut self, result: &FrameResult) -> bool {
        if self.stop_reason.is_some() {
            return false;
        }
        if self.cancelled.load(Ordering::Relaxed) {
            return self.stop(StopReason::Cancelled);
        }

        let started = Instant::now();
        let action = self.show(result);

        let saved = self.manager.write_frame(&result.frame);
        if !saved && self.manager.frames_written() == 0 && !self.first_failure_recorded {
            self.first_failure_recorded = true;
            self.manager.record(FIRST_FRAME_FAILED);
        }

        if action == DisplayAction::Quit {
            return self.stop(StopReason::Quit);
        }

        self.metrics.record_frame(started.elapsed());
        for class_name in result.class_names() {
            self.metrics.record_detection(class_name);
        }

        self.handled += 1;
        self.logger
            .progress(self.handled, self.manager.expected_frame_count());

        if self.max_frames.is_some_and(|max| self.handled >= max) {
            return self.stop(StopReason::FrameLimit);
        }
        true
    }
}
