use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::display::frame_display::FrameDisplay;
use crate::output::domain::output_report::OutputReport;
use crate::output::domain::source::SourceKind;
use crate::output::video_output_manager::VideoOutputManager;

use super::display_sink::{DisplaySink, StopReason};
use super::inference_source::InferenceSource;
use super::session_logger::SessionLogger;
use super::session_metrics::{MetricsSummary, SessionMetrics};

/// How the frame loop of a session ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionTermination {
    /// The source ran out of frames.
    Exhausted,
    /// The sink asked the source to stop.
    Stopped(StopReason),
    /// The source returned an error.
    Failed(String),
}

impl fmt::Display for SessionTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "input exhausted"),
            Self::Stopped(reason) => write!(f, "stopped ({reason})"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Everything a finished session produced.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub source_kind: SourceKind,
    pub termination: SessionTermination,
    pub frames_handled: usize,
    /// `None` for live sources.
    pub output: Option<OutputReport>,
    /// Published path, else local path, else `None`.
    pub saved_file: Option<PathBuf>,
    pub metrics: MetricsSummary,
    pub audit_table: Vec<String>,
}

/// Drives one session end to end.
///
/// Classifies the input, lets the source push frames through a
/// [`DisplaySink`], then finalizes the output and terminates the source on
/// every exit path. Single-use: a second `execute` fails.
pub struct RunSessionUseCase {
    manager: VideoOutputManager,
    source: Box<dyn InferenceSource>,
    display: Box<dyn FrameDisplay>,
    logger: Box<dyn SessionLogger>,
    canvas: (u32, u32),
    max_frames: Option<usize>,
    cancelled: Arc<AtomicBool>,
    executed: bool,
}

impl RunSessionUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        manager: VideoOutputManager,
        source: Box<dyn InferenceSource>,
        display: Box<dyn FrameDisplay>,
        logger: Box<dyn SessionLogger>,
        canvas: (u32, u32),
        max_frames: Option<usize>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            manager,
            source,
            display,
            logger,
            canvas,
            max_frames,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
            executed: false,
        }
    }

    /// Handle for stopping the session from another thread.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn manager(&self) -> &VideoOutputManager {
        &self.manager
    }

    pub fn execute(&mut self, reference: &str) -> Result<SessionReport, Box<dyn std::error::Error>> {
        if self.executed {
            return Err("Session already executed".into());
        }
        self.executed = true;

        let source_kind = self.manager.classify_source(reference);
        match source_kind {
            SourceKind::File => self
                .logger
                .info(&format!("Processing video file {reference} (display + save)")),
            SourceKind::LiveStream => self
                .logger
                .info(&format!("Processing live source {reference} (display only)")),
        }

        let mut metrics = SessionMetrics::new();
        let (run_result, frames_handled, stop_reason) = {
            let mut sink = DisplaySink::new(
                &mut self.manager,
                &mut metrics,
                self.display.as_mut(),
                self.logger.as_mut(),
                self.canvas,
                Arc::clone(&self.cancelled),
                self.max_frames,
            );
            let result = self.source.run(reference, &mut sink);
            (result, sink.handled(), sink.stop_reason())
        };

        let termination = match (run_result, stop_reason) {
            (Err(e), _) => {
                let reason = e.to_string();
                self.logger.warn(&format!("Source error: {reason}"));
                self.manager.record(format!("Session ended abnormally: {reason}"));
                SessionTermination::Failed(reason)
            }
            (Ok(_), Some(reason)) => SessionTermination::Stopped(reason),
            (Ok(_), None) => SessionTermination::Exhausted,
        };

        let saved_file = self.manager.finalize_and_publish();
        self.source.terminate();

        let report = SessionReport {
            source_kind,
            termination,
            frames_handled,
            output: self.manager.report(),
            saved_file,
            metrics: metrics.summary(),
            audit_table: self.manager.audit_table(),
        };
        self.log_report(&report);
        Ok(report)
    }

    fn log_report(&mut self, report: &SessionReport) {
        self.logger.info(&format!("Session {}", report.termination));

        if let Some(output) = &report.output {
            self.logger.report("Output", &output.lines());
            match &report.saved_file {
                Some(path) => self.logger.info(&format!("Final result: {}", path.display())),
                None => self
                    .logger
                    .warn("Video processing failed - check the diagnostics below"),
            }
            self.logger.report("Diagnostics", &report.audit_table);
        } else {
            self.logger
                .info("Live source: real-time only, nothing was saved");
        }

        if report.metrics.total_frames > 0 {
            self.logger.report("Performance", &report.metrics.lines());
        }
        self.logger.summary();
    }
}
