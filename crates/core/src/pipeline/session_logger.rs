use std::time::Instant;

/// Cross-cutting reporter for session events.
///
/// Decouples the session runner from specific output mechanisms (stdout,
/// log crate, tests) so each caller can observe a session without changing
/// the orchestration code.
pub trait SessionLogger: Send {
    /// Report frame-level progress. `total` is 0 when the length is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Log a problem that did not stop the session.
    fn warn(&mut self, message: &str);

    /// Emit a titled block of report lines.
    fn report(&mut self, title: &str, lines: &[String]);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
    fn report(&mut self, _title: &str, _lines: &[String]) {}
}

/// CLI-oriented logger backed by the `log` facade.
///
/// Progress output is throttled to every `throttle_frames` frames.
/// Messages and report blocks are kept for the closing summary.
pub struct LogSessionLogger {
    throttle_frames: usize,
    start_time: Instant,
    frames: usize,
    messages: Vec<String>,
    warnings: Vec<String>,
}

impl LogSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            start_time: Instant::now(),
            frames: 0,
            messages: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns the formatted summary string, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.messages.is_empty() && self.warnings.is_empty() {
            return None;
        }
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} frames, {elapsed:.1}s total):",
            self.frames
        )];
        if self.frames > 0 && elapsed > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames as f64 / elapsed
            ));
        }
        lines.push(format!("  Warnings: {}", self.warnings.len()));
        Some(lines.join("\n"))
    }
}

impl Default for LogSessionLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl SessionLogger for LogSessionLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames = self.frames.max(current);
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Processing: {current} frames");
        }
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
        log::warn!("{message}");
    }

    fn report(&mut self, title: &str, lines: &[String]) {
        let mut block = vec![title.to_string()];
        block.extend(lines.iter().map(|l| format!("  {l}")));
        let text = block.join("\n");
        log::info!("\n\n{text}");
        self.messages.push(text);
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullSessionLogger;
        logger.progress(1, 10);
        logger.info("hello");
        logger.warn("careful");
        logger.report("Title", &["line".to_string()]);
        logger.summary();
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = LogSessionLogger::new(10);
        logger.info("hello world");
        assert_eq!(logger.messages(), ["hello world"]);
    }

    #[test]
    fn test_warn_is_kept_apart() {
        let mut logger = LogSessionLogger::new(10);
        logger.warn("publish failed");
        assert!(logger.messages().is_empty());
        assert_eq!(logger.warnings(), ["publish failed"]);
    }

    #[test]
    fn test_report_block_indents_lines() {
        let mut logger = LogSessionLogger::new(10);
        logger.report("Output", &["Frames written: 3".to_string()]);
        assert_eq!(logger.messages()[0], "Output\n  Frames written: 3");
    }

    #[test]
    fn test_progress_tracks_frames() {
        let mut logger = LogSessionLogger::new(10);
        for i in 1..=25 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames, 25);
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = LogSessionLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_summary_counts_warnings() {
        let mut logger = LogSessionLogger::new(10);
        logger.progress(5, 5);
        logger.warn("one");
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (5 frames"));
        assert!(summary.contains("Warnings: 1"));
    }

    #[test]
    fn test_default_throttle() {
        let logger = LogSessionLogger::default();
        assert_eq!(logger.throttle_frames, 30);
    }
}
