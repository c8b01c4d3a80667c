use std::path::PathBuf;

/// What the single finalization of a session produced.
///
/// `local_saved` and `published` are kept apart: a session can save locally
/// and still fail to publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub local_saved: bool,
    pub published: bool,
    pub file_size_bytes: u64,
    /// Publish path if the copy succeeded, else the local path if it exists.
    pub result: Option<PathBuf>,
}

/// Terminal status of a recorded session.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputReport {
    pub source_identifier: String,
    pub frames_written: usize,
    pub expected_frames: usize,
    /// Description of the encoder in use, `None` if none opened.
    pub encoder: Option<String>,
    pub writer_initialized: bool,
    pub output_path: PathBuf,
    pub publish_path: Option<PathBuf>,
    pub local_saved: bool,
    pub published: bool,
    pub file_size_bytes: u64,
}

impl OutputReport {
    /// Share of the expected frames written, 0 when the length is unknown.
    pub fn completion_pct(&self) -> f64 {
        if self.expected_frames == 0 {
            0.0
        } else {
            self.frames_written as f64 / self.expected_frames as f64 * 100.0
        }
    }

    pub fn file_size_mb(&self) -> f64 {
        self.file_size_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn succeeded(&self) -> bool {
        self.local_saved && self.frames_written > 0
    }

    pub fn lines(&self) -> Vec<String> {
        let encoder = self.encoder.as_deref().unwrap_or("Failed");
        let mut lines = Vec::new();
        if self.succeeded() {
            lines.push("Processed video saved".to_string());
            lines.push(format!(
                "Frames written: {}/{} ({:.1}%)",
                self.frames_written,
                self.expected_frames,
                self.completion_pct()
            ));
            lines.push(format!("File size: {:.1} MB", self.file_size_mb()));
            lines.push(format!("Encoder: {encoder}"));
            lines.push(format!("Local file: {}", self.output_path.display()));
            match (&self.publish_path, self.published) {
                (Some(path), true) => lines.push(format!("Published: {}", path.display())),
                (Some(_), false) => {
                    lines.push("Publish failed; file saved locally only".to_string())
                }
                (None, _) => lines.push("Publishing disabled".to_string()),
            }
        } else {
            lines.push("Video processing failed".to_string());
            lines.push(format!("Frames written: {}", self.frames_written));
            lines.push(format!("File exists: {}", self.local_saved));
            lines.push(format!("Writer initialized: {}", self.writer_initialized));
            lines.push(format!("Encoder: {encoder}"));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn report() -> OutputReport {
        OutputReport {
            source_identifier: "reef.mp4".into(),
            frames_written: 150,
            expected_frames: 600,
            encoder: Some("MP4V - MPEG-4 Part 2".into()),
            writer_initialized: true,
            output_path: PathBuf::from("processed_videos/reef_processed_20260101_000000.mp4"),
            publish_path: Some(PathBuf::from("dl/reef_PROCESSED_20260101_000000.mp4")),
            local_saved: true,
            published: false,
            file_size_bytes: 3 * 1024 * 1024,
        }
    }

    #[test]
    fn test_completion_and_size() {
        let r = report();
        assert_relative_eq!(r.completion_pct(), 25.0);
        assert_relative_eq!(r.file_size_mb(), 3.0);
    }

    #[test]
    fn test_unknown_length_has_zero_completion() {
        let r = OutputReport {
            expected_frames: 0,
            ..report()
        };
        assert_relative_eq!(r.completion_pct(), 0.0);
    }

    #[test]
    fn test_lines_report_local_only_when_publish_failed() {
        let lines = report().lines();
        assert_eq!(lines[0], "Processed video saved");
        assert!(lines.contains(&"Frames written: 150/600 (25.0%)".to_string()));
        assert!(lines.contains(&"Publish failed; file saved locally only".to_string()));
    }

    #[test]
    fn test_lines_report_failure_with_failed_encoder() {
        let r = OutputReport {
            frames_written: 0,
            encoder: None,
            writer_initialized: false,
            local_saved: false,
            ..report()
        };
        let lines = r.lines();
        assert_eq!(lines[0], "Video processing failed");
        assert!(lines.contains(&"Encoder: Failed".to_string()));
        assert!(lines.contains(&"Writer initialized: false".to_string()));
    }
}
