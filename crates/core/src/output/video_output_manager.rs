use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::output::domain::audit_log::AuditLog;
use crate::output::domain::encoder::{EncoderCandidate, EncoderState};
use crate::output::domain::frame_count_probe::FrameCountProbe;
use crate::output::domain::output_error::OutputError;
use crate::output::domain::output_report::{FinalizeOutcome, OutputReport};
use crate::output::domain::source::{ArtifactPaths, SourceKind};
use crate::output::domain::video_writer::{VideoWriter, VideoWriterFactory};
use crate::shared::config::OutputConfig;
use crate::shared::constants::ARTIFACT_TIMESTAMP_FORMAT;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Records processed frames of one input source to a video file.
///
/// Classifies the source once, opens an encoder lazily on the first frame
/// (trying each configured candidate until one opens), forwards frames, and
/// finalizes exactly once: release, size check, publish copy. Every failure
/// degrades the session instead of propagating; the audit log explains what
/// happened.
pub struct VideoOutputManager {
    config: OutputConfig,
    factory: Box<dyn VideoWriterFactory>,
    probe: Box<dyn FrameCountProbe>,
    source_kind: Option<SourceKind>,
    source_identifier: String,
    expected_frame_count: usize,
    paths: Option<ArtifactPaths>,
    encoder_state: EncoderState,
    selected_encoder: Option<EncoderCandidate>,
    frame_dimensions: Option<(u32, u32)>,
    frames_written: usize,
    writer: Option<Box<dyn VideoWriter>>,
    outcome: Option<FinalizeOutcome>,
    audit: AuditLog,
    failures: Vec<OutputError>,
}

impl VideoOutputManager {
    pub fn new(
        config: OutputConfig,
        factory: Box<dyn VideoWriterFactory>,
        probe: Box<dyn FrameCountProbe>,
    ) -> Self {
        Self {
            config,
            factory,
            probe,
            source_kind: None,
            source_identifier: String::new(),
            expected_frame_count: 0,
            paths: None,
            encoder_state: EncoderState::Unattempted,
            selected_encoder: None,
            frame_dimensions: None,
            frames_written: 0,
            writer: None,
            outcome: None,
            audit: AuditLog::new(),
            failures: Vec::new(),
        }
    }

    /// Decides whether `reference` is a recordable video file.
    ///
    /// Files with a recognized extension get timestamped output/publish
    /// paths and a best-effort frame count; everything else is a live
    /// stream. The first call wins; later calls return the existing kind.
    pub fn classify_source(&mut self, reference: &str) -> SourceKind {
        if let Some(kind) = self.source_kind {
            self.audit.record(format!(
                "Source already classified as {kind}; ignoring {reference}"
            ));
            return kind;
        }

        self.source_identifier = reference.to_string();
        self.audit
            .record(format!("Analyzing video source: {reference}"));

        let path = Path::new(reference);
        let is_file = path.is_file();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.audit.record(format!(
            "Path is file: {is_file}, extension: {extension:?}"
        ));

        let kind = if is_file && self.config.is_video_extension(&extension) {
            self.prepare_file_session(path);
            SourceKind::File
        } else {
            self.audit
                .record("Live source detected (camera/stream); output will not be recorded");
            log::info!("Live source {reference}: display only, nothing is recorded");
            SourceKind::LiveStream
        };
        self.source_kind = Some(kind);
        kind
    }

    fn prepare_file_session(&mut self, path: &Path) {
        self.expected_frame_count = match self.probe.frame_count(path) {
            Ok(count) => count,
            Err(e) => {
                self.fail(OutputError::SourceClassification {
                    source_id: self.source_identifier.clone(),
                    reason: e.to_string(),
                });
                0
            }
        };
        self.audit.record(format!(
            "Total frames in video: {}",
            self.expected_frame_count
        ));

        let timestamp = Local::now().format(ARTIFACT_TIMESTAMP_FORMAT).to_string();
        let paths = ArtifactPaths::derive(
            path,
            &self.config.output_dir,
            self.config.publish_dir.as_deref(),
            &timestamp,
        );

        match fs::create_dir_all(&self.config.output_dir) {
            Ok(()) => self.audit.record(format!(
                "Output directory ready: {}",
                self.config.output_dir.display()
            )),
            Err(e) => self.audit.record(format!(
                "Could not create output directory {}: {e}",
                self.config.output_dir.display()
            )),
        }

        self.audit.record(format!(
            "Video file detected: {}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
        self.audit
            .record(format!("Will save to: {}", paths.output.display()));
        if let Some(publish) = &paths.publish {
            self.audit
                .record(format!("Will publish to: {}", publish.display()));
        }
        log::info!("Recording processed output to {}", paths.output.display());
        self.paths = Some(paths);
    }

    /// Opens a writer with the first encoder candidate that works.
    ///
    /// Attempted at most once per session: afterwards returns whether the
    /// attempt succeeded without touching any encoder. Always false for live
    /// sources and after finalization.
    pub fn ensure_encoder_ready(&mut self, width: u32, height: u32, fps: f64) -> bool {
        if self.source_kind != Some(SourceKind::File) {
            return false;
        }
        if self.outcome.is_some() {
            self.audit
                .record("Encoder initialization refused: session already finalized");
            return false;
        }
        match self.encoder_state {
            EncoderState::Ready => return true,
            EncoderState::Attempting | EncoderState::Failed => return false,
            EncoderState::Unattempted => {}
        }
        let Some(output) = self.paths.as_ref().map(|p| p.output.clone()) else {
            return false;
        };

        self.transition(EncoderState::Attempting);
        self.audit.record(format!(
            "Attempting to initialize video writer: {width}x{height} @ {fps}fps"
        ));

        let metadata = VideoMetadata::for_encoder(width, height, fps);
        let candidates = self.config.encoder_candidates.clone();
        for candidate in candidates {
            self.audit.record(format!("Trying codec: {candidate}"));
            match self.factory.create(&output, &candidate, &metadata) {
                Ok(writer) if writer.is_opened() => {
                    self.audit.record(format!(
                        "Video writer initialized with {candidate} ({width}x{height}, {fps} fps)"
                    ));
                    log::info!(
                        "Started saving {width}x{height} @ {fps} fps with {candidate}"
                    );
                    self.writer = Some(writer);
                    self.selected_encoder = Some(candidate);
                    self.frame_dimensions = Some((width, height));
                    self.transition(EncoderState::Ready);
                    return true;
                }
                Ok(mut writer) => {
                    if let Err(e) = writer.release() {
                        self.audit.record(format!(
                            "Error releasing unopened writer for {candidate}: {e}"
                        ));
                    }
                    self.fail(OutputError::EncoderInitialization {
                        encoder: candidate.description.clone(),
                        reason: "writer reported it is not open".into(),
                    });
                }
                Err(e) => self.fail(OutputError::EncoderInitialization {
                    encoder: candidate.description.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        self.transition(EncoderState::Failed);
        self.audit.record("All codec attempts failed");
        log::warn!("Failed to initialize a video writer with any encoder; output disabled");
        false
    }

    /// Forwards one frame to the writer.
    ///
    /// Live sources always succeed without doing anything. For files the
    /// first call opens the encoder at the configured default frame rate.
    /// Returns false when the frame was not recorded.
    pub fn write_frame(&mut self, frame: &Frame) -> bool {
        if self.source_kind != Some(SourceKind::File) {
            return true;
        }
        if self.outcome.is_some() {
            return false;
        }
        if self.encoder_state == EncoderState::Unattempted {
            let fps = self.config.default_fps;
            self.ensure_encoder_ready(frame.width(), frame.height(), fps);
        }
        if self.encoder_state != EncoderState::Ready {
            return false;
        }

        if let Some((width, height)) = self.frame_dimensions {
            if frame.dimensions() != (width, height) {
                self.fail(OutputError::FrameWrite {
                    frame: frame.index(),
                    reason: format!(
                        "expected {width}x{height}, got {}x{}",
                        frame.width(),
                        frame.height()
                    ),
                });
                return false;
            }
        }

        let Some(writer) = self.writer.as_mut() else {
            return false;
        };
        match writer.write(frame) {
            Ok(()) => {
                self.frames_written += 1;
                self.record_progress();
                true
            }
            Err(e) => {
                self.fail(OutputError::FrameWrite {
                    frame: frame.index(),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    fn record_progress(&mut self) {
        let written = self.frames_written;
        let total = self.expected_frame_count;
        if total > 0 && written % self.config.progress_every.max(1) == 0 {
            let pct = written as f64 / total as f64 * 100.0;
            self.audit.record(format!(
                "Progress: {written}/{total} frames ({pct:.1}%)"
            ));
        }
        if written % self.config.saved_every.max(1) == 0 {
            self.audit.record(format!("Saved {written} frames..."));
        }
    }

    /// Closes the writer, checks the output file and copies it to the
    /// publish location.
    ///
    /// Returns the published path if the copy worked, else the local path if
    /// the file exists, else `None`. Runs once; later calls return the
    /// recorded result without touching the writer or the file system.
    pub fn finalize_and_publish(&mut self) -> Option<PathBuf> {
        if self.source_kind != Some(SourceKind::File) {
            return None;
        }
        if let Some(outcome) = &self.outcome {
            let result = outcome.result.clone();
            self.audit
                .record("Finalize already ran; returning recorded result");
            return result;
        }
        let paths = self.paths.clone()?;

        self.audit.record("Finishing video processing...");
        if let Some(mut writer) = self.writer.take() {
            match writer.release() {
                Ok(()) => self.audit.record("Video writer released"),
                Err(e) => self
                    .audit
                    .record(format!("Error releasing video writer: {e}")),
            }
        }

        let (local_saved, file_size_bytes) = match fs::metadata(&paths.output) {
            Ok(meta) if meta.is_file() => (true, meta.len()),
            _ => (false, 0),
        };
        if local_saved {
            self.audit.record(format!(
                "Output file exists: {:.1} MB",
                file_size_bytes as f64 / (1024.0 * 1024.0)
            ));
        } else {
            self.audit.record("Output file does not exist");
        }

        let published = match (&paths.publish, local_saved) {
            (Some(destination), true) => self.publish(&paths.output, destination),
            (None, true) => {
                self.audit.record("Publishing disabled; keeping local file");
                false
            }
            (_, false) => false,
        };

        let result = if published {
            paths.publish.clone()
        } else if local_saved {
            Some(paths.output.clone())
        } else {
            None
        };

        match &result {
            Some(path) => log::info!("Final output: {}", path.display()),
            None => log::warn!("No output was produced for {}", self.source_identifier),
        }

        self.outcome = Some(FinalizeOutcome {
            local_saved,
            published,
            file_size_bytes,
            result: result.clone(),
        });
        result
    }

    fn publish(&mut self, source: &Path, destination: &Path) -> bool {
        self.audit
            .record(format!("Starting auto-publish to: {}", destination.display()));

        let copied = destination
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::copy(source, destination));
        if let Err(e) = copied {
            self.fail(OutputError::PublishCopy {
                destination: destination.to_path_buf(),
                reason: e.to_string(),
            });
            log::warn!("Auto-publish failed: {e}");
            return false;
        }

        match fs::metadata(destination) {
            Ok(meta) => {
                self.audit.record(format!(
                    "Auto-publish successful: {:.1} MB",
                    meta.len() as f64 / (1024.0 * 1024.0)
                ));
                log::info!("Published to {}", destination.display());
                true
            }
            Err(_) => {
                self.fail(OutputError::PublishCopy {
                    destination: destination.to_path_buf(),
                    reason: "file not found at destination".into(),
                });
                false
            }
        }
    }

    /// Adds a caller-supplied diagnostic to the audit log.
    pub fn record(&mut self, message: impl Into<String>) {
        self.audit.record(message);
    }

    fn fail(&mut self, error: OutputError) {
        self.audit.record(error.to_string());
        self.failures.push(error);
    }

    fn transition(&mut self, next: EncoderState) {
        debug_assert!(
            self.encoder_state.can_transition_to(next),
            "illegal encoder transition {} -> {next}",
            self.encoder_state
        );
        self.encoder_state = next;
    }

    /// Terminal status, `None` unless the source is a recordable file.
    pub fn report(&self) -> Option<OutputReport> {
        if self.source_kind != Some(SourceKind::File) {
            return None;
        }
        let paths = self.paths.as_ref()?;
        let outcome = self.outcome.as_ref();
        Some(OutputReport {
            source_identifier: self.source_identifier.clone(),
            frames_written: self.frames_written,
            expected_frames: self.expected_frame_count,
            encoder: self.selected_encoder.as_ref().map(|c| c.description.clone()),
            writer_initialized: self.encoder_state == EncoderState::Ready,
            output_path: paths.output.clone(),
            publish_path: paths.publish.clone(),
            local_saved: outcome.is_some_and(|o| o.local_saved),
            published: outcome.is_some_and(|o| o.published),
            file_size_bytes: outcome.map_or(0, |o| o.file_size_bytes),
        })
    }

    /// The most recent audit entries as printable rows.
    pub fn audit_table(&self) -> Vec<String> {
        self.audit.table(self.config.audit_window)
    }

    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source_kind
    }

    pub fn is_recording(&self) -> bool {
        self.source_kind == Some(SourceKind::File)
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    pub fn expected_frame_count(&self) -> usize {
        self.expected_frame_count
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.paths.as_ref().map(|p| p.output.as_path())
    }

    pub fn publish_path(&self) -> Option<&Path> {
        self.paths.as_ref().and_then(|p| p.publish.as_deref())
    }

    pub fn encoder_state(&self) -> EncoderState {
        self.encoder_state
    }

    pub fn selected_encoder(&self) -> Option<&EncoderCandidate> {
        self.selected_encoder.as_ref()
    }

    pub fn frame_dimensions(&self) -> Option<(u32, u32)> {
        self.frame_dimensions
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn outcome(&self) -> Option<&FinalizeOutcome> {
        self.outcome.as_ref()
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    pub fn failures(&self) -> &[OutputError] {
        &self.failures
    }
}
