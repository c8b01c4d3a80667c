use std::path::{Path, PathBuf};

use crate::shared::constants::{LOCAL_ARTIFACT_TAG, PUBLISHED_ARTIFACT_TAG};

/// Where frames come from, decided once per session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A finite video file; processed output is recorded.
    File,
    /// Camera, network stream, or anything else; nothing is recorded.
    LiveStream,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::File => write!(f, "file"),
            SourceKind::LiveStream => write!(f, "live stream"),
        }
    }
}

/// Local and published locations for one recorded session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub output: PathBuf,
    pub publish: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Builds `<stem>_processed_<ts>.<ext>` under `output_dir` and
    /// `<stem>_PROCESSED_<ts>.<ext>` under `publish_dir`.
    ///
    /// The extension is taken from the input, lowercased; inputs without one
    /// get `mp4`.
    pub fn derive(
        input: &Path,
        output_dir: &Path,
        publish_dir: Option<&Path>,
        timestamp: &str,
    ) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let ext = input
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "mp4".to_string());

        let output = output_dir.join(format!("{stem}_{LOCAL_ARTIFACT_TAG}_{timestamp}.{ext}"));
        let publish = publish_dir
            .map(|dir| dir.join(format!("{stem}_{PUBLISHED_ARTIFACT_TAG}_{timestamp}.{ext}")));
        Self { output, publish }
    }
}
