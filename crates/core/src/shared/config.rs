use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::output::domain::encoder::EncoderCandidate;
use crate::shared::constants::{
    APP_DIR_NAME, AUDIT_DISPLAY_WINDOW, CONFIG_FILE_NAME, DEFAULT_FALLBACK_FPS,
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FPS, DISPLAY_HEIGHT, DISPLAY_WIDTH, FALLBACK_PUBLISH_DIR,
    PROGRESS_LOG_EVERY, SAVED_LOG_EVERY, VIDEO_EXTENSIONS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for an output session and its display surface.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: PathBuf,
    /// Where finished output is copied. `None` disables publishing.
    pub publish_dir: Option<PathBuf>,
    /// Lowercase extensions (no dot) that mark an input as a video file.
    pub video_extensions: Vec<String>,
    pub encoder_candidates: Vec<EncoderCandidate>,
    pub default_fps: f64,
    pub fallback_fps: f64,
    pub progress_every: usize,
    pub saved_every: usize,
    pub audit_window: usize,
    pub display_width: u32,
    pub display_height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            publish_dir: Some(default_publish_dir()),
            video_extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            encoder_candidates: EncoderCandidate::defaults(),
            default_fps: DEFAULT_OUTPUT_FPS,
            fallback_fps: DEFAULT_FALLBACK_FPS,
            progress_every: PROGRESS_LOG_EVERY,
            saved_every: SAVED_LOG_EVERY,
            audit_window: AUDIT_DISPLAY_WINDOW,
            display_width: DISPLAY_WIDTH,
            display_height: DISPLAY_HEIGHT,
        }
    }
}

fn default_publish_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from(FALLBACK_PUBLISH_DIR))
}

impl OutputConfig {
    /// Platform config file location, e.g. `~/.config/Framekeep/config.json`.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads `path` when given (missing file is an error), otherwise the
    /// platform config file when it exists, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::config_path().filter(|p| p.exists()) {
                Some(p) => Self::from_file(&p)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.normalize_extensions();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    /// Replaces the recognized extensions, accepting `.MP4`-style spellings.
    pub fn set_video_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.video_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().to_string())
            .collect();
        self.normalize_extensions();
    }

    pub fn is_video_extension(&self, extension: &str) -> bool {
        let ext = extension.trim_start_matches('.').to_lowercase();
        self.video_extensions.iter().any(|e| *e == ext)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encoder_candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one encoder candidate is required".into(),
            ));
        }
        if self.video_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one video extension is required".into(),
            ));
        }
        if !(self.default_fps.is_finite() && self.default_fps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "default_fps must be positive, got {}",
                self.default_fps
            )));
        }
        if !(self.fallback_fps.is_finite() && self.fallback_fps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "fallback_fps must be positive, got {}",
                self.fallback_fps
            )));
        }
        if self.display_width == 0 || self.display_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "display size must be non-zero, got {}x{}",
                self.display_width, self.display_height
            )));
        }
        Ok(())
    }

    fn normalize_extensions(&mut self) {
        for ext in &mut self.video_extensions {
            *ext = ext.trim_start_matches('.').to_lowercase();
        }
        self.video_extensions.retain(|e| !e.is_empty());
        self.video_extensions.dedup();
    }
}
