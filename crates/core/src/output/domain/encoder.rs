use serde::{Deserialize, Serialize};

use crate::shared::constants::ENCODER_CANDIDATES;

/// One encoder the output manager may try, identified the way container
/// tooling names codecs (`mp4v`, `MJPG`, `avc1`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderCandidate {
    pub id: String,
    pub description: String,
}

impl EncoderCandidate {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }

    /// The default fallback order: MPEG-4 first, H.264 last.
    pub fn defaults() -> Vec<EncoderCandidate> {
        ENCODER_CANDIDATES
            .iter()
            .map(|(id, description)| EncoderCandidate::new(*id, *description))
            .collect()
    }
}

impl std::fmt::Display for EncoderCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Progress of the single encoder initialization a session may perform.
///
/// Only `Unattempted -> Attempting -> Ready | Failed` is legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncoderState {
    Unattempted,
    Attempting,
    Ready,
    Failed,
}

impl EncoderState {
    pub fn can_transition_to(self, next: EncoderState) -> bool {
        matches!(
            (self, next),
            (EncoderState::Unattempted, EncoderState::Attempting)
                | (EncoderState::Attempting, EncoderState::Ready)
                | (EncoderState::Attempting, EncoderState::Failed)
        )
    }
}

impl std::fmt::Display for EncoderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncoderState::Unattempted => write!(f, "Unattempted"),
            EncoderState::Attempting => write!(f, "Attempting"),
            EncoderState::Ready => write!(f, "Ready"),
            EncoderState::Failed => write!(f, "Failed"),
        }
    }
}
