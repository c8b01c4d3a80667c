use std::path::PathBuf;

use thiserror::Error;

/// Failures the output manager recovers from locally.
///
/// None of these leave the manager; each is recorded in the audit log and
/// the session degrades instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutputError {
    #[error("could not inspect source {source_id}: {reason}")]
    SourceClassification { source_id: String, reason: String },
    #[error("encoder {encoder} failed to open: {reason}")]
    EncoderInitialization { encoder: String, reason: String },
    #[error("frame {frame} could not be written: {reason}")]
    FrameWrite { frame: usize, reason: String },
    #[error("copy to {destination} failed: {reason}")]
    PublishCopy {
        destination: PathBuf,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_part() {
        let e = OutputError::EncoderInitialization {
            encoder: "XVID - Xvid MPEG-4".into(),
            reason: "encoder not found".into(),
        };
        assert_eq!(
            e.to_string(),
            "encoder XVID - Xvid MPEG-4 failed to open: encoder not found"
        );

        let e = OutputError::PublishCopy {
            destination: PathBuf::from("/readonly/out.mp4"),
            reason: "permission denied".into(),
        };
        assert_eq!(
            e.to_string(),
            "copy to /readonly/out.mp4 failed: permission denied"
        );
    }
}
