use crate::shared::frame::Frame;

/// One detection produced by the external inference pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f64,
    pub track_id: Option<u32>,
}

/// What the inference pipeline hands to the frame sink: the annotated image
/// and the detections for that frame.
#[derive(Clone, Debug)]
pub struct FrameResult {
    pub frame: Frame,
    pub detections: Vec<Detection>,
}

impl FrameResult {
    /// A result with no detections, as produced by passthrough sources.
    pub fn passthrough(frame: Frame) -> Self {
        Self {
            frame,
            detections: Vec::new(),
        }
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.class_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_follow_detection_order() {
        let result = FrameResult {
            frame: Frame::new(vec![0u8; 3], 1, 1, 3, 0),
            detections: vec![
                Detection {
                    class_name: "sponge".into(),
                    confidence: 0.9,
                    track_id: Some(1),
                },
                Detection {
                    class_name: "coral".into(),
                    confidence: 0.4,
                    track_id: None,
                },
            ],
        };
        let names: Vec<_> = result.class_names().collect();
        assert_eq!(names, vec!["sponge", "coral"]);
    }

    #[test]
    fn test_passthrough_has_no_detections() {
        let result = FrameResult::passthrough(Frame::new(vec![0u8; 3], 1, 1, 3, 0));
        assert!(result.detections.is_empty());
    }
}
