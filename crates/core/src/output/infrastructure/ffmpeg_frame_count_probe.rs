use std::path::Path;

use crate::output::domain::frame_count_probe::FrameCountProbe;

/// Reads the frame count from container metadata via ffmpeg-next.
///
/// Containers that do not store a count get an estimate from the stream
/// duration and average rate.
#[derive(Default)]
pub struct FfmpegFrameCountProbe;

impl FfmpegFrameCountProbe {
    pub fn new() -> Self {
        Self
    }
}

impl FrameCountProbe for FfmpegFrameCountProbe {
    fn frame_count(&self, path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let frames = stream.frames();
        if frames > 0 {
            return Ok(frames as usize);
        }

        let duration = stream.duration();
        let time_base = stream.time_base();
        let rate = stream.avg_frame_rate();
        if duration <= 0 || time_base.denominator() == 0 || rate.denominator() == 0 {
            return Ok(0);
        }
        let seconds = duration as f64 * f64::from(time_base);
        let estimate = seconds * f64::from(rate);
        Ok(estimate.round().max(0.0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::domain::video_writer::VideoWriter;
    use crate::output::infrastructure::ffmpeg_writer::FfmpegWriter;
    use crate::shared::frame::Frame;
    use crate::shared::video_metadata::VideoMetadata;

    #[test]
    fn test_counts_frames_of_written_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counted.mp4");
        let meta = VideoMetadata::for_encoder(64, 48, 30.0);
        let mut writer = FfmpegWriter::open(&path, "mp4v", &meta).unwrap();
        for i in 0..12 {
            writer
                .write(&Frame::new(vec![90u8; 64 * 48 * 3], 64, 48, 3, i))
                .unwrap();
        }
        writer.release().unwrap();

        let count = FfmpegFrameCountProbe::new().frame_count(&path).unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn test_missing_file_is_error() {
        let probe = FfmpegFrameCountProbe::new();
        assert!(probe.frame_count(Path::new("/nonexistent/in.mp4")).is_err());
    }

    #[test]
    fn test_non_video_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.mp4");
        std::fs::write(&path, b"definitely not a video container").unwrap();
        assert!(FfmpegFrameCountProbe::new().frame_count(&path).is_err());
    }
}
