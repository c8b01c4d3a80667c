use std::path::{Path, PathBuf};

use crate::display::frame_display::{DisplayAction, FrameDisplay};
use crate::shared::frame::Frame;

/// Writes the displayed frame to an image file using the `image` crate.
///
/// The file is overwritten every `every` frames, so an image viewer that
/// reloads on change acts as a live preview on headless machines.
pub struct ImagePreviewDisplay {
    path: PathBuf,
    every: usize,
    shown: usize,
}

impl ImagePreviewDisplay {
    pub fn new(path: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            path: path.into(),
            every: every.max(1),
            shown: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let img = frame
            .to_rgb_image()
            .ok_or("Failed to create image from frame data")?;
        img.save(&self.path)?;
        Ok(())
    }
}

impl FrameDisplay for ImagePreviewDisplay {
    fn show(&mut self, frame: &Frame) -> Result<DisplayAction, Box<dyn std::error::Error>> {
        let due = self.shown % self.every == 0;
        self.shown += 1;
        if due {
            self.save(frame)?;
        }
        Ok(DisplayAction::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Frame {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(data, width, height, 3, index)
    }

    #[test]
    fn test_first_frame_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview").join("live.png");
        let mut display = ImagePreviewDisplay::new(&path, 10);
        let action = display.show(&make_frame(40, 30, [50, 100, 200], 0)).unwrap();
        assert_eq!(action, DisplayAction::Continue);
        assert!(path.exists());
    }

    #[test]
    fn test_preview_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.png");
        let mut display = ImagePreviewDisplay::new(&path, 1);
        display.show(&make_frame(20, 10, [50, 100, 200], 0)).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (20, 10));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_only_every_nth_frame_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.png");
        let mut display = ImagePreviewDisplay::new(&path, 3);
        display.show(&make_frame(8, 8, [10, 10, 10], 0)).unwrap();
        display.show(&make_frame(8, 8, [90, 90, 90], 1)).unwrap();
        display.show(&make_frame(8, 8, [90, 90, 90], 2)).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [10, 10, 10]);

        display.show(&make_frame(8, 8, [170, 170, 170], 3)).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [170, 170, 170]);
    }

    #[test]
    fn test_unwritable_path_returns_error() {
        // A regular file as parent fails even for root.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let mut display = ImagePreviewDisplay::new(blocker.join("live.png"), 1);
        assert!(display.show(&make_frame(4, 4, [0, 0, 0], 0)).is_err());
    }
}
