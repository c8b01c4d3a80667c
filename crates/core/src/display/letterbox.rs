use image::{imageops, DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::shared::frame::Frame;

/// Placement of a scaled image inside a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterboxGeometry {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

impl LetterboxGeometry {
    /// Fits `width x height` into `canvas_width x canvas_height` keeping the
    /// aspect ratio: one side matches the canvas, the other is at most the
    /// canvas side. Offsets center the image, rounding down.
    pub fn compute(width: u32, height: u32, canvas_width: u32, canvas_height: u32) -> Self {
        if width == 0 || height == 0 || canvas_width == 0 || canvas_height == 0 {
            return Self {
                scaled_width: 0,
                scaled_height: 0,
                x_offset: canvas_width / 2,
                y_offset: canvas_height / 2,
            };
        }

        let (w, h) = (u64::from(width), u64::from(height));
        let (cw, ch) = (u64::from(canvas_width), u64::from(canvas_height));

        // Compare aspect ratios exactly: w/h > cw/ch.
        let (scaled_width, scaled_height) = if w * ch > cw * h {
            (cw, (cw * h / w).clamp(1, ch))
        } else {
            ((ch * w / h).clamp(1, cw), ch)
        };

        Self {
            scaled_width: scaled_width as u32,
            scaled_height: scaled_height as u32,
            x_offset: ((cw - scaled_width) / 2) as u32,
            y_offset: ((ch - scaled_height) / 2) as u32,
        }
    }

    pub fn needs_padding(&self, canvas_width: u32, canvas_height: u32) -> bool {
        self.scaled_width != canvas_width || self.scaled_height != canvas_height
    }
}

/// Resizes `frame` to fit the canvas without distortion, centering it on a
/// black background (letterbox or pillarbox as needed).
///
/// A frame that already has the canvas size is returned unchanged.
pub fn fit_to_canvas(frame: &Frame, canvas_width: u32, canvas_height: u32) -> Frame {
    if frame.dimensions() == (canvas_width, canvas_height) && frame.channels() == 3 {
        return frame.clone();
    }

    let geometry =
        LetterboxGeometry::compute(frame.width(), frame.height(), canvas_width, canvas_height);
    let mut canvas = RgbImage::new(canvas_width, canvas_height);

    let Some(source) = to_rgb(frame) else {
        return Frame::from_rgb_image(canvas, frame.index());
    };
    if geometry.scaled_width == 0 || geometry.scaled_height == 0 {
        return Frame::from_rgb_image(canvas, frame.index());
    }

    let scaled = imageops::resize(
        &source,
        geometry.scaled_width,
        geometry.scaled_height,
        imageops::FilterType::Triangle,
    );

    if !geometry.needs_padding(canvas_width, canvas_height) {
        return Frame::from_rgb_image(scaled, frame.index());
    }

    imageops::replace(
        &mut canvas,
        &scaled,
        i64::from(geometry.x_offset),
        i64::from(geometry.y_offset),
    );
    Frame::from_rgb_image(canvas, frame.index())
}

fn to_rgb(frame: &Frame) -> Option<RgbImage> {
    let (w, h) = frame.dimensions();
    let data = frame.data().to_vec();
    match frame.channels() {
        3 => RgbImage::from_raw(w, h, data),
        1 => GrayImage::from_raw(w, h, data).map(|img| DynamicImage::ImageLuma8(img).to_rgb8()),
        4 => RgbaImage::from_raw(w, h, data).map(|img| DynamicImage::ImageRgba8(img).to_rgb8()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn solid(w: u32, h: u32, value: u8) -> Frame {
        Frame::new(vec![value; (w * h * 3) as usize], w, h, 3, 9)
    }

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * frame.width() + x) * 3) as usize;
        [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
    }

    /// Resampling may round a solid color by one step.
    fn assert_near(actual: [u8; 3], value: u8) {
        for c in actual {
            assert!(c.abs_diff(value) <= 1, "{actual:?} is not close to {value}");
        }
    }

    #[rstest]
    #[case::exact_match(1920, 1080, 960, 540, (960, 540, 0, 0))]
    #[case::letterbox(1920, 1080, 960, 960, (960, 540, 0, 210))]
    #[case::pillarbox(1080, 1920, 960, 540, (303, 540, 328, 0))]
    #[case::square_into_wide(500, 500, 960, 540, (540, 540, 210, 0))]
    #[case::upscale(320, 180, 960, 540, (960, 540, 0, 0))]
    #[case::odd_padding(100, 51, 100, 100, (100, 51, 0, 24))]
    fn test_geometry(
        #[case] w: u32,
        #[case] h: u32,
        #[case] cw: u32,
        #[case] ch: u32,
        #[case] expected: (u32, u32, u32, u32),
    ) {
        let g = LetterboxGeometry::compute(w, h, cw, ch);
        assert_eq!(
            (g.scaled_width, g.scaled_height, g.x_offset, g.y_offset),
            expected
        );
        assert!(g.scaled_width <= cw && g.scaled_height <= ch);
        assert!(g.scaled_width == cw || g.scaled_height == ch);
    }

    #[test]
    fn test_geometry_degenerate_sizes() {
        let g = LetterboxGeometry::compute(0, 100, 960, 540);
        assert_eq!((g.scaled_width, g.scaled_height), (0, 0));
        let g = LetterboxGeometry::compute(10_000, 1, 960, 540);
        assert_eq!((g.scaled_width, g.scaled_height), (960, 1));
    }

    #[test]
    fn test_canvas_sized_frame_is_returned_unchanged() {
        let mut data = vec![0u8; 8 * 6 * 3];
        data[5] = 77;
        let frame = Frame::new(data, 8, 6, 3, 3);
        assert_eq!(fit_to_canvas(&frame, 8, 6), frame);
    }

    #[test]
    fn test_exact_aspect_match_has_no_padding() {
        let out = fit_to_canvas(&solid(192, 108, 200), 96, 54);
        assert_eq!(out.dimensions(), (96, 54));
        assert_near(pixel(&out, 0, 0), 200);
        assert_near(pixel(&out, 95, 53), 200);
    }

    #[test]
    fn test_letterbox_pads_top_and_bottom_with_black() {
        let out = fit_to_canvas(&solid(192, 108, 200), 96, 96);
        assert_eq!(out.dimensions(), (96, 96));
        // scaled 96x54, 21 px bars
        assert_eq!(pixel(&out, 48, 0), [0, 0, 0]);
        assert_eq!(pixel(&out, 48, 20), [0, 0, 0]);
        assert_near(pixel(&out, 48, 21), 200);
        assert_near(pixel(&out, 48, 74), 200);
        assert_eq!(pixel(&out, 48, 75), [0, 0, 0]);
        assert_eq!(pixel(&out, 48, 95), [0, 0, 0]);
    }

    #[test]
    fn test_pillarbox_pads_left_and_right() {
        let out = fit_to_canvas(&solid(50, 100, 150), 100, 100);
        assert_eq!(pixel(&out, 0, 50), [0, 0, 0]);
        assert_eq!(pixel(&out, 24, 50), [0, 0, 0]);
        assert_near(pixel(&out, 25, 50), 150);
        assert_near(pixel(&out, 74, 50), 150);
        assert_eq!(pixel(&out, 75, 50), [0, 0, 0]);
    }

    #[test]
    fn test_keeps_frame_index() {
        let out = fit_to_canvas(&solid(40, 30, 1), 20, 20);
        assert_eq!(out.index(), 9);
    }

    #[test]
    fn test_grayscale_frame_is_expanded() {
        let frame = Frame::new(vec![120u8; 4 * 4], 4, 4, 1, 0);
        let out = fit_to_canvas(&frame, 8, 4);
        assert_eq!(out.channels(), 3);
        assert_near(pixel(&out, 4, 2), 120);
        assert_eq!(pixel(&out, 0, 2), [0, 0, 0]);
    }

    #[test]
    fn test_deterministic() {
        let frame = solid(33, 17, 99);
        assert_eq!(fit_to_canvas(&frame, 64, 64), fit_to_canvas(&frame, 64, 64));
    }
}
