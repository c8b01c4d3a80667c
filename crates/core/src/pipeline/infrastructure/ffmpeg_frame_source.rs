use crate::pipeline::inference_source::{FrameSink, InferenceSource};
use crate::shared::detection::FrameResult;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Decodes a file or network stream via ffmpeg-next and hands every frame to
/// the sink without running inference.
///
/// Streams that report no usable frame rate get `fallback_fps`.
pub struct FfmpegFrameSource {
    fallback_fps: f64,
    metadata: Option<VideoMetadata>,
    running: bool,
}

impl FfmpegFrameSource {
    pub fn new(fallback_fps: f64) -> Self {
        Self {
            fallback_fps,
            metadata: None,
            running: false,
        }
    }

    /// Metadata of the most recently opened input.
    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }
}

/// Decoder state for one run; frames are pushed to the sink as they appear.
struct DecodeLoop<'s> {
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    frame_index: usize,
    sink: &'s mut dyn FrameSink,
}

impl DecodeLoop<'_> {
    /// Delivers every frame the decoder has ready. Returns false once the
    /// sink asks to stop.
    fn drain(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
            self.scaler.run(&decoded, &mut rgb_frame)?;

            let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
            let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
            self.frame_index += 1;
            if !self.sink.on_prediction(&FrameResult::passthrough(frame)) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl InferenceSource for FfmpegFrameSource {
    fn run(
        &mut self,
        reference: &str,
        sink: &mut dyn FrameSink,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(reference)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            f64::from(rate.numerator()) / f64::from(rate.denominator())
        } else {
            0.0
        };
        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: usize::try_from(stream.frames()).unwrap_or(0),
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(reference.into()),
        }
        .with_fallback_fps(self.fallback_fps);
        if fps <= 0.0 {
            log::warn!(
                "{reference} reports no frame rate; using {} fps",
                metadata.fps
            );
        }
        log::info!(
            "Opened {reference}: {}x{} @ {:.2} fps, {} frames, codec {}",
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames,
            metadata.codec
        );

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let mut decode = DecodeLoop {
            decoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            frame_index: 0,
            sink,
        };
        self.metadata = Some(metadata);
        self.running = true;

        for (stream, packet) in ictx.packets() {
            if stream.index() != video_stream_index {
                continue;
            }
            if decode.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if !decode.drain()? {
                return Ok(decode.frame_index);
            }
        }

        decode.decoder.send_eof()?;
        decode.drain()?;
        Ok(decode.frame_index)
    }

    fn terminate(&mut self) {
        if self.running {
            log::debug!("Frame source terminated");
        }
        self.running = false;
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping the per-row padding (stride > width*3).
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
