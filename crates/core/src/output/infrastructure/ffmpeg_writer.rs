use std::path::{Path, PathBuf};

use crate::output::domain::encoder::EncoderCandidate;
use crate::output::domain::video_writer::{VideoWriter, VideoWriterFactory};
use crate::shared::constants::DEFAULT_OUTPUT_FPS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Resolves a container-style codec identifier to an ffmpeg encoder.
///
/// Unknown identifiers are looked up as ffmpeg encoder names, so configs can
/// name encoders such as `libvpx-vp9` directly.
pub fn find_encoder(id: &str) -> Option<ffmpeg_next::Codec> {
    use ffmpeg_next::codec::Id;
    use ffmpeg_next::encoder;

    match id.to_ascii_lowercase().as_str() {
        "mp4v" | "fmp4" | "divx" => encoder::find(Id::MPEG4),
        "xvid" => encoder::find_by_name("libxvid"),
        "mjpg" => encoder::find(Id::MJPEG),
        "x264" => encoder::find_by_name("libx264"),
        "avc1" | "h264" => encoder::find(Id::H264),
        "hvc1" | "hev1" | "hevc" => encoder::find(Id::HEVC),
        "vp80" => encoder::find(Id::VP8),
        "vp90" => encoder::find(Id::VP9),
        _ => encoder::find_by_name(id),
    }
}

/// Encodes RGB frames into a video file via ffmpeg-next.
pub struct FfmpegWriter {
    output_path: PathBuf,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    /// Opens `path` for writing with the encoder named by `codec_id`.
    ///
    /// On failure any partially created output file is removed, so the next
    /// candidate starts from a clean path.
    pub fn open(
        path: &Path,
        codec_id: &str,
        metadata: &VideoMetadata,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let codec = find_encoder(codec_id)
            .ok_or_else(|| format!("encoder for {codec_id} not available in this build"))?;

        let mut writer = Self {
            output_path: path.to_path_buf(),
            octx: None,
            encoder: None,
            scaler: None,
            width: metadata.width,
            height: metadata.height,
            fps: rounded_fps(metadata.fps),
            frame_count: 0,
            video_stream_index: 0,
        };

        if let Err(e) = writer.start(codec) {
            writer.octx = None;
            let _ = std::fs::remove_file(path);
            return Err(e);
        }
        Ok(writer)
    }

    fn start(&mut self, codec: ffmpeg_next::Codec) -> Result<(), Box<dyn std::error::Error>> {
        let mut octx = ffmpeg_next::format::output(&self.output_path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let pixel_format = pick_pixel_format(codec);
        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(self.width);
        encoder_ctx.set_height(self.height);
        encoder_ctx.set_format(pixel_format);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, self.fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(self.fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        self.video_stream_index = ost.index();

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
            pixel_format,
            self.width,
            self.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };
        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

/// Rounds to an integer rate, substituting the default for unusable rates.
fn rounded_fps(fps: f64) -> i32 {
    let fps = fps.round();
    if fps.is_finite() && fps >= 1.0 {
        fps as i32
    } else {
        DEFAULT_OUTPUT_FPS as i32
    }
}

/// YUV420P when the encoder supports it, else its first supported format
/// (MJPEG encoders typically only accept full-range YUVJ formats).
fn pick_pixel_format(codec: ffmpeg_next::Codec) -> ffmpeg_next::format::Pixel {
    let preferred = ffmpeg_next::format::Pixel::YUV420P;
    let Ok(video) = codec.video() else {
        return preferred;
    };
    match video.formats() {
        Some(formats) => {
            let supported: Vec<_> = formats.collect();
            if supported.contains(&preferred) || supported.is_empty() {
                preferred
            } else {
                supported[0]
            }
        }
        None => preferred,
    }
}

impl VideoWriter for FfmpegWriter {
    fn is_opened(&self) -> bool {
        self.octx.is_some() && self.encoder.is_some()
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_opened() {
            return Err("FfmpegWriter: not opened".into());
        }
        if frame.dimensions() != (self.width, self.height) || frame.channels() != 3 {
            return Err(format!(
                "FfmpegWriter: expected {}x{} RGB frame, got {}x{}x{}",
                self.width,
                self.height,
                frame.width(),
                frame.height(),
                frame.channels()
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = self.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&rgb_frame, &mut yuv_frame)?;
        }
        yuv_frame.set_pts(Some(self.frame_count as i64));

        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_frame(&yuv_frame)?;
        }
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_opened() {
            return Ok(());
        }

        let flushed = self
            .encoder
            .as_mut()
            .map_or(Ok(()), |encoder| encoder.send_eof())
            .map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) })
            .and_then(|()| self.drain_packets());
        let trailer: Result<(), Box<dyn std::error::Error>> = match self.octx.as_mut() {
            Some(octx) => octx.write_trailer().map_err(|e| e.into()),
            None => Ok(()),
        };

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        flushed.and(trailer)
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!(
                "FfmpegWriter: failed to finalize {}: {e}",
                self.output_path.display()
            );
        }
    }
}

/// Creates [`FfmpegWriter`]s for the output manager's encoder probe.
#[derive(Default)]
pub struct FfmpegWriterFactory;

impl FfmpegWriterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl VideoWriterFactory for FfmpegWriterFactory {
    fn create(
        &self,
        path: &Path,
        candidate: &EncoderCandidate,
        metadata: &VideoMetadata,
    ) -> Result<Box<dyn VideoWriter>, Box<dyn std::error::Error>> {
        let writer = FfmpegWriter::open(path, &candidate.id, metadata)?;
        Ok(Box::new(writer))
    }
}
