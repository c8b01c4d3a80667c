pub mod ffmpeg_frame_count_probe;
pub mod ffmpeg_writer;
