pub mod audit_log;
pub mod encoder;
pub mod frame_count_probe;
pub mod output_error;
pub mod output_report;
pub mod source;
pub mod video_writer;
