pub mod domain;
pub mod infrastructure;
pub mod video_output_manager;
