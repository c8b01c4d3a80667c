pub mod frame_display;
pub mod infrastructure;
pub mod letterbox;
