pub mod image_preview_display;
