/// Directory name used under the platform config dir.
pub const APP_DIR_NAME: &str = "Framekeep";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_OUTPUT_DIR: &str = "processed_videos";
/// Publish directory used when the platform has no Downloads folder.
pub const FALLBACK_PUBLISH_DIR: &str = "published";

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

/// Ordered encoder candidates: (identifier, description).
pub const ENCODER_CANDIDATES: &[(&str, &str)] = &[
    ("mp4v", "MP4V - MPEG-4 Part 2"),
    ("XVID", "XVID - Xvid MPEG-4"),
    ("MJPG", "MJPG - Motion JPEG"),
    ("X264", "X264 - H.264"),
    ("avc1", "AVC1 - H.264 variant"),
];

/// Frame rate used to open the encoder when the sink cannot know the source rate.
pub const DEFAULT_OUTPUT_FPS: f64 = 30.0;
/// Rate reported by frame sources whose container carries no usable rate.
pub const DEFAULT_FALLBACK_FPS: f64 = 60.0;

pub const PROGRESS_LOG_EVERY: usize = 30;
pub const SAVED_LOG_EVERY: usize = 100;
pub const AUDIT_DISPLAY_WINDOW: usize = 20;

pub const DISPLAY_WIDTH: u32 = 960;
pub const DISPLAY_HEIGHT: u32 = 540;

/// Suffix tokens for the local and published artifacts.
pub const LOCAL_ARTIFACT_TAG: &str = "processed";
pub const PUBLISHED_ARTIFACT_TAG: &str = "PROCESSED";
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const AUDIT_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";
