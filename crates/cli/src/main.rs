use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use framekeep_core::display::frame_display::{FrameDisplay, NullDisplay};
use framekeep_core::display::infrastructure::image_preview_display::ImagePreviewDisplay;
use framekeep_core::output::infrastructure::ffmpeg_frame_count_probe::FfmpegFrameCountProbe;
use framekeep_core::output::infrastructure::ffmpeg_writer::FfmpegWriterFactory;
use framekeep_core::output::video_output_manager::VideoOutputManager;
use framekeep_core::pipeline::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use framekeep_core::pipeline::run_session_use_case::{RunSessionUseCase, SessionReport};
use framekeep_core::pipeline::session_logger::LogSessionLogger;
use framekeep_core::shared::config::OutputConfig;

/// Record a processed video session with encoder fallback and auto-publish.
#[derive(Parser)]
#[command(name = "framekeep")]
struct Cli {
    /// Input video file, stream URL or camera reference.
    input: String,

    /// Config file (defaults to the platform config dir when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the local processed video.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory the finished video is copied to.
    #[arg(long, conflicts_with = "no_publish")]
    publish_dir: Option<PathBuf>,

    /// Keep the processed video local only.
    #[arg(long)]
    no_publish: bool,

    /// File extensions treated as video files (comma-separated).
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Display canvas as WIDTHxHEIGHT.
    #[arg(long)]
    display_size: Option<String>,

    /// Write the letterboxed display frame to this image file.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Refresh the preview image every N frames.
    #[arg(long, default_value = "10")]
    preview_every: usize,

    /// Frame rate used when the source reports none.
    #[arg(long)]
    fallback_fps: Option<f64>,

    /// Stop after N frames.
    #[arg(long)]
    max_frames: Option<usize>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    validate(&cli, &config)?;

    let canvas = (config.display_width, config.display_height);
    let progress_every = config.progress_every;
    let source = FfmpegFrameSource::new(config.fallback_fps);
    let manager = VideoOutputManager::new(
        config,
        Box::new(FfmpegWriterFactory::new()),
        Box::new(FfmpegFrameCountProbe::new()),
    );
    let display: Box<dyn FrameDisplay> = match &cli.preview {
        Some(path) => Box::new(ImagePreviewDisplay::new(path, cli.preview_every)),
        None => Box::new(NullDisplay),
    };

    let mut use_case = RunSessionUseCase::new(
        manager,
        Box::new(source),
        display,
        Box::new(LogSessionLogger::new(progress_every)),
        canvas,
        cli.max_frames,
        None,
    );
    let report = use_case.execute(&cli.input)?;
    print_report(&report);
    Ok(())
}

fn build_config(cli: &Cli) -> Result<OutputConfig, Box<dyn std::error::Error>> {
    let mut config = OutputConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(dir) = &cli.publish_dir {
        config.publish_dir = Some(dir.clone());
    }
    if cli.no_publish {
        config.publish_dir = None;
    }
    if let Some(extensions) = &cli.extensions {
        config.set_video_extensions(extensions);
    }
    if let Some(size) = &cli.display_size {
        let (width, height) = parse_size(size)?;
        config.display_width = width;
        config.display_height = height;
    }
    if let Some(fps) = cli.fallback_fps {
        config.fallback_fps = fps;
    }
    config.validate()?;
    Ok(config)
}

fn validate(cli: &Cli, config: &OutputConfig) -> Result<(), Box<dyn std::error::Error>> {
    let input = Path::new(&cli.input);
    let has_video_extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| config.is_video_extension(ext));
    if has_video_extension && !input.exists() && !cli.input.contains("://") {
        return Err(format!("Input file not found: {}", cli.input).into());
    }
    if cli.preview_every == 0 {
        return Err("--preview-every must be at least 1".into());
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    Ok(())
}

fn parse_size(size: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (w, h) = size
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("Display size must look like 960x540, got '{size}'"))?;
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("Invalid display width '{w}'"))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("Invalid display height '{h}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("Display size must be non-zero, got {width}x{height}").into());
    }
    Ok((width, height))
}

fn print_report(report: &SessionReport) {
    println!("Session {}", report.termination);

    match &report.output {
        Some(output) => {
            for line in output.lines() {
                println!("  {line}");
            }
            println!("Diagnostics:");
            for row in &report.audit_table {
                println!("  {row}");
            }
        }
        None => println!("  Live source: real-time only, nothing saved"),
    }

    if report.metrics.total_frames > 0 {
        println!("Performance:");
        for line in report.metrics.lines() {
            println!("  {line}");
        }
    }

    match &report.saved_file {
        Some(path) => println!("Saved: {}", path.display()),
        None if report.output.is_some() => {
            eprintln!("Video processing failed - check the diagnostics above")
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::lowercase("960x540", (960, 540))]
    #[case::uppercase("1280X720", (1280, 720))]
    #[case::spaces(" 640 x 480 ", (640, 480))]
    fn test_parse_size(#[case] input: &str, #[case] expected: (u32, u32)) {
        assert_eq!(parse_size(input).unwrap(), expected);
    }

    #[rstest]
    #[case::no_separator("960")]
    #[case::zero_width("0x540")]
    #[case::not_a_number("widexhigh")]
    fn test_parse_size_rejects(#[case] input: &str) {
        assert!(parse_size(input).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "output_dir": "from_file" }"#).unwrap();

        let cli = Cli::parse_from([
            "framekeep",
            "clip.mov",
            "--config",
            config_path.to_str().unwrap(),
            "--publish-dir",
            "share",
            "--extensions",
            "MP4,.mov",
            "--display-size",
            "640x360",
            "--fallback-fps",
            "25",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("from_file"));
        assert_eq!(config.publish_dir, Some(PathBuf::from("share")));
        assert!(config.is_video_extension("mov"));
        assert_eq!((config.display_width, config.display_height), (640, 360));
        assert_eq!(config.fallback_fps, 25.0);
    }

    #[test]
    fn test_no_publish_disables_copy() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{}").unwrap();
        let cli = Cli::parse_from([
            "framekeep",
            "0",
            "--config",
            config_path.to_str().unwrap(),
            "--no-publish",
        ]);
        assert_eq!(build_config(&cli).unwrap().publish_dir, None);
    }

    #[test]
    fn test_missing_video_file_is_rejected() {
        let cli = Cli::parse_from(["framekeep", "/nonexistent/clip.mp4"]);
        let err = validate(&cli, &OutputConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
    }

    #[test]
    fn test_live_references_pass_validation() {
        for input in ["0", "rtsp://camera.local/stream", "https://example.org/live.mp4"] {
            let cli = Cli::parse_from(["framekeep", input]);
            assert!(validate(&cli, &OutputConfig::default()).is_ok(), "{input}");
        }
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli::parse_from(["framekeep", "0", "--config", "/nonexistent/config.json"]);
        assert!(build_config(&cli).is_err());
    }
}
