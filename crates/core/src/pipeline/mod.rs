pub mod display_sink;
pub mod inference_source;
pub mod infrastructure;
pub mod run_session_use_case;
pub mod session_logger;
pub mod session_metrics;
