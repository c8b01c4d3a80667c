pub mod display;
pub mod output;
pub mod pipeline;
pub mod shared;
