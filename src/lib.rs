pub mod app;
pub mod commands;
pub mod pipeline;

pub use app::MatchdayApp;
pub use commands::Command;
pub use pipeline::{QueryPipeline, EMPTY_MESSAGE_REPLY};
