//! Support code for the `feed-tail` binary: layered configuration and
//! terminal output.
mod config;
mod output;

pub use config::{ConfigLayer, CONFIG_FILENAME, ENV_PREFIX};
pub use output::{format_event, format_toast};
