//! Reqwest-based HTTP backend speaking the stackflow service API.

mod client;
mod config;

pub use client::HttpBackend;
pub use config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, HttpConfig};
