//! Google Sheets backed dataset source.

mod client;
mod config;
mod response;

pub use client::SheetsSource;
pub use config::{SheetsConfig, SheetsConfigBuilder};
pub use response::{BatchGetResponse, ValueRange};
