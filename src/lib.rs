pub mod app;
pub mod client;
pub mod common;
pub mod config;
pub mod domain;
pub mod infra;
pub mod observability;
pub mod parser;
pub mod presentation;
pub mod server;

pub use client::EntityQueryClient;
pub use common::error::{CsvParseError, MovebankError, Result, UpstreamFetchError};
pub use config::Config;
