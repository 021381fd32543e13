#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # report-cli
//!
//! Command-line checker for report page documents.
//!
//! Wraps the validation engine and batch validator so page authors can
//! check JSON documents before they are committed. The `report-check`
//! binary is a thin layer over [`commands`].

pub mod commands;
pub mod config;

pub use commands::{BatchEntry, OutputFormat, Outcome};
pub use config::{CliConfig, LogFormat};

use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration '{path}': {message}")]
    Config { path: String, message: String },

    #[error("Cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON document '{path}': {message}")]
    Document { path: String, message: String },

    #[error("Invalid batch entry '{0}', expected CONTENT_PATH=FILE")]
    InvalidEntry(String),

    #[error(transparent)]
    Schema(#[from] report_schema::Error),

    #[error("Cannot render output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
