use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures reported by an update source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("the platform rejected the cell info subscription: {0}")]
    Security(String),
    #[error("cell info was requested before subscribing")]
    NotSubscribed,
    #[error("the update source only supports a single subscriber")]
    AlreadySubscribed,
}

/// Failures while handing the export text to its sink.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to create export file {path}")]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write cell tower data")]
    Write(#[from] io::Error),
}

/// Failures while reading recorded batches.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read input")]
    Io(#[from] io::Error),
    #[error("failed to parse batch on line {line}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse csv record")]
    Csv(#[from] csv::Error),
}
