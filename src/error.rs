use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while importing customer records.
///
/// `EmptyInput`, `MissingEmailField`, `HeaderRead`, `SourceOpen` and `WorkerSpawn`
/// abort a run. The per-record variants are only ever logged by the pipeline.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input is empty, no header line found")]
    EmptyInput,

    #[error("missing 'email' field in header")]
    MissingEmailField,

    #[error("failed to read header line: {0}")]
    HeaderRead(#[source] io::Error),

    #[error("line {line}: record has no field at index {index}")]
    InvalidRecord { line: u64, index: usize },

    #[error("line {line}: invalid email '{value}'")]
    InvalidEmail { line: u64, value: String },

    #[error("line {line}: failed to read line: {source}")]
    LineRead {
        line: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report line for '{domain}': {source}")]
    ReportWrite {
        domain: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to open report destination {path:?}: {source}")]
    ReportOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open source {path:?}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn pipeline thread: {0}")]
    WorkerSpawn(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_line_numbers() {
        let err = ImportError::InvalidEmail {
            line: 12,
            value: "invalidtest.com".to_string(),
        };
        assert_eq!(err.to_string(), "line 12: invalid email 'invalidtest.com'");
    }
}
