//! Error taxonomy of the analyzer.
//!
//! Parse and I/O failures are per-file and never abort a multi-file run; a
//! non-tree decision is a classification, not an error. Breaches of the BDD
//! reduction invariants are programmer errors and panic instead of being
//! represented here.

use std::io;

use thiserror::Error;

/// A failure while parsing host source.
#[derive(Debug, Error)]
#[error("parse error at line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// Errors surfaced by the analysis façade, fatal for one file only.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}
