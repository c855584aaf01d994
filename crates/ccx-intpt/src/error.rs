//! Error types for ccx-intpt

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntPtError>;

#[derive(Error, Debug)]
pub enum IntPtError {
    #[error("File is invalid, please select .dat file: {path}")]
    InvalidInputPath { path: String },

    #[error("Required output block not found: '{header}'")]
    MissingRequiredBlock { header: &'static str },

    #[error("line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("{block} block has {found} rows, stress block has {expected}")]
    RowCountMismatch {
        block: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
