// src/error.rs

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A non-blank line with no `:` separator.
    #[error("malformed line {line_no}: no ':' in {content:?}")]
    MalformedLine { line_no: u64, content: String },

    /// A record whose keys disagree with the table's columns, or columns
    /// whose lengths diverged.
    #[error("schema mismatch at record {record}: {detail}")]
    SchemaMismatch { record: usize, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column `{name}` has {got} values, table has {expected} rows")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("column `{0}` already exists")]
    DuplicateColumn(String),

    #[error("no such column `{0}`")]
    UnknownColumn(String),

    #[error("column `{0}` is not a text column")]
    NotText(String),

    #[error("row {row} out of range for column `{name}` ({rows} rows)")]
    RowOutOfRange { name: String, row: usize, rows: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccuracyError {
    #[error("length mismatch: {predicted} predictions vs {truth} true labels")]
    LengthMismatch { predicted: usize, truth: usize },
}

#[derive(Debug, Error)]
pub enum LabelError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Accuracy(#[from] AccuracyError),

    /// A stored label that is not a serving type.
    #[error("column `{column}` row {row}: {reason}")]
    InvalidLabel {
        column: String,
        row: usize,
        reason: String,
    },
}
