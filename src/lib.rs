pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod extract;
pub mod label;
pub mod table;

pub use config::{BoundaryKind, BoundarySetting, Config};
pub use error::{AccuracyError, ExtractError, LabelError, TableError};
pub use export::{export_table, OutputFormat};
pub use extract::{
    extract_file, extract_reader, ExtractOptions, ExtractStats, Extraction, RecordBoundary,
};
pub use label::{
    accuracy_of_columns, compute_accuracy, LabelOperator, LabelSession, PromptOperator,
    ServingType,
};
pub use table::{Column, Table, Values};
