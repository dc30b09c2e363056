pub mod csv;
pub mod parquet;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{info, warn};

use crate::table::Table;

pub use self::csv::{read_csv, write_csv};
pub use self::parquet::{build_arrow_schema, table_to_batch, write_parquet};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Export name for an input file: its file name up to the first `.`.
pub fn default_name(input: &Path) -> String {
    input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .filter(|n| !n.is_empty())
        .unwrap_or("export")
        .to_string()
}

pub fn output_path(dir: &Path, name: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", name, format.extension()))
}

/// Run `write` against a hidden temp file next to `path`, then rename it
/// over `path`. On failure the temp file is removed and `path` is untouched.
fn write_via_tmp<F>(path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&Path) -> Result<u64>,
{
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("bad output path {}", path.display()))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let rows = match write(&tmp_path) {
        Ok(rows) => rows,
        Err(e) => {
            if tmp_path.exists() {
                if let Err(rm) = fs::remove_file(&tmp_path) {
                    warn!(path = %tmp_path.display(), "could not remove temp file: {}", rm);
                }
            }
            return Err(e.context(format!("writing {}", tmp_path.display())));
        }
    };

    fs::rename(&tmp_path, path).with_context(|| {
        format!("renaming {} -> {}", tmp_path.display(), path.display())
    })?;
    Ok(rows)
}

/// Write `table` to `<dir>/<name>.<ext>`.
///
/// The file is written to a hidden temp name first and renamed into place,
/// so a failed export never leaves a truncated file at the final path.
#[tracing::instrument(level = "info", skip(table, dir), fields(dir = %dir.display()))]
pub fn export_table(
    table: &Table,
    dir: &Path,
    name: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let start = Instant::now();
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let final_path = output_path(dir, name, format);
    let rows = write_via_tmp(&final_path, |tmp| match format {
        OutputFormat::Csv => write_csv(table, tmp),
        OutputFormat::Parquet => write_parquet(table, tmp),
    })?;

    info!(
        path = %final_path.display(),
        rows,
        columns = table.num_columns(),
        elapsed = ?start.elapsed(),
        "exported table"
    );
    Ok(final_path)
}

/// Overwrite the CSV at `path` with `table`, through a temp file.
pub fn save_csv_in_place(table: &Table, path: &Path) -> Result<u64> {
    let rows = write_via_tmp(path, |tmp| write_csv(table, tmp))?;
    info!(path = %path.display(), rows, "saved CSV in place");
    Ok(rows)
}
