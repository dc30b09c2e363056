use anyhow::{Context, Result};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::{env, fs::File, path::Path, process::exit};

const PREVIEW_ROWS: usize = 5;

fn main() {
    // Expect exactly one CLI argument: path to an exported Parquet file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect_export(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print row count, schema and the first few rows of an exported table.
fn inspect_export(path: &Path) -> Result<()> {
    // 1) File-level metadata
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();
    let file_size = std::fs::metadata(path)?.len();

    println!("=== Export: {} ===", path.display());
    println!("Created by:     {}", file_meta.created_by().unwrap_or("<unknown>"));
    println!("Total rows:     {}", file_meta.num_rows());
    println!("Row groups:     {}", meta.num_row_groups());
    println!("Size on disk:   {} bytes", file_size);
    println!();

    // 2) Arrow schema as the exporter wrote it
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    println!("=== Columns ===");
    for field in schema.fields() {
        println!("- {:<30} | {}", field.name(), field.data_type());
    }
    println!();

    // 3) Preview
    println!("=== First {} rows ===", PREVIEW_ROWS);
    let mut batches = builder.with_batch_size(PREVIEW_ROWS).build()?;
    if let Some(batch) = batches.next().transpose()? {
        for row in 0..batch.num_rows().min(PREVIEW_ROWS) {
            let cells: Vec<String> = batch
                .columns()
                .iter()
                .map(|col| array_value_to_string(col, row))
                .collect::<Result<_, _>>()?;
            println!("{}: {}", row, cells.join(" | "));
        }
    }

    Ok(())
}
