// src/export/csv.rs

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::File,
    io::{BufWriter, Read},
    path::Path,
};

use crate::table::{Column, Table, Values};

/// Write `table` as comma-separated text: one header row of column names,
/// then one line per row. Returns the number of data rows written.
pub fn write_csv(table: &Table, path: &Path) -> Result<u64> {
    let file = File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let mut wtr = WriterBuilder::new()
        .delimiter(b',')
        .from_writer(BufWriter::new(file));

    if table.num_columns() > 0 {
        wtr.write_record(table.column_names())
            .context("writing CSV header")?;
        for row in 0..table.num_rows() {
            wtr.write_record(table.columns().iter().map(|c| c.values.cell(row)))
                .with_context(|| format!("writing CSV row {}", row))?;
        }
    }
    wtr.flush().context("flushing CSV writer")?;

    Ok(table.num_rows() as u64)
}

/// Read a CSV with a header row back into a table of text columns.
pub fn read_csv_from<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut values: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        for (col, cell) in values.iter_mut().zip(record.iter()) {
            col.push(cell.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, v)| Column {
            name,
            values: Values::Utf8(v),
        })
        .collect();
    Table::from_columns(columns).context("assembling table from CSV")
}

pub fn read_csv(path: &Path) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_csv_from(file).with_context(|| format!("reading {}", path.display()))
}
