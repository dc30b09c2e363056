// src/export/parquet.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use parquet::{
    arrow::ArrowWriter,
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{fs::File, io::BufWriter, path::Path, sync::Arc};

use crate::table::{Table, Values};

/// Build an Arrow schema with one nullable field per table column.
pub fn build_arrow_schema(table: &Table) -> Arc<Schema> {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|col| Field::new(&col.name, col.values.arrow_type(), /* nullable = */ true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Convert the whole table into a single record batch.
pub fn table_to_batch(table: &Table) -> Result<RecordBatch> {
    let schema = build_arrow_schema(table);
    let arrays: Vec<ArrayRef> = table
        .columns()
        .iter()
        .map(|col| match &col.values {
            Values::Utf8(v) => {
                Arc::new(StringArray::from_iter_values(v.iter().map(String::as_str))) as ArrayRef
            }
            Values::Float64(v) => Arc::new(Float64Array::from(v.clone())) as ArrayRef,
        })
        .collect();

    // try_new alone rejects a batch with no columns
    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    RecordBatch::try_new_with_options(schema, arrays, &options)
        .context("building record batch from table")
}

/// Write `table` to `path` as a single-row-group Parquet file.
pub fn write_parquet(table: &Table, path: &Path) -> Result<u64> {
    let batch = table_to_batch(table)?;

    let file = File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating parquet writer")?;

    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    Ok(batch.num_rows() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use arrow::datatypes::DataType;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    #[test]
    fn parquet_keeps_types_and_values() -> Result<()> {
        let table = Table::from_columns(vec![
            Column {
                name: "beer/name".into(),
                values: Values::Utf8(vec!["Red Moon".into(), "".into()]),
            },
            Column {
                name: "polarity".into(),
                values: Values::Float64(vec![0.25, -1.0]),
            },
        ])?;

        let dir = tempdir()?;
        let path = dir.path().join("reviews.parquet");
        assert_eq!(write_parquet(&table, &path)?, 2);

        let file = File::open(&path)?;
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batch = reader.next().transpose()?.expect("one batch");

        let schema = batch.schema();
        assert_eq!(schema.field(0).name(), "beer/name");
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);

        let names = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .expect("utf8 column");
        assert_eq!(names.value(0), "Red Moon");
        assert_eq!(names.value(1), "");

        let scores = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .expect("float column");
        assert_eq!(scores.value(0), 0.25);
        assert_eq!(scores.value(1), -1.0);
        Ok(())
    }
}
