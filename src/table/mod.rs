// src/table/mod.rs

use arrow::datatypes::DataType;

use crate::error::TableError;

/// Values of one column. Extracted fields and labels are text; enrichment
/// scores are floats.
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Utf8(Vec<String>),
    Float64(Vec<f64>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Utf8(v) => v.len(),
            Values::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Values::Utf8(v) => Some(v),
            Values::Float64(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Values::Float64(v) => Some(v),
            Values::Utf8(_) => None,
        }
    }

    /// Render cell `row` the way it is written to delimited text.
    pub fn cell(&self, row: usize) -> String {
        match self {
            Values::Utf8(v) => v[row].clone(),
            Values::Float64(v) => v[row].to_string(),
        }
    }

    pub fn arrow_type(&self) -> DataType {
        match self {
            Values::Utf8(_) => DataType::Utf8,
            Values::Float64(_) => DataType::Float64,
        }
    }

    fn missing(&self) -> usize {
        match self {
            Values::Utf8(v) => v.iter().filter(|s| s.is_empty()).count(),
            Values::Float64(v) => v.iter().filter(|f| f.is_nan()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Values,
}

/// Ordered, named columns of equal length. Column order is insertion order,
/// row order is the order values were pushed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from already-collected columns, refusing ragged input.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Table::new();
        for col in columns {
            table.push_column(col.name, col.values)?;
        }
        Ok(table)
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Borrow a text column's values.
    pub fn text_column(&self, name: &str) -> Result<&[String], TableError> {
        let col = self
            .column(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        col.values
            .as_text()
            .ok_or_else(|| TableError::NotText(name.to_string()))
    }

    /// Append a column. The first column fixes the row count; every later
    /// column must match it exactly.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Values,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(TableError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(TableError::LengthMismatch {
                name,
                expected: self.rows,
                got: values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Overwrite one cell of a text column.
    pub fn set_text(
        &mut self,
        name: &str,
        row: usize,
        value: impl Into<String>,
    ) -> Result<(), TableError> {
        let rows = self.rows;
        let col = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))?;
        match &mut col.values {
            Values::Utf8(v) => {
                let cell = v.get_mut(row).ok_or_else(|| TableError::RowOutOfRange {
                    name: name.to_string(),
                    row,
                    rows,
                })?;
                *cell = value.into();
                Ok(())
            }
            Values::Float64(_) => Err(TableError::NotText(name.to_string())),
        }
    }

    /// Per column, how many cells are empty strings (or NaN for scores).
    pub fn missing_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.values.missing()))
            .collect()
    }
}
