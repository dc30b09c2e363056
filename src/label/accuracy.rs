use crate::error::{AccuracyError, LabelError};
use crate::label::ServingType;
use crate::table::Table;

/// Fraction of positions where `predicted` equals `truth`.
///
/// Empty input gives 0.0. Inputs of different length are rejected before
/// anything is compared.
pub fn compute_accuracy<T: PartialEq>(
    predicted: &[T],
    truth: &[T],
) -> Result<f64, AccuracyError> {
    if predicted.len() != truth.len() {
        return Err(AccuracyError::LengthMismatch {
            predicted: predicted.len(),
            truth: truth.len(),
        });
    }
    if predicted.is_empty() {
        return Ok(0.0);
    }

    let correct = predicted
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / predicted.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnAccuracy {
    pub accuracy: f64,
    /// Rows that took part in the comparison.
    pub compared: usize,
}

fn serving_types(table: &Table, column: &str) -> Result<Vec<ServingType>, LabelError> {
    table
        .text_column(column)?
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            cell.parse::<ServingType>()
                .map_err(|reason| LabelError::InvalidLabel {
                    column: column.to_string(),
                    row,
                    reason,
                })
        })
        .collect()
}

/// Accuracy of one serving-type column against another in the same table.
///
/// With `skip_unset`, rows whose truth is still `not_set` are left out.
pub fn accuracy_of_columns(
    table: &Table,
    predicted: &str,
    truth: &str,
    skip_unset: bool,
) -> Result<ColumnAccuracy, LabelError> {
    let (p, t): (Vec<ServingType>, Vec<ServingType>) = serving_types(table, predicted)?
        .into_iter()
        .zip(serving_types(table, truth)?)
        .filter(|(_, t)| !skip_unset || *t != ServingType::NotSet)
        .unzip();

    Ok(ColumnAccuracy {
        accuracy: compute_accuracy(&p, &t)?,
        compared: p.len(),
    })
}
