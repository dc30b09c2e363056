// src/enrich/mod.rs
pub mod readability;
pub mod sentiment;
pub mod serving;

use indicatif::ProgressBar;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::time::Instant;
use tracing::info;

use crate::error::TableError;
use crate::table::{Table, Values};

pub use readability::{flesch_reading_ease, Readability};
pub use sentiment::{analyze, Polarity, Sentiment, Subjectivity};
pub use serving::{add_serving_type_column, guess_serving_type};

/// A pure, per-row text score.
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn score(&self, text: &str) -> f64 {
        self(text)
    }
}

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]+(?:['’][A-Za-z]+)*").expect("word pattern is valid")
});

/// Lowercased word tokens, apostrophes kept inside words ("isn't").
pub(crate) fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase().replace('’', "'"))
}

/// Run `f` over every cell of `text_column` in parallel, keeping row order.
pub(crate) fn map_text_column<T, F>(
    table: &Table,
    text_column: &str,
    progress: &ProgressBar,
    f: F,
) -> Result<Vec<T>, TableError>
where
    T: Send,
    F: Fn(&str) -> T + Send + Sync,
{
    let texts = table.text_column(text_column)?;
    progress.set_length(texts.len() as u64);

    // indexed parallel iterators collect in input order
    let out = texts
        .par_iter()
        .map(|t| {
            let v = f(t.as_str());
            progress.inc(1);
            v
        })
        .collect();
    progress.finish_and_clear();
    Ok(out)
}

/// Append `output_column` holding `scorer` applied to each row of `text_column`.
#[tracing::instrument(level = "info", skip(table, scorer, progress))]
pub fn apply_scorer<S: Scorer + ?Sized>(
    table: &mut Table,
    text_column: &str,
    output_column: &str,
    scorer: &S,
    progress: &ProgressBar,
) -> Result<(), TableError> {
    if table.column(output_column).is_some() {
        return Err(TableError::DuplicateColumn(output_column.to_string()));
    }
    let start = Instant::now();

    let scores = map_text_column(table, text_column, progress, |t| scorer.score(t))?;
    table.push_column(output_column, Values::Float64(scores))?;

    info!(rows = table.num_rows(), elapsed = ?start.elapsed(), "scored column");
    Ok(())
}
