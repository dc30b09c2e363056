// src/label/mod.rs
pub mod accuracy;
pub mod prompt;
pub mod serving_type;

use tracing::{debug, info, warn};

use crate::error::{LabelError, TableError};
use crate::table::{Table, Values};

pub use accuracy::{accuracy_of_columns, compute_accuracy, ColumnAccuracy};
pub use prompt::PromptOperator;
pub use serving_type::ServingType;

/// A row still waiting on a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub row: usize,
    pub text: String,
}

/// Result of one proposed label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    Accepted { row: usize, label: ServingType },
    /// The row was left as it was.
    Rejected { row: usize, input: String, reason: String },
}

/// Whoever answers label requests: a person at a prompt, or a test script.
pub trait LabelOperator {
    /// Propose a label for `row`. `None` ends the session.
    fn propose(&mut self, row: usize, text: &str) -> Option<String>;

    /// Told when a proposal was rejected.
    fn rejected(&mut self, _row: usize, _reason: &str) {}
}

/// Add `name` as a label column with every row `not_set`, unless the table
/// already has it. Returns whether the column was added.
pub fn ensure_label_column(table: &mut Table, name: &str) -> Result<bool, TableError> {
    if table.column(name).is_some() {
        return Ok(false);
    }
    let unset = vec![ServingType::NOT_SET.to_string(); table.num_rows()];
    table.push_column(name, Values::Utf8(unset))?;
    info!(column = name, rows = table.num_rows(), "added empty label column");
    Ok(true)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelStats {
    pub accepted: usize,
    pub rejected: usize,
    pub remaining: usize,
}

/// Request/response labelling over one text column and one label column.
pub struct LabelSession<'a> {
    table: &'a mut Table,
    text_column: String,
    label_column: String,
}

impl<'a> LabelSession<'a> {
    /// Both columns must exist and hold text.
    pub fn new(
        table: &'a mut Table,
        text_column: &str,
        label_column: &str,
    ) -> Result<Self, LabelError> {
        table.text_column(text_column)?;
        table.text_column(label_column)?;
        Ok(Self {
            table,
            text_column: text_column.to_string(),
            label_column: label_column.to_string(),
        })
    }

    fn labels(&self) -> Result<&[String], LabelError> {
        Ok(self.table.text_column(&self.label_column)?)
    }

    /// First row whose label is still `not_set`.
    pub fn next_pending(&self) -> Result<Option<Pending>, LabelError> {
        let labels = self.labels()?;
        let Some(row) = labels.iter().position(|l| l == ServingType::NOT_SET) else {
            return Ok(None);
        };
        let text = self.table.text_column(&self.text_column)?[row].clone();
        Ok(Some(Pending { row, text }))
    }

    pub fn pending_count(&self) -> Result<usize, LabelError> {
        Ok(self
            .labels()?
            .iter()
            .filter(|l| *l == ServingType::NOT_SET)
            .count())
    }

    /// Apply a proposed label to `row`. Bad input is reported in the outcome,
    /// never as an error.
    pub fn submit(&mut self, row: usize, input: &str) -> Result<LabelOutcome, LabelError> {
        match ServingType::parse_label(input) {
            Ok(label) => {
                self.table.set_text(&self.label_column, row, label.as_str())?;
                debug!(row, %label, "label accepted");
                Ok(LabelOutcome::Accepted { row, label })
            }
            Err(reason) => {
                warn!(row, input = input.trim(), "{}", reason);
                Ok(LabelOutcome::Rejected {
                    row,
                    input: input.to_string(),
                    reason,
                })
            }
        }
    }

    /// Keep asking `operator` about the first pending row until nothing is
    /// pending or the operator stops.
    pub fn run<O: LabelOperator + ?Sized>(
        &mut self,
        operator: &mut O,
    ) -> Result<LabelStats, LabelError> {
        let mut stats = LabelStats::default();

        while let Some(Pending { row, text }) = self.next_pending()? {
            let Some(input) = operator.propose(row, &text) else {
                info!(row, "operator stopped labelling");
                break;
            };
            match self.submit(row, &input)? {
                LabelOutcome::Accepted { .. } => stats.accepted += 1,
                LabelOutcome::Rejected { reason, .. } => {
                    stats.rejected += 1;
                    operator.rejected(row, &reason);
                }
            }
        }

        stats.remaining = self.pending_count()?;
        info!(
            accepted = stats.accepted,
            rejected = stats.rejected,
            remaining = stats.remaining,
            "labelling finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use std::collections::VecDeque;

    fn table(labels: &[&str]) -> Table {
        let texts = (0..labels.len()).map(|i| format!("review {}", i)).collect();
        Table::from_columns(vec![
            Column {
                name: "review/text".into(),
                values: Values::Utf8(texts),
            },
            Column {
                name: "serving_type".into(),
                values: Values::Utf8(labels.iter().map(|s| s.to_string()).collect()),
            },
        ])
        .unwrap()
    }

    /// Answers from a fixed script, then stops.
    struct Scripted {
        answers: VecDeque<&'static str>,
        asked: Vec<usize>,
        rejections: Vec<String>,
    }

    impl Scripted {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
                rejections: Vec::new(),
            }
        }
    }

    impl LabelOperator for Scripted {
        fn propose(&mut self, row: usize, _text: &str) -> Option<String> {
            self.asked.push(row);
            self.answers.pop_front().map(str::to_string)
        }

        fn rejected(&mut self, _row: usize, reason: &str) {
            self.rejections.push(reason.to_string());
        }
    }

    #[test]
    fn next_pending_is_first_not_set_row() {
        let mut t = table(&["can", "not_set", "not_set"]);
        let session = LabelSession::new(&mut t, "review/text", "serving_type").unwrap();
        assert_eq!(
            session.next_pending().unwrap(),
            Some(Pending {
                row: 1,
                text: "review 1".into()
            })
        );
        assert_eq!(session.pending_count().unwrap(), 2);
    }

    #[test]
    fn invalid_label_leaves_table_untouched() {
        let mut t = table(&["not_set", "bottle", "not_set"]);
        let before = t.clone();

        let mut session = LabelSession::new(&mut t, "review/text", "serving_type").unwrap();
        let pending = session.next_pending().unwrap().unwrap();
        assert_eq!(pending.row, 0);

        let outcome = session.submit(pending.row, "growler").unwrap();
        assert!(matches!(outcome, LabelOutcome::Rejected { row: 0, .. }));
        assert_eq!(session.next_pending().unwrap().map(|p| p.row), Some(0));
        drop(session);

        assert_eq!(t, before);
    }

    #[test]
    fn run_until_nothing_pending() {
        let mut t = table(&["not_set", "draft", "not_set"]);
        let mut op = Scripted::new(&["keg", "Bottle", "can", "unused"]);

        let stats = LabelSession::new(&mut t, "review/text", "serving_type")
            .unwrap()
            .run(&mut op)
            .unwrap();

        assert_eq!(
            stats,
            LabelStats {
                accepted: 2,
                rejected: 1,
                remaining: 0
            }
        );
        assert_eq!(op.asked, vec![0, 0, 2]);
        assert_eq!(op.rejections.len(), 1);
        assert_eq!(
            t.text_column("serving_type").unwrap(),
            &["bottle", "draft", "can"]
        );
    }

    #[test]
    fn operator_can_stop_early() {
        let mut t = table(&["not_set", "not_set"]);
        let mut op = Scripted::new(&["unknown"]);

        let stats = LabelSession::new(&mut t, "review/text", "serving_type")
            .unwrap()
            .run(&mut op)
            .unwrap();

        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.remaining, 1);
        assert_eq!(t.text_column("serving_type").unwrap(), &["unknown", "not_set"]);
    }

    #[test]
    fn missing_label_column() {
        let mut t = table(&["not_set"]);
        assert!(LabelSession::new(&mut t, "review/text", "label").is_err());
    }

    #[test]
    fn label_column_is_added_once() {
        let mut t = Table::from_columns(vec![Column {
            name: "review/text".into(),
            values: Values::Utf8(vec!["a".into(), "b".into()]),
        }])
        .unwrap();

        assert!(ensure_label_column(&mut t, "serving_type").unwrap());
        assert_eq!(t.text_column("serving_type").unwrap(), &["not_set", "not_set"]);

        t.set_text("serving_type", 0, "can").unwrap();
        assert!(!ensure_label_column(&mut t, "serving_type").unwrap());
        assert_eq!(t.text_column("serving_type").unwrap(), &["can", "not_set"]);
    }

    #[test]
    fn label_column_on_empty_table() {
        let mut t = Table::new();
        assert!(ensure_label_column(&mut t, "serving_type").unwrap());
        assert_eq!(t.num_rows(), 0);
        let session = LabelSession::new(&mut t, "serving_type", "serving_type").unwrap();
        assert_eq!(session.next_pending().unwrap(), None);
    }
}
