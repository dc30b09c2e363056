use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::trace;

use super::line::{parse_line, Field};
use crate::error::ExtractError;
use crate::table::{Column, Table, Values};

/// Where one record ends and the next begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordBoundary {
    /// A key that already occurs in the open record starts a new one.
    #[default]
    KeyRecurrence,
    /// Blank lines (and end of input) close the open record.
    BlankLine,
    /// Every record starts with this key.
    SentinelKey(String),
}

/// Counters collected while extracting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractStats {
    pub lines: u64,
    pub blank_lines: u64,
    pub fields: u64,
    pub records: u64,
    pub bytes: u64,
}

#[derive(Debug)]
struct OpenRecord {
    fields: Vec<Field>,
    keys: HashSet<String>,
    start_line: u64,
}

impl OpenRecord {
    fn new(start_line: u64) -> Self {
        Self {
            fields: Vec::new(),
            keys: HashSet::new(),
            start_line,
        }
    }

    fn push(&mut self, field: Field) {
        self.keys.insert(field.key.clone());
        self.fields.push(field);
    }
}

/// Groups parsed fields into records and records into columns.
///
/// Feed it raw lines in file order, then call `finish`. The first committed
/// record fixes the column set; every later record must carry exactly the
/// same keys or the extractor fails with `SchemaMismatch`.
pub struct RecordExtractor {
    boundary: RecordBoundary,

    /// Column name + values, in first-seen key order.
    columns: Vec<(String, Vec<String>)>,

    /// Column name → position in `columns`.
    index: HashMap<String, usize>,

    /// Record currently being assembled, if any.
    open: Option<OpenRecord>,

    /// Records committed so far.
    records: usize,

    stats: ExtractStats,
}

impl RecordExtractor {
    pub fn new(boundary: RecordBoundary) -> Self {
        Self {
            boundary,
            columns: Vec::new(),
            index: HashMap::new(),
            open: None,
            records: 0,
            stats: ExtractStats::default(),
        }
    }

    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    /// Process a single raw line.
    pub fn feed_line(&mut self, line_no: u64, raw: &str) -> Result<(), ExtractError> {
        self.stats.lines += 1;
        self.stats.bytes += raw.len() as u64;

        match parse_line(line_no, raw)? {
            None => {
                self.stats.blank_lines += 1;
                if self.boundary == RecordBoundary::BlankLine {
                    self.close_open()?;
                }
                Ok(())
            }
            Some(field) => {
                self.stats.fields += 1;
                self.feed_field(field)
            }
        }
    }

    fn feed_field(&mut self, field: Field) -> Result<(), ExtractError> {
        let repeated = self
            .open
            .as_ref()
            .is_some_and(|r| r.keys.contains(&field.key));

        let (starts_record, sentinel) = match &self.boundary {
            RecordBoundary::KeyRecurrence => (repeated, None),
            RecordBoundary::BlankLine => (false, None),
            RecordBoundary::SentinelKey(k) => (field.key == *k, Some(k.clone())),
        };

        if starts_record {
            self.close_open()?;
        } else if repeated {
            return Err(ExtractError::SchemaMismatch {
                record: self.records,
                detail: format!(
                    "key `{}` repeated within one record (line {})",
                    field.key, field.line_no
                ),
            });
        } else if let (Some(sentinel), None) = (sentinel, self.open.as_ref()) {
            return Err(ExtractError::SchemaMismatch {
                record: self.records,
                detail: format!(
                    "record at line {} starts with `{}`, expected `{}`",
                    field.line_no, field.key, sentinel
                ),
            });
        }

        self.open
            .get_or_insert_with(|| OpenRecord::new(field.line_no))
            .push(field);
        Ok(())
    }

    fn close_open(&mut self) -> Result<(), ExtractError> {
        match self.open.take() {
            Some(rec) => self.commit(rec),
            None => Ok(()),
        }
    }

    fn commit(&mut self, rec: OpenRecord) -> Result<(), ExtractError> {
        if self.columns.is_empty() {
            // first record declares the schema
            for field in rec.fields {
                self.index.insert(field.key.clone(), self.columns.len());
                self.columns.push((field.key, vec![field.value]));
            }
        } else {
            let missing: Vec<&str> = self
                .columns
                .iter()
                .map(|(name, _)| name.as_str())
                .filter(|name| !rec.keys.contains(*name))
                .collect();
            let mut unexpected: Vec<&str> = rec
                .fields
                .iter()
                .map(|f| f.key.as_str())
                .filter(|k| !self.index.contains_key(*k))
                .collect();
            unexpected.dedup();

            if !missing.is_empty() || !unexpected.is_empty() {
                return Err(ExtractError::SchemaMismatch {
                    record: self.records,
                    detail: format!(
                        "record starting at line {}: missing keys {:?}, unexpected keys {:?}",
                        rec.start_line, missing, unexpected
                    ),
                });
            }

            for field in rec.fields {
                let idx = self.index[&field.key];
                self.columns[idx].1.push(field.value);
            }
        }

        self.records += 1;
        trace!(record = self.records, "committed record");
        Ok(())
    }

    /// Close any open record, check every column has one value per record,
    /// and hand back the table.
    pub fn finish(mut self) -> Result<(Table, ExtractStats), ExtractError> {
        self.close_open()?;

        for (name, values) in &self.columns {
            if values.len() != self.records {
                return Err(ExtractError::SchemaMismatch {
                    record: self.records,
                    detail: format!(
                        "column `{}` has {} values, expected {}",
                        name,
                        values.len(),
                        self.records
                    ),
                });
            }
        }

        let records = self.records;
        let columns = self
            .columns
            .into_iter()
            .map(|(name, values)| Column {
                name,
                values: Values::Utf8(values),
            })
            .collect();
        let table = Table::from_columns(columns).map_err(|e| ExtractError::SchemaMismatch {
            record: records,
            detail: e.to_string(),
        })?;

        self.stats.records = records as u64;
        Ok((table, self.stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(boundary: RecordBoundary, input: &str) -> Result<Table, ExtractError> {
        let mut ex = RecordExtractor::new(boundary);
        for (i, line) in input.lines().enumerate() {
            ex.feed_line(i as u64 + 1, line)?;
        }
        ex.finish().map(|(t, _)| t)
    }

    #[test]
    fn key_recurrence_groups_in_first_seen_order() {
        let t = run(
            RecordBoundary::KeyRecurrence,
            "review/appearance: 4\nreview/aroma: 3.5\nreview/appearance: 3\nreview/aroma: 4\n",
        )
        .unwrap();

        assert_eq!(t.column_names(), vec!["review/appearance", "review/aroma"]);
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.text_column("review/appearance").unwrap(), &["4", "3"]);
        assert_eq!(t.text_column("review/aroma").unwrap(), &["3.5", "4"]);
    }

    #[test]
    fn key_recurrence_rejects_missing_key() {
        // second record omits `b`; the source would have silently truncated
        let err = run(RecordBoundary::KeyRecurrence, "a: 1\nb: 2\na: 3\na: 5\nb: 6\n").unwrap_err();
        match err {
            ExtractError::SchemaMismatch { record, detail } => {
                assert_eq!(record, 1);
                assert!(detail.contains("\"b\""), "{detail}");
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn unexpected_key_is_rejected() {
        let err = run(RecordBoundary::BlankLine, "a: 1\n\na: 2\nc: 3\n").unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch { record: 1, .. }));
    }

    #[test]
    fn blank_line_boundary_allows_reordered_keys() {
        let t = run(RecordBoundary::BlankLine, "a: 1\nb: 2\n\n\nb: 4\na: 3\n").unwrap();
        assert_eq!(t.column_names(), vec!["a", "b"]);
        assert_eq!(t.text_column("a").unwrap(), &["1", "3"]);
        assert_eq!(t.text_column("b").unwrap(), &["2", "4"]);
    }

    #[test]
    fn blank_line_boundary_rejects_repeated_key() {
        let err = run(RecordBoundary::BlankLine, "a: 1\na: 2\n").unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch { record: 0, .. }));
    }

    #[test]
    fn sentinel_boundary() {
        let sentinel = RecordBoundary::SentinelKey("beer/name".into());
        let t = run(
            sentinel.clone(),
            "beer/name: Sausa Weizen\nreview/overall: 1.5\n\
             beer/name: Red Moon\nreview/overall: 3\n",
        )
        .unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.text_column("beer/name").unwrap(), &["Sausa Weizen", "Red Moon"]);

        let err = run(sentinel.clone(), "review/overall: 1.5\nbeer/name: x\n").unwrap_err();
        assert!(matches!(err, ExtractError::SchemaMismatch { record: 0, .. }));

        // a key repeated before the next sentinel is not a new record
        let err = run(
            sentinel,
            "beer/name: x\nreview/overall: 1.5\nreview/overall: 2\nbeer/name: y\n",
        )
        .unwrap_err();
        match err {
            ExtractError::SchemaMismatch { record, detail } => {
                assert_eq!(record, 0);
                assert!(detail.contains("`review/overall` repeated"), "{detail}");
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn malformed_line_aborts() {
        let err = run(RecordBoundary::KeyRecurrence, "a: 1\nno colon here\n").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedLine { line_no: 2, .. }));
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let t = run(RecordBoundary::KeyRecurrence, "\n\n").unwrap();
        assert_eq!(t.num_columns(), 0);
        assert_eq!(t.num_rows(), 0);
    }

    #[test]
    fn stats_are_counted() {
        let mut ex = RecordExtractor::new(RecordBoundary::KeyRecurrence);
        for (i, line) in ["a: 1\n", "\n", "a: 2\n"].iter().enumerate() {
            ex.feed_line(i as u64 + 1, line).unwrap();
        }
        let (_, stats) = ex.finish().unwrap();
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.fields, 2);
        assert_eq!(stats.records, 2);
        assert_eq!(stats.bytes, 11);
    }

    #[test]
    fn stats_serialize_by_field_name() {
        let stats = ExtractStats {
            lines: 12,
            blank_lines: 2,
            fields: 10,
            records: 2,
            bytes: 240,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["records"], 2);
        assert_eq!(json["blank_lines"], 2);
        let back: ExtractStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
