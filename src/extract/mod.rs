// src/extract/mod.rs
pub mod line;
pub mod record;

use indicatif::ProgressBar;
use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    time::Instant,
};
use tracing::{debug, info};

use crate::error::ExtractError;
use crate::table::Table;

pub use line::{parse_line, Field};
pub use record::{ExtractStats, RecordBoundary, RecordExtractor};

const READ_BUFFER_BYTES: usize = 1 << 20;

/// Byte-order mark some editors put at the start of UTF-8 files.
const BOM: char = '\u{feff}';

/// Knobs for a single extraction run.
#[derive(Clone)]
pub struct ExtractOptions {
    pub boundary: RecordBoundary,
    /// Emit a debug progress line every N input lines (0 disables).
    pub progress_every: u64,
    /// Advanced by bytes consumed. Hidden unless the caller supplies a visible bar.
    pub progress: ProgressBar,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            boundary: RecordBoundary::default(),
            progress_every: 100_000,
            progress: ProgressBar::hidden(),
        }
    }
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("boundary", &self.boundary)
            .field("progress_every", &self.progress_every)
            .finish_non_exhaustive()
    }
}

/// A parsed table plus the counters gathered while building it.
#[derive(Debug)]
pub struct Extraction {
    pub table: Table,
    pub stats: ExtractStats,
}

/// Stream `reader` line by line into a table, in one pass.
pub fn extract_reader<R: BufRead>(
    mut reader: R,
    opts: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let start = Instant::now();
    let mut extractor = RecordExtractor::new(opts.boundary.clone());

    let mut line = String::new();
    let mut line_no: u64 = 0;
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break; // EOF
        }
        line_no += 1;

        let raw = match line_no {
            1 => line.strip_prefix(BOM).unwrap_or(&line),
            _ => line.as_str(),
        };
        extractor.feed_line(line_no, raw)?;
        opts.progress.inc(bytes_read as u64);

        if opts.progress_every > 0 && line_no % opts.progress_every == 0 {
            let stats = extractor.stats();
            debug!(
                lines = line_no,
                bytes = stats.bytes,
                fields = stats.fields,
                "extraction progress"
            );
        }
    }

    let (table, stats) = extractor.finish()?;
    opts.progress.finish_and_clear();

    info!(
        lines = stats.lines,
        records = stats.records,
        columns = table.num_columns(),
        elapsed = ?start.elapsed(),
        "extracted table"
    );
    Ok(Extraction { table, stats })
}

/// Open `path` and extract it. The progress bar length is set to the file
/// size, so progress needs no separate counting pass.
#[tracing::instrument(
    level = "info",
    skip(path, opts),
    fields(path = %path.as_ref().display())
)]
pub fn extract_file<P: AsRef<Path>>(
    path: P,
    opts: &ExtractOptions,
) -> Result<Extraction, ExtractError> {
    let file = File::open(&path)?;
    let len = file.metadata()?.len();
    opts.progress.set_length(len);
    debug!(bytes = len, "opened input");

    let reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);
    extract_reader(reader, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,reviewdump::extract=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const SAMPLE: &str = "beer/name: Sausa Weizen
beer/beerId: 47986
beer/ABV: 5.00
review/overall: 1.5
review/text: A lot of foam. But a lot. In the smell some banana, and then lactic and tart.

beer/name: Red Moon
beer/beerId: 48213
beer/ABV: 6.20
review/overall: 3
review/text: Dark red color, light beige foam, average. In the smell malt and caramel.

beer/name: Black Horse Black Beer
beer/beerId: 48215
beer/ABV: 6.50
review/overall: 3
review/text: Almost totally black. Beige foam, quite compact, not bad.
";

    #[test]
    fn extracts_review_dump_from_file() -> Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SAMPLE.as_bytes())?;

        let opts = ExtractOptions {
            progress_every: 2,
            ..ExtractOptions::default()
        };
        let Extraction { table, stats } = extract_file(tmp.path(), &opts)?;

        assert_eq!(
            table.column_names(),
            vec![
                "beer/name",
                "beer/beerId",
                "beer/ABV",
                "review/overall",
                "review/text"
            ]
        );
        assert_eq!(table.num_rows(), 3);
        for col in table.columns() {
            assert_eq!(col.values.len(), 3, "column {}", col.name);
        }
        assert_eq!(
            table.text_column("beer/beerId")?,
            &["47986", "48213", "48215"]
        );
        assert_eq!(stats.records, 3);
        assert_eq!(stats.blank_lines, 2);
        assert_eq!(stats.bytes, SAMPLE.len() as u64);
        assert_eq!(opts.progress.position(), SAMPLE.len() as u64);
        Ok(())
    }

    #[test]
    fn blank_line_policy_matches_key_recurrence_on_clean_input() -> Result<()> {
        let by_key = extract_reader(Cursor::new(SAMPLE), &ExtractOptions::default())?;
        let by_blank = extract_reader(
            Cursor::new(SAMPLE),
            &ExtractOptions {
                boundary: RecordBoundary::BlankLine,
                ..ExtractOptions::default()
            },
        )?;
        assert_eq!(by_key.table, by_blank.table);
        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = extract_file("/definitely/not/here.txt", &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let bytes: &[u8] = b"beer/name: \xff\xfe\n";
        let err = extract_reader(Cursor::new(bytes), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let input = "beer/name: a\nreview/text: b\nno colon here\n";
        let err = extract_reader(Cursor::new(input), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedLine { line_no: 3, .. }));
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() -> Result<()> {
        let input = "\u{feff}beer/name: Red Moon\nreview/overall: 3\n\
                     beer/name: Sausa Weizen\nreview/overall: 1.5\n";
        let Extraction { table, .. } =
            extract_reader(Cursor::new(input), &ExtractOptions::default())?;
        assert_eq!(table.column_names(), vec!["beer/name", "review/overall"]);
        assert_eq!(table.text_column("beer/name")?, &["Red Moon", "Sausa Weizen"]);
        Ok(())
    }
}
