use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use reviewdump::{
    enrich::{self, Polarity, Readability, Subjectivity},
    export::{self, default_name, read_csv, save_csv_in_place},
    extract_file,
    label::{accuracy_of_columns, ensure_label_column, PromptOperator},
    BoundaryKind, Config, ExtractStats, Extraction, LabelSession, OutputFormat, Table,
};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "reviewdump",
    about = "Turn key-value review dumps into tables, score them, and label them",
    version
)]
struct Cli {
    /// YAML config file. Flags override values from it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hide progress bars.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ExtractArgs {
    #[arg(long, value_enum)]
    boundary: Option<BoundaryKind>,
    /// Key that starts every record (with `--boundary sentinel`).
    #[arg(long)]
    sentinel: Option<String>,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Output file name without extension. Defaults to the input's name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a dump (or every file matching a glob pattern) to a table file.
    Convert {
        input: String,
        #[command(flatten)]
        extract: ExtractArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Convert, then add sentiment, readability and serving-type columns.
    Enrich {
        input: String,
        #[command(flatten)]
        extract: ExtractArgs,
        #[command(flatten)]
        output: OutputArgs,
        #[arg(long)]
        text_column: Option<String>,
        /// Also add a subjectivity column.
        #[arg(long)]
        subjectivity: bool,
    },

    /// Count empty values per column.
    Missing {
        input: PathBuf,
        #[command(flatten)]
        extract: ExtractArgs,
        #[arg(long)]
        json: bool,
    },

    /// Label `not_set` serving types of a CSV export at the prompt.
    Label {
        csv: PathBuf,
        #[arg(long)]
        text_column: Option<String>,
        #[arg(long)]
        label_column: Option<String>,
    },

    /// Compare two label columns of a CSV export.
    Accuracy {
        csv: PathBuf,
        #[arg(long)]
        predicted: String,
        #[arg(long)]
        truth: String,
        /// Ignore rows whose truth is still `not_set`.
        #[arg(long)]
        skip_unset: bool,
    },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) load config ──────────────────────────────────────────────
    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // ─── 3) dispatch ─────────────────────────────────────────────────
    match cli.command {
        Command::Convert {
            input,
            extract,
            output,
        } => {
            apply_extract_args(&mut cfg, extract);
            let name = apply_output_args(&mut cfg, output);
            for path in expand_inputs(&input, name.as_deref())? {
                let table = load(&path, &cfg, cli.quiet)?.table;
                write_export(&table, &path, name.as_deref(), &cfg)?;
            }
        }

        Command::Enrich {
            input,
            extract,
            output,
            text_column,
            subjectivity,
        } => {
            apply_extract_args(&mut cfg, extract);
            let name = apply_output_args(&mut cfg, output);
            if let Some(col) = text_column {
                cfg.text_column = col;
            }
            if subjectivity && cfg.subjectivity_column.is_none() {
                cfg.subjectivity_column = Some("subjectivity".into());
            }
            for path in expand_inputs(&input, name.as_deref())? {
                let mut table = load(&path, &cfg, cli.quiet)?.table;
                enrich_table(&mut table, &cfg, cli.quiet)?;
                write_export(&table, &path, name.as_deref(), &cfg)?;
            }
        }

        Command::Missing {
            input,
            extract,
            json,
        } => {
            apply_extract_args(&mut cfg, extract);
            let Extraction { table, stats } = load(&input, &cfg, cli.quiet)?;
            let counts = table.missing_counts();
            if json {
                let report = MissingReport {
                    rows: table.num_rows(),
                    stats,
                    missing: counts.into_iter().collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{:<30} {:>10} {:>10}", "column", "missing", "rows");
                println!("{:-<52}", "");
                for (col, missing) in counts {
                    println!("{:<30} {:>10} {:>10}", col, missing, table.num_rows());
                }
            }
        }

        Command::Label {
            csv,
            text_column,
            label_column,
        } => {
            let text_column = text_column.unwrap_or_else(|| cfg.text_column.clone());
            let label_column = label_column.unwrap_or_else(|| cfg.serving_column.clone());
            label_csv(&csv, &text_column, &label_column)?;
        }

        Command::Accuracy {
            csv,
            predicted,
            truth,
            skip_unset,
        } => {
            let table = read_csv(&csv)?;
            let acc = accuracy_of_columns(&table, &predicted, &truth, skip_unset)?;
            info!(rows = acc.compared, accuracy = acc.accuracy, "computed accuracy");
            println!("{:.4}", acc.accuracy);
        }
    }

    Ok(())
}

/// Per-column empty counts plus the extraction counters, for `missing --json`.
#[derive(Serialize)]
struct MissingReport {
    rows: usize,
    stats: ExtractStats,
    missing: BTreeMap<String, usize>,
}

fn apply_extract_args(cfg: &mut Config, args: ExtractArgs) {
    cfg.override_boundary(args.boundary, args.sentinel);
}

/// Fold output flags into `cfg`; the explicit name is per-run, not config.
fn apply_output_args(cfg: &mut Config, args: OutputArgs) -> Option<String> {
    if let Some(f) = args.format {
        cfg.format = f;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    args.name
}

/// A literal path, or every file matching a glob pattern.
fn expand_inputs(pattern: &str, name: Option<&str>) -> Result<Vec<PathBuf>> {
    let matches: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("invalid input pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();

    if matches.is_empty() {
        // let extraction report the missing file
        return Ok(vec![PathBuf::from(pattern)]);
    }
    if matches.len() > 1 && name.is_some() {
        return Err(anyhow!(
            "--name given but '{}' matches {} files",
            pattern,
            matches.len()
        ));
    }
    Ok(matches)
}

fn byte_bar(quiet: bool, path: &Path) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?,
    );
    pb.set_message(default_name(path));
    Ok(pb)
}

fn row_bar(quiet: bool, what: &str) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?,
    );
    pb.set_message(what.to_string());
    Ok(pb)
}

fn load(path: &Path, cfg: &Config, quiet: bool) -> Result<Extraction> {
    let opts = cfg.extract_options(byte_bar(quiet, path)?)?;
    let extraction =
        extract_file(path, &opts).with_context(|| format!("extracting {}", path.display()))?;
    info!(
        path = %path.display(),
        stats = ?extraction.stats,
        "loaded review dump"
    );
    Ok(extraction)
}

fn enrich_table(table: &mut Table, cfg: &Config, quiet: bool) -> Result<()> {
    let start = Instant::now();
    let text = cfg.text_column.as_str();

    enrich::apply_scorer(
        table,
        text,
        &cfg.polarity_column,
        &Polarity,
        &row_bar(quiet, "polarity")?,
    )?;
    if let Some(col) = &cfg.subjectivity_column {
        enrich::apply_scorer(table, text, col, &Subjectivity, &row_bar(quiet, "subjectivity")?)?;
    }
    enrich::apply_scorer(
        table,
        text,
        &cfg.readability_column,
        &Readability,
        &row_bar(quiet, "readability")?,
    )?;
    enrich::add_serving_type_column(
        table,
        text,
        &cfg.serving_column,
        &row_bar(quiet, "serving type")?,
    )?;

    info!(columns = table.num_columns(), elapsed = ?start.elapsed(), "enriched table");
    Ok(())
}

fn write_export(table: &Table, input: &Path, name: Option<&str>, cfg: &Config) -> Result<()> {
    let name = name.map(str::to_string).unwrap_or_else(|| default_name(input));
    let path = export::export_table(table, &cfg.output_dir, &name, cfg.format)?;
    println!("{}", path.display());
    Ok(())
}

fn label_csv(path: &Path, text_column: &str, label_column: &str) -> Result<()> {
    let mut table = read_csv(path)?;
    ensure_label_column(&mut table, label_column)?;

    let stdin = io::stdin();
    let mut operator = PromptOperator::new(stdin.lock(), io::stdout());
    let stats = LabelSession::new(&mut table, text_column, label_column)?.run(&mut operator)?;
    println!(
        "accepted {}, rejected {}, still unset {}",
        stats.accepted, stats.rejected, stats.remaining
    );

    save_csv_in_place(&table, path)
        .with_context(|| format!("saving labels to {}", path.display()))?;
    Ok(())
}
