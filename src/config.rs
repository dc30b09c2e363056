// src/config.rs

use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::export::OutputFormat;
use crate::extract::{ExtractOptions, RecordBoundary};

/// Record boundary policy as named on the command line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    #[default]
    KeyRecurrence,
    BlankLine,
    Sentinel,
}

/// `boundary:` as written in YAML: `key-recurrence`, `blank-line`, or
/// `{ sentinel: <key> }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundarySetting {
    Named(BoundaryKind),
    Sentinel { sentinel: String },
}

impl Default for BoundarySetting {
    fn default() -> Self {
        BoundarySetting::Named(BoundaryKind::KeyRecurrence)
    }
}

/// Everything a run needs, passed explicitly to each stage.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub boundary: BoundarySetting,
    pub text_column: String,
    pub polarity_column: String,
    pub subjectivity_column: Option<String>,
    pub readability_column: String,
    pub serving_column: String,
    pub progress_every: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::Csv,
            boundary: BoundarySetting::default(),
            text_column: "review/text".into(),
            polarity_column: "polarity".into(),
            subjectivity_column: None,
            readability_column: "readability".into(),
            serving_column: "serving_type".into(),
            progress_every: 100_000,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // an empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(yaml).context("parsing config YAML")?;
        cfg.record_boundary()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading config {}", path.display()))
    }

    /// Fold `--boundary` / `--sentinel` into the configured boundary.
    /// A sentinel key on its own implies the sentinel policy.
    pub fn override_boundary(&mut self, kind: Option<BoundaryKind>, sentinel: Option<String>) {
        match (kind, sentinel) {
            (None | Some(BoundaryKind::Sentinel), Some(key)) => {
                self.boundary = BoundarySetting::Sentinel { sentinel: key };
            }
            (Some(kind), _) => self.boundary = BoundarySetting::Named(kind),
            (None, None) => {}
        }
    }

    pub fn record_boundary(&self) -> Result<RecordBoundary> {
        match &self.boundary {
            BoundarySetting::Named(BoundaryKind::KeyRecurrence) => {
                Ok(RecordBoundary::KeyRecurrence)
            }
            BoundarySetting::Named(BoundaryKind::BlankLine) => Ok(RecordBoundary::BlankLine),
            BoundarySetting::Named(BoundaryKind::Sentinel) => Err(anyhow!(
                "boundary `sentinel` needs a key, e.g. `boundary: {{ sentinel: beer/name }}`"
            )),
            BoundarySetting::Sentinel { sentinel } if !sentinel.trim().is_empty() => {
                Ok(RecordBoundary::SentinelKey(sentinel.trim().to_string()))
            }
            BoundarySetting::Sentinel { .. } => Err(anyhow!("sentinel key must not be empty")),
        }
    }

    pub fn extract_options(&self, progress: ProgressBar) -> Result<ExtractOptions> {
        Ok(ExtractOptions {
            boundary: self.record_boundary()?,
            progress_every: self.progress_every,
            progress,
        })
    }
}
