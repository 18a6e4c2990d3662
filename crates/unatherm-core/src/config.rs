//! Pipeline configuration: JSON file with defaults, overridden from env.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

pub const DEFAULT_FORM_URL: &str =
    "https://www.unafold.org/Dinamelt/applications/two-state-melting-folding.php";

/// Nucleic-acid energy rules selected on the remote form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnergyModel {
    #[default]
    Dna,
    Rna,
}

impl EnergyModel {
    /// Value submitted in the form's energy-rules selector.
    pub fn form_value(&self) -> &'static str {
        match self {
            Self::Dna => "DNA",
            Self::Rna => "RNA",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_uppercase().as_str() {
            "DNA" => Some(Self::Dna),
            "RNA" => Some(Self::Rna),
            _ => None,
        }
    }
}

impl std::fmt::Display for EnergyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.form_value())
    }
}

/// Settings for the remote melting service session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_form_url")]
    pub form_url: String,
    #[serde(default = "default_sequence_field")]
    pub sequence_field: String,
    #[serde(default = "default_energy_field")]
    pub energy_field: String,
    #[serde(default)]
    pub energy_model: EnergyModel,
    /// Upper bound for a single page request.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
    /// How long to wait for the input form or the results table to appear.
    #[serde(default = "default_element_timeout")]
    pub element_timeout_secs: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_form_url() -> String {
    DEFAULT_FORM_URL.into()
}
fn default_sequence_field() -> String {
    "seq".into()
}
fn default_energy_field() -> String {
    "energy_rules".into()
}
fn default_page_timeout() -> u64 {
    180
}
fn default_element_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    500
}
fn default_user_agent() -> String {
    concat!("unatherm/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            form_url: default_form_url(),
            sequence_field: default_sequence_field(),
            energy_field: default_energy_field(),
            energy_model: EnergyModel::Dna,
            page_timeout_secs: default_page_timeout(),
            element_timeout_secs: default_element_timeout(),
            poll_interval_ms: default_poll_interval(),
            user_agent: default_user_agent(),
        }
    }
}

/// Top-level configuration for an enrichment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Table that is read, enriched and rewritten in place.
    #[serde(default)]
    pub input: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Directory for per-row artifacts named after each row.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    #[serde(default)]
    pub save_raw_responses: bool,
    /// Keep rows that already carry complete results instead of re-fetching.
    #[serde(default)]
    pub resume: bool,
    /// A row that takes longer than this is recorded as `ERROR`.
    #[serde(default = "default_row_timeout")]
    pub row_timeout_secs: u64,
    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_delimiter() -> char {
    ','
}
fn default_artifact_dir() -> PathBuf {
    PathBuf::from("structure_pdfs")
}
fn default_row_timeout() -> u64 {
    60
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            delimiter: default_delimiter(),
            artifact_dir: default_artifact_dir(),
            save_raw_responses: false,
            resume: false,
            row_timeout_secs: default_row_timeout(),
            remote: RemoteConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&data)?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Apply `UNATHERM_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("UNATHERM_URL") {
            self.remote.form_url = url;
        }
        if let Some(secs) = lookup("UNATHERM_ROW_TIMEOUT_SECS") {
            self.row_timeout_secs = secs.trim().parse().map_err(|_| {
                Error::Config(format!("UNATHERM_ROW_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        if let Some(model) = lookup("UNATHERM_ENERGY_MODEL") {
            self.remote.energy_model = EnergyModel::from_name(&model).ok_or_else(|| {
                Error::Config(format!("UNATHERM_ENERGY_MODEL must be DNA or RNA, got {}", model))
            })?;
        }
        if let Some(dir) = lookup("UNATHERM_ARTIFACT_DIR") {
            self.artifact_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(Error::Config("no input table given".into()));
        }
        if self.row_timeout_secs == 0 {
            return Err(Error::Config("row timeout must be at least one second".into()));
        }
        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        Ok(())
    }

    pub fn row_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.row_timeout_secs)
    }
}
