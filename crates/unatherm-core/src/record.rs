//! Dataset record model and thermodynamic result fields.

use serde::{Deserialize, Serialize};

/// Column holding the sparse, forward-filled identifier.
pub const COL_ENTRY_ID: &str = "Entry ID";
/// Column holding the raw nucleotide sequence.
pub const COL_SEQUENCE: &str = "Sequence";
pub const COL_DELTA_G: &str = "ΔG";
pub const COL_DELTA_H: &str = "ΔH";
pub const COL_DELTA_S: &str = "ΔS";
pub const COL_MELTING_TEMP: &str = "Tm (°C)";

/// The four result columns, in the order they are appended to a table.
pub const THERMO_COLUMNS: [&str; 4] = [COL_DELTA_G, COL_DELTA_H, COL_DELTA_S, COL_MELTING_TEMP];

/// Written when the response text has fewer tokens than a field's offset.
pub const SENTINEL_MISSING: &str = "N/A";
/// Written to all four fields when enrichment of a row failed.
pub const SENTINEL_ERROR: &str = "ERROR";

/// Thermodynamic parameters for one sequence, kept as the text the
/// remote service rendered (including sentinels).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermoParams {
    pub delta_g: String,
    pub delta_h: String,
    pub delta_s: String,
    pub melting_temp: String,
}

impl ThermoParams {
    /// All four fields set to the `ERROR` sentinel.
    pub fn error() -> Self {
        Self {
            delta_g: SENTINEL_ERROR.into(),
            delta_h: SENTINEL_ERROR.into(),
            delta_s: SENTINEL_ERROR.into(),
            melting_temp: SENTINEL_ERROR.into(),
        }
    }

    /// Fields in column order (`ΔG`, `ΔH`, `ΔS`, `Tm (°C)`).
    pub fn as_array(&self) -> [&str; 4] {
        [
            self.delta_g.as_str(),
            self.delta_h.as_str(),
            self.delta_s.as_str(),
            self.melting_temp.as_str(),
        ]
    }

    /// Build from four cells; `None` when every cell is blank.
    pub fn from_cells(cells: [&str; 4]) -> Option<Self> {
        if cells.iter().all(|c| c.trim().is_empty()) {
            return None;
        }
        Some(Self {
            delta_g: cells[0].trim().to_string(),
            delta_h: cells[1].trim().to_string(),
            delta_s: cells[2].trim().to_string(),
            melting_temp: cells[3].trim().to_string(),
        })
    }

    pub fn is_error(&self) -> bool {
        self.as_array().iter().all(|v| *v == SENTINEL_ERROR)
    }

    /// True when no field is blank or a sentinel.
    pub fn is_complete(&self) -> bool {
        self.as_array()
            .iter()
            .all(|v| !v.is_empty() && *v != SENTINEL_ERROR && *v != SENTINEL_MISSING)
    }
}

/// Outcome of enrichment for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnrichmentStatus {
    Ok,
    Error,
    NotYetRun,
}

impl std::fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
            Self::NotYetRun => write!(f, "not-yet-run"),
        }
    }
}

/// One row of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Trimmed identifier cell; `None` when blank.
    pub raw_identifier: Option<String>,
    pub sequence: String,
    /// Unset until the batch pass has visited the row.
    pub thermo: Option<ThermoParams>,
    /// Every cell of the source row, padded to the header width.
    /// Columns the pipeline does not own are written back from here.
    #[serde(skip)]
    pub cells: Vec<String>,
}

impl Record {
    pub fn new(raw_identifier: Option<&str>, sequence: &str) -> Self {
        Self {
            raw_identifier: raw_identifier.map(str::to_string),
            sequence: sequence.to_string(),
            thermo: None,
            cells: Vec::new(),
        }
    }

    pub fn status(&self) -> EnrichmentStatus {
        match &self.thermo {
            None => EnrichmentStatus::NotYetRun,
            Some(t) if t.is_error() => EnrichmentStatus::Error,
            Some(_) => EnrichmentStatus::Ok,
        }
    }

    /// Field value for display, `N/A` when unset.
    pub fn field_or_missing(&self, index: usize) -> &str {
        self.thermo
            .as_ref()
            .map(|t| t.as_array()[index])
            .filter(|v| !v.is_empty())
            .unwrap_or(SENTINEL_MISSING)
    }

    /// Leading characters of the sequence for progress output.
    pub fn sequence_preview(&self, max_chars: usize) -> &str {
        match self.sequence.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.sequence[..idx],
            None => &self.sequence,
        }
    }
}
