//! Run plan and report types.

use serde::Serialize;

/// One row's normalized identity and artifact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRow {
    pub row: usize,
    #[serde(rename = "effectiveId")]
    pub effective_id: Option<String>,
    #[serde(rename = "groupSize")]
    pub group_size: usize,
    pub ordinal: usize,
    pub name: String,
}

/// A row whose enrichment failed and was recorded as `ERROR`.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub name: String,
    pub error: String,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    #[serde(rename = "finishedAt", skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(rename = "totalRows")]
    pub total_rows: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

impl BatchReport {
    pub fn start(total_rows: usize) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
            total_rows,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Rows visited so far, including skipped ones.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}
