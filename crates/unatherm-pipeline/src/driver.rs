//! Batch driver: sequential per-row enrichment with incremental flush.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use unatherm_core::{PipelineConfig, Result, ThermoParams};
use unatherm_remote::{MeltingService, RemoteError, ServiceResponse};
use unatherm_table::{generate_names, Table};

use crate::types::*;

const PREVIEW_CHARS: usize = 15;

/// Normalize identifiers and name every row. Fails on the first group
/// too large to label.
pub fn plan(table: &Table) -> Result<Vec<PlannedRow>> {
    let normalized = table.normalize();
    let names = generate_names(&normalized)?;
    Ok(normalized
        .into_iter()
        .zip(names)
        .enumerate()
        .map(|(row, (n, name))| PlannedRow {
            row,
            effective_id: n.effective_id,
            group_size: n.group_size,
            ordinal: n.ordinal,
            name,
        })
        .collect())
}

/// Drives one enrichment pass over a table.
pub struct BatchDriver {
    output: PathBuf,
    row_timeout: Duration,
    resume: bool,
    artifact_dir: PathBuf,
    save_raw_responses: bool,
}

impl BatchDriver {
    /// Driver that rewrites the configured input table in place.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            output: config.input.clone(),
            row_timeout: config.row_timeout(),
            resume: config.resume,
            artifact_dir: config.artifact_dir.clone(),
            save_raw_responses: config.save_raw_responses,
        }
    }

    /// Write to `path` instead of the input table.
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Enrich every row in order, persisting the full table after each one.
    ///
    /// A failed or timed-out row is recorded as `ERROR` and the pass moves
    /// on. Naming and write failures abort the run.
    pub async fn run<S: MeltingService>(
        &self,
        table: &mut Table,
        service: &mut S,
    ) -> Result<BatchReport> {
        let planned = plan(table)?;

        if !self.resume {
            table.reset_results();
        }
        if self.save_raw_responses {
            std::fs::create_dir_all(&self.artifact_dir)?;
        }

        let total = table.len();
        let mut report = BatchReport::start(total);
        info!(
            "Starting run {}: {} rows -> {}",
            report.run_id,
            total,
            self.output.display()
        );

        for entry in &planned {
            let idx = entry.row;
            let record = &table.records[idx];

            if self.resume && record.thermo.as_ref().is_some_and(ThermoParams::is_complete) {
                debug!("Skipping {}: already enriched", entry.name);
                report.skipped += 1;
                continue;
            }

            info!(
                "Processing {} ({}/{}), sequence: {}...",
                entry.name,
                idx + 1,
                total,
                record.sequence_preview(PREVIEW_CHARS)
            );

            let sequence = record.sequence.clone();
            let params = match self.enrich_row(service, &sequence).await {
                Ok(response) => {
                    let p = &response.params;
                    info!(
                        "{}: ΔG={}, ΔH={}, ΔS={}, Tm={}",
                        entry.name, p.delta_g, p.delta_h, p.delta_s, p.melting_temp
                    );
                    self.archive_response(&entry.name, &response);
                    report.succeeded += 1;
                    response.params
                }
                Err(e) => {
                    warn!("{} failed: {}", entry.name, e);
                    report.failed += 1;
                    report.failures.push(RowFailure {
                        row: idx,
                        name: entry.name.clone(),
                        error: e.to_string(),
                    });
                    ThermoParams::error()
                }
            };

            table.records[idx].thermo = Some(params);
            table.save(&self.output)?;
            info!("Saved {} to {}", entry.name, self.output.display());
        }

        report.finish();
        info!(
            "Run {} complete: {} ok, {} failed, {} skipped",
            report.run_id, report.succeeded, report.failed, report.skipped
        );
        Ok(report)
    }

    /// One remote attempt, bounded by the row timeout.
    async fn enrich_row<S: MeltingService>(
        &self,
        service: &mut S,
        sequence: &str,
    ) -> std::result::Result<ServiceResponse, RemoteError> {
        if sequence.is_empty() {
            return Err(RemoteError::MalformedResponse("row has no sequence".into()));
        }
        match tokio::time::timeout(self.row_timeout, service.compute(sequence)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(format!(
                "row exceeded {}s",
                self.row_timeout.as_secs_f64()
            ))),
        }
    }

    /// Keep the result text as `<name>_result.txt` when archiving is on.
    fn archive_response(&self, name: &str, response: &ServiceResponse) {
        if !self.save_raw_responses {
            return;
        }
        let path = self.artifact_dir.join(format!("{}_result.txt", name));
        if let Err(e) = std::fs::write(&path, &response.result_text) {
            warn!("Failed to archive response for {}: {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unatherm_core::Error;

    fn table(data: &str) -> Table {
        Table::from_reader(data.as_bytes(), b',', "test.csv").unwrap()
    }

    #[test]
    fn test_plan_names_rows() {
        let t = table("Entry ID,Sequence\nX1,AAAA\n,CCCC\n,GGGG\nX2,TTTT\n");
        let planned = plan(&t).unwrap();
        let names: Vec<&str> = planned.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["X1_A", "X1_B", "X1_C", "X2"]);
        assert_eq!(planned[2].effective_id.as_deref(), Some("X1"));
        assert_eq!(planned[2].ordinal, 2);
        assert_eq!(planned[3].group_size, 1);
    }

    #[test]
    fn test_plan_unidentified_rows() {
        let t = table("Entry ID,Sequence\n,AAAA\n,CCCC\nY1,GGGG\n");
        let planned = plan(&t).unwrap();
        let names: Vec<&str> = planned.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["row1_X", "row2_X", "Y1"]);
        assert_eq!(planned[0].effective_id, None);
        assert_eq!(planned[1].group_size, 0);
    }

    #[test]
    fn test_plan_rejects_oversized_group() {
        let mut data = String::from("Entry ID,Sequence\nBIG,ACGT\n");
        for _ in 0..26 {
            data.push_str(",ACGT\n");
        }
        let err = plan(&table(&data)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedInput(_)));
    }

    #[test]
    fn test_with_output_overrides_input() {
        let config = PipelineConfig {
            input: PathBuf::from("in.csv"),
            ..PipelineConfig::default()
        };
        let driver = BatchDriver::new(&config).with_output("out.csv");
        assert_eq!(driver.output(), Path::new("out.csv"));
    }
}
