//! Command implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use unatherm_core::{Error, PipelineConfig};
use unatherm_pipeline::{plan, BatchDriver, BatchReport, PlannedRow};
use unatherm_remote::{StructureClient, UnafoldSession};
use unatherm_table::{lookup, LookupSummary, Table};

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "unatherm.json";

fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {:?} is not ASCII", delimiter))
}

/// Resolve the run configuration: file, then env, then command-line flags.
pub fn resolve_config(
    input: &Path,
    config_path: Option<&Path>,
    resume: bool,
    save_raw: bool,
    delimiter: Option<char>,
) -> anyhow::Result<PipelineConfig> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = PipelineConfig::load(&path)?;
    config.apply_env()?;
    config.input = input.to_path_buf();
    config.resume |= resume;
    config.save_raw_responses |= save_raw;
    if let Some(d) = delimiter {
        config.delimiter = d;
    }
    config.validate()?;
    Ok(config)
}

/// `enrich`: open the session, run the batch, always release the session.
pub async fn enrich(config: PipelineConfig) -> anyhow::Result<BatchReport> {
    let delimiter = delimiter_byte(config.delimiter)?;
    let mut table = Table::load(&config.input, delimiter)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    // Name every row before the session is opened so bad input fails fast.
    plan(&table)?;

    let mut session = UnafoldSession::open(config.remote.clone())
        .await
        .map_err(Error::from)
        .context("failed to open melting session")?;

    let driver = BatchDriver::new(&config);
    let result = driver.run(&mut table, &mut session).await;
    session.close().await;
    Ok(result?)
}

/// `names`: the normalized naming plan for a table.
pub fn names(input: &Path, delimiter: char) -> anyhow::Result<Vec<PlannedRow>> {
    let table = Table::load(input, delimiter_byte(delimiter)?)
        .with_context(|| format!("failed to read {}", input.display()))?;
    Ok(plan(&table)?)
}

pub fn print_plan(rows: &[PlannedRow]) {
    println!("{:>5}  {:<16} {:>5} {:>7}  {}", "row", "effective id", "size", "ordinal", "name");
    for row in rows {
        println!(
            "{:>5}  {:<16} {:>5} {:>7}  {}",
            row.row + 1,
            row.effective_id.as_deref().unwrap_or("-"),
            row.group_size,
            row.ordinal,
            row.name
        );
    }
}

/// `lookup`: search the given tables in order; tables are concatenated.
pub fn lookup_tables(
    inputs: &[PathBuf],
    query: &str,
    delimiter: char,
) -> anyhow::Result<Option<LookupSummary>> {
    let delimiter = delimiter_byte(delimiter)?;
    let mut records = Vec::new();
    for input in inputs {
        let table = Table::load(input, delimiter)
            .with_context(|| format!("failed to read {}", input.display()))?;
        records.extend(table.into_records());
    }
    Ok(lookup(&records, query).map(|hit| hit.summary()))
}

pub fn print_summary(summary: &LookupSummary) {
    println!("ID: {}", summary.id.as_deref().unwrap_or("-"));
    println!("Sequence: {}", summary.sequence);
    println!(
        "ΔG: {}, ΔH: {}, ΔS: {}, Tm (°C): {}",
        summary.delta_g, summary.delta_h, summary.delta_s, summary.melting_temp
    );
}

/// Hand a matched identifier to structure retrieval.
pub async fn fetch_structure(id: &str, dir: &Path) -> anyhow::Result<PathBuf> {
    let client = StructureClient::new(Duration::from_secs(60))?;
    let path = client
        .download_to(id, dir)
        .await
        .with_context(|| format!("failed to fetch structure for {}", id))?;
    Ok(path)
}

pub fn print_report(report: &BatchReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!("Failed to serialize run report: {}", e),
    }
    if report.processed() < report.total_rows {
        warn!(
            "Only {} of {} rows were visited",
            report.processed(),
            report.total_rows
        );
    }
    if report.failed > 0 {
        info!(
            "{} of {} rows recorded as ERROR",
            report.failed, report.total_rows
        );
    }
}
