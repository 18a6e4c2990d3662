//! CSV-backed sequence table with typed records and atomic rewrite.

use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};
use unatherm_core::record::{COL_ENTRY_ID, COL_SEQUENCE, THERMO_COLUMNS};
use unatherm_core::{Error, Record, Result, ThermoParams};

use crate::normalize::{is_blank_identifier, normalize_identifiers, NormalizedRow};

fn csv_error(e: csv::Error) -> Error {
    Error::Csv(e.to_string())
}

/// An in-memory table: the original header plus one typed record per row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    pub records: Vec<Record>,
    id_col: usize,
    seq_col: usize,
    thermo_cols: [usize; 4],
    delimiter: u8,
}

impl Table {
    /// Read a table from disk. Fails before any row is touched when a
    /// required column is missing.
    pub fn load(path: &Path, delimiter: u8) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, delimiter, &path.display().to_string())?;
        info!(
            "Loaded {} rows from {} ({} columns)",
            table.records.len(),
            path.display(),
            table.headers.len()
        );
        Ok(table)
    }

    /// Parse a table; `source` only labels errors.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, source: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let mut headers: Vec<String> = rdr
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let find = |headers: &[String], name: &str| headers.iter().position(|h| h == name);
        let missing = |column: &str| Error::MissingColumn {
            column: column.to_string(),
            path: source.to_string(),
        };
        let id_col = find(&headers, COL_ENTRY_ID).ok_or_else(|| missing(COL_ENTRY_ID))?;
        let seq_col = find(&headers, COL_SEQUENCE).ok_or_else(|| missing(COL_SEQUENCE))?;

        let source_width = headers.len();
        let mut thermo_cols = [0usize; 4];
        for (slot, name) in thermo_cols.iter_mut().zip(THERMO_COLUMNS) {
            *slot = match find(&headers, name) {
                Some(idx) => idx,
                None => {
                    debug!("Adding column '{}' to {}", name, source);
                    headers.push(name.to_string());
                    headers.len() - 1
                }
            };
        }

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row.map_err(csv_error)?;
            let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
            // Cells past the source header have no column to live in.
            if cells.iter().skip(source_width).any(|c| !c.trim().is_empty()) {
                let line = row.position().map_or(0, |p| p.line());
                return Err(Error::Csv(format!(
                    "{}: line {} has {} cells but the header has {}",
                    source,
                    line,
                    cells.len(),
                    source_width
                )));
            }
            cells.truncate(source_width);
            cells.resize(headers.len(), String::new());

            let raw_id = cells[id_col].trim();
            let thermo = ThermoParams::from_cells(thermo_cols.map(|c| cells[c].as_str()));
            records.push(Record {
                raw_identifier: (!is_blank_identifier(raw_id)).then(|| raw_id.to_string()),
                sequence: cells[seq_col].trim().to_string(),
                thermo,
                cells,
            });
        }

        Ok(Self {
            headers,
            records,
            id_col,
            seq_col,
            thermo_cols,
            delimiter,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Clear every row's result fields.
    pub fn reset_results(&mut self) {
        for record in &mut self.records {
            record.thermo = None;
        }
    }

    /// Forward-filled identifiers and group positions for every row.
    pub fn normalize(&self) -> Vec<NormalizedRow> {
        normalize_identifiers(self.records.iter().map(|r| r.raw_identifier.as_deref()))
    }

    /// Serialize the full table.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);
        wtr.write_record(&self.headers).map_err(csv_error)?;

        for record in &self.records {
            let mut cells = record.cells.clone();
            cells.resize(self.headers.len(), String::new());
            let values = record
                .thermo
                .as_ref()
                .map(|t| t.as_array().map(str::to_string))
                .unwrap_or_default();
            for (col, value) in self.thermo_cols.iter().zip(values) {
                cells[*col] = value;
            }
            wtr.write_record(&cells).map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Overwrite `path` with the full table via a temp file in the same
    /// directory, so a crash mid-write leaves the previous version intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| Error::Persistence(format!("temp file in {}: {}", dir.display(), e)))?;
        self.write_to(&mut tmp)?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::Persistence(format!("sync {}: {}", tmp.path().display(), e)))?;
        // Temp files are created owner-only; keep the table's existing mode.
        if let Ok(meta) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(meta.permissions()).map_err(|e| {
                Error::Persistence(format!("permissions on {}: {}", tmp.path().display(), e))
            })?;
        }
        tmp.persist(path)
            .map_err(|e| Error::Persistence(format!("replace {}: {}", path.display(), e.error)))?;
        Ok(())
    }
}
