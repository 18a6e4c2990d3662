//! Lookup facade: find an enriched row by identifier or sequence.

use serde::Serialize;
use unatherm_core::Record;

/// Which column produced the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedBy {
    Identifier,
    Sequence,
}

/// A matched row.
#[derive(Debug, Clone, Copy)]
pub struct LookupHit<'a> {
    pub record: &'a Record,
    /// Zero-based row index in the searched slice.
    pub row: usize,
    pub matched_by: MatchedBy,
}

/// Display form of a hit, with `N/A` for unset fields.
#[derive(Debug, Clone, Serialize)]
pub struct LookupSummary {
    pub id: Option<String>,
    pub sequence: String,
    #[serde(rename = "matchedBy")]
    pub matched_by: MatchedBy,
    #[serde(rename = "ΔG")]
    pub delta_g: String,
    #[serde(rename = "ΔH")]
    pub delta_h: String,
    #[serde(rename = "ΔS")]
    pub delta_s: String,
    #[serde(rename = "Tm (°C)")]
    pub melting_temp: String,
}

impl LookupHit<'_> {
    /// Identifier to hand to structure retrieval, if the row has one.
    pub fn structure_id(&self) -> Option<&str> {
        self.record.raw_identifier.as_deref()
    }

    pub fn summary(&self) -> LookupSummary {
        let r = self.record;
        LookupSummary {
            id: r.raw_identifier.clone(),
            sequence: r.sequence.clone(),
            matched_by: self.matched_by,
            delta_g: r.field_or_missing(0).to_string(),
            delta_h: r.field_or_missing(1).to_string(),
            delta_s: r.field_or_missing(2).to_string(),
            melting_temp: r.field_or_missing(3).to_string(),
        }
    }
}

/// Trim and lowercase, applied to both the query and stored values.
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// First row whose identifier matches, else first row whose sequence
/// matches. Exact match after normalization; an empty query matches nothing.
pub fn lookup<'a>(records: &'a [Record], query: &str) -> Option<LookupHit<'a>> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return None;
    }

    let by_id = records.iter().position(|r| {
        r.raw_identifier
            .as_deref()
            .is_some_and(|id| normalize_query(id) == needle)
    });
    if let Some(row) = by_id {
        return Some(LookupHit {
            record: &records[row],
            row,
            matched_by: MatchedBy::Identifier,
        });
    }

    records
        .iter()
        .position(|r| normalize_query(&r.sequence) == needle)
        .map(|row| LookupHit {
            record: &records[row],
            row,
            matched_by: MatchedBy::Sequence,
        })
}
