//! Grouped-identifier normalization.
//!
//! Spreadsheet exports often write an identifier once and leave the cell
//! blank on the following rows that belong to it. Normalization forward-fills
//! the identifier and assigns each row its position within the group.

use std::collections::HashMap;

use serde::Serialize;

/// Per-row result of identifier normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedRow {
    /// Forward-filled identifier; `None` for rows before the first identifier.
    pub effective_id: Option<String>,
    /// Rows sharing `effective_id`; 0 when it is `None`.
    pub group_size: usize,
    /// Zero-based position within the group, in row order.
    pub ordinal: usize,
}

/// Blank cells and the literal `nan` written by dataframe exports carry no identifier.
pub fn is_blank_identifier(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "nan"
}

/// Normalize a column of raw identifiers, one entry per row.
pub fn normalize_identifiers<'a, I>(raw_identifiers: I) -> Vec<NormalizedRow>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut current: Option<String> = None;
    let mut effective: Vec<Option<String>> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for raw in raw_identifiers {
        if let Some(id) = raw.filter(|r| !is_blank_identifier(r)) {
            current = Some(id.trim().to_string());
        }
        if let Some(id) = &current {
            *counts.entry(id.clone()).or_insert(0) += 1;
        }
        effective.push(current.clone());
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut rows = Vec::with_capacity(effective.len());
    for id in &effective {
        let row = match id {
            Some(id) => {
                let next = seen.entry(id.as_str()).or_insert(0);
                let ordinal = *next;
                *next += 1;
                NormalizedRow {
                    effective_id: Some(id.clone()),
                    group_size: counts.get(id).copied().unwrap_or(0),
                    ordinal,
                }
            }
            None => NormalizedRow {
                effective_id: None,
                group_size: 0,
                ordinal: 0,
            },
        };
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(rows: &[NormalizedRow]) -> Vec<Option<&str>> {
        rows.iter().map(|r| r.effective_id.as_deref()).collect()
    }

    #[test]
    fn test_forward_fill() {
        let rows = normalize_identifiers([Some("X1"), Some(""), None, Some("X2")]);
        assert_eq!(ids(&rows), vec![Some("X1"), Some("X1"), Some("X1"), Some("X2")]);
        let ordinals: Vec<usize> = rows.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 0]);
        let sizes: Vec<usize> = rows.iter().map(|r| r.group_size).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_leading_blanks_are_unidentified() {
        let rows = normalize_identifiers([None, Some("  "), Some("nan"), Some("Y1")]);
        assert_eq!(ids(&rows), vec![None, None, None, Some("Y1")]);
        for row in &rows[..3] {
            assert_eq!(row.group_size, 0);
            assert_eq!(row.ordinal, 0);
        }
        assert_eq!(rows[3].group_size, 1);
    }

    #[test]
    fn test_identifier_is_trimmed() {
        let rows = normalize_identifiers([Some(" 1BNA "), None]);
        assert_eq!(ids(&rows), vec![Some("1BNA"), Some("1BNA")]);
    }

    #[test]
    fn test_repeated_identifier_keeps_counting() {
        // A non-contiguous repeat of an identifier shares its counter.
        let rows = normalize_identifiers([Some("A"), Some("B"), Some("A"), None]);
        let ordinals: Vec<usize> = rows.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![0, 0, 1, 2]);
        assert_eq!(rows[0].group_size, 3);
        assert_eq!(rows[1].group_size, 1);
    }

    #[test]
    fn test_ordinals_are_contiguous_per_group() {
        let input: Vec<Option<&str>> = vec![
            None, Some("G1"), None, None, Some("G2"), Some(""), Some("G3"), None, None, None,
            Some("G1"), None,
        ];
        let rows = normalize_identifiers(input);
        let mut by_id: HashMap<String, Vec<usize>> = HashMap::new();
        for row in &rows {
            if let Some(id) = &row.effective_id {
                by_id.entry(id.clone()).or_default().push(row.ordinal);
            }
        }
        for (id, ordinals) in by_id {
            let size = rows
                .iter()
                .find(|r| r.effective_id.as_deref() == Some(id.as_str()))
                .map(|r| r.group_size)
                .unwrap();
            assert_eq!(ordinals, (0..size).collect::<Vec<_>>(), "group {}", id);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_identifiers(std::iter::empty::<Option<&str>>()).is_empty());
    }
}
