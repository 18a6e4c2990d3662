//! Artifact names derived from a row's group membership.

use unatherm_core::{Error, Result};

use crate::normalize::NormalizedRow;

/// Groups are labelled `A`..`Z`; larger groups are rejected.
pub const MAX_GROUP_MEMBERS: usize = 26;

/// Name for one row.
///
/// * unidentified rows: `row{n}_X` with 1-based `n`
/// * single-member groups: the identifier itself
/// * larger groups: `{id}_{letter}`, `A` for ordinal 0
pub fn generate_name(
    effective_id: Option<&str>,
    group_size: usize,
    ordinal: usize,
    row_position: usize,
) -> Result<String> {
    let id = match effective_id {
        None => return Ok(format!("row{}_X", row_position + 1)),
        Some(id) => id,
    };
    if group_size <= 1 {
        return Ok(id.to_string());
    }
    if group_size > MAX_GROUP_MEMBERS || ordinal >= MAX_GROUP_MEMBERS {
        return Err(Error::UnsupportedInput(format!(
            "identifier '{}' has {} rows; at most {} can be labelled A-Z",
            id, group_size, MAX_GROUP_MEMBERS
        )));
    }
    let letter = char::from(b'A' + ordinal as u8);
    Ok(format!("{}_{}", id, letter))
}

/// Names for a whole normalized table, failing on the first unsupported group.
pub fn generate_names(rows: &[NormalizedRow]) -> Result<Vec<String>> {
    rows.iter()
        .enumerate()
        .map(|(position, row)| {
            generate_name(row.effective_id.as_deref(), row.group_size, row.ordinal, position)
        })
        .collect()
}
