//! Results-page scraping and positional field extraction.
//!
//! The service renders a single results row such as
//! `1 ΔG = -1.72 ΔH = -62.4 ΔS = -195.7 Tm = 45.2 °C`. After removing `=`
//! and the `°C` unit the row splits into tokens whose values sit at
//! offsets 2, 4, 6 and 8. This is positional and breaks if the page layout
//! changes.

use once_cell::sync::Lazy;
use regex::Regex;
use unatherm_core::record::SENTINEL_MISSING;
use unatherm_core::ThermoParams;

use crate::error::RemoteError;

/// Token offsets of ΔG, ΔH, ΔS and Tm.
pub const FIELD_OFFSETS: [usize; 4] = [2, 4, 6, 8];

static TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table>").unwrap());
static TBODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tbody\b[^>]*>(.*?)</tbody>").unwrap());
static ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").unwrap());
static BLOCK_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)</?(?:td|th|tr|br|p|div|li|table|thead|tbody)\b[^>]*>").unwrap()
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static FORM_ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<form\b[^>]*\baction\s*=\s*["']([^"']*)["']"#).unwrap()
});

/// Strip `=` and the `°C` suffix before tokenizing.
pub fn clean_result_text(raw: &str) -> String {
    raw.replace('=', "").replace("°C", "")
}

/// Read the four fields from a results row by token position.
///
/// Offsets past the end of the row yield `N/A`; a row with no text at all
/// is a malformed response.
pub fn parse_thermo_text(text: &str) -> Result<ThermoParams, RemoteError> {
    if text.trim().is_empty() {
        return Err(RemoteError::MalformedResponse("results row is empty".into()));
    }
    let cleaned = clean_result_text(text);
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let [g, h, s, tm] = FIELD_OFFSETS.map(|i| {
        tokens
            .get(i)
            .map(|t| t.to_string())
            .unwrap_or_else(|| SENTINEL_MISSING.to_string())
    });
    Ok(ThermoParams {
        delta_g: g,
        delta_h: h,
        delta_s: s,
        melting_temp: tm,
    })
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&deg;", "°")
        .replace("&#176;", "°")
        .replace("&Delta;", "Δ")
        .replace("&#916;", "Δ")
        .replace("&#8710;", "Δ")
        .replace("&middot;", "·")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Visible text of an HTML fragment, whitespace collapsed. Cell and
/// block boundaries become spaces; inline markup such as `T<sub>m</sub>`
/// joins up.
fn inner_text(fragment: &str) -> String {
    let spaced = BLOCK_TAG_RE.replace_all(fragment, " ");
    let stripped = TAG_RE.replace_all(&spaced, "");
    decode_entities(&stripped)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first data row of the first results table, if the page
/// has rendered one.
pub fn extract_results_row(html: &str) -> Option<String> {
    TABLE_RE
        .captures_iter(html)
        .filter_map(|table| {
            let body = table.get(1)?.as_str();
            let rows = TBODY_RE
                .captures(body)
                .and_then(|b| b.get(1))
                .map_or(body, |b| b.as_str());
            ROW_RE
                .captures_iter(rows)
                .filter_map(|row| row.get(1).map(|m| m.as_str()))
                .find(|cells| cells.to_ascii_lowercase().contains("<td"))
                .map(inner_text)
        })
        .find(|text| !text.is_empty())
}

/// Whether the page carries an input control named or id'd `field`.
pub fn has_input_field(html: &str, field: &str) -> bool {
    let pattern = format!(
        r#"(?is)<(?:input|textarea|select)\b[^>]*\b(?:id|name)\s*=\s*["']{}["']"#,
        regex::escape(field)
    );
    Regex::new(&pattern).map_or(false, |re| re.is_match(html))
}

/// The first form's `action` attribute, when present and non-empty.
pub fn form_action(html: &str) -> Option<String> {
    FORM_ACTION_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|a| !a.is_empty())
}
