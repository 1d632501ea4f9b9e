//! Value-level normalisers for identifiers, free text and numbers.
//!
//! Every function is total: malformed input yields `None` rather than an error,
//! so callers can treat "invalid" and "absent" the same way.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid regex"));
static CHEMBL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^CHEMBL\d+$").expect("valid regex"));
static UNIPROT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2})$")
        .expect("valid regex")
});
static INCHIKEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{14}-[A-Z]{10}-[A-Z]$").expect("valid regex"));

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi.org/",
    "doi:",
];

const PMID_PREFIXES: &[&str] = &[
    "https://pubmed.ncbi.nlm.nih.gov/",
    "http://pubmed.ncbi.nlm.nih.gov/",
    "https://www.ncbi.nlm.nih.gov/pubmed/",
    "pmid:",
];

/// Canonical DOI: lowercase, resolver prefixes removed.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let mut value = raw.trim().to_lowercase();
    for prefix in DOI_PREFIXES {
        if let Some(rest) = value.strip_prefix(prefix) {
            value = rest.trim().to_string();
            break;
        }
    }
    let value = value.trim_end_matches(['.', ',', ';']).to_string();
    if value.starts_with("10.") && value.contains('/') && !value.contains(char::is_whitespace) {
        Some(value)
    } else {
        None
    }
}

/// Canonical PubMed id: digits only, no leading zeros, non-zero.
pub fn normalize_pmid(raw: &str) -> Option<String> {
    let mut value = raw.trim().to_lowercase();
    for prefix in PMID_PREFIXES {
        if let Some(rest) = value.strip_prefix(prefix) {
            value = rest.to_string();
            break;
        }
    }
    let value = value.trim_end_matches('/');
    // ChEMBL serialises some ids as floats ("12345.0").
    let value = value.strip_suffix(".0").unwrap_or(value);
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let trimmed = value.trim_start_matches('0');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Comparison key for titles. Not meant for display.
pub fn normalize_title(raw: &str) -> Option<String> {
    let stripped = TAG.replace_all(raw, " ");
    let lowered = stripped.to_lowercase();
    let spaced = NON_ALNUM.replace_all(&lowered, " ");
    let key = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Trim and collapse internal whitespace, including line breaks.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Strip JATS/HTML markup and clean the remaining text.
pub fn strip_markup(raw: &str) -> Option<String> {
    clean_text(&TAG.replace_all(raw, " "))
}

/// Leading four-digit year within 1800..=2100. The year must end the value
/// or be followed by a separator (`2019-05-01`, `1999/12`, `2020 Jan`).
pub fn normalize_year(raw: &str) -> Option<String> {
    let value = raw.trim();
    let digits = value.get(..4)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if value[4..].starts_with(char::is_alphanumeric) {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    (1800..=2100).contains(&year).then(|| year.to_string())
}

/// Deterministic float rendering: at most six decimals, no trailing zeros.
pub fn format_float(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let rendered = format!("{value:.6}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    if rendered == "-0" {
        Some("0".to_string())
    } else {
        Some(rendered.to_string())
    }
}

/// Parse then re-render a numeric string with [`format_float`].
pub fn normalize_number(raw: &str) -> Option<String> {
    raw.trim().parse::<f64>().ok().and_then(format_float)
}

pub fn normalize_chembl_id(raw: &str) -> Option<String> {
    let value = raw.trim().to_ascii_uppercase();
    CHEMBL_ID.is_match(&value).then_some(value)
}

pub fn normalize_uniprot(raw: &str) -> Option<String> {
    let value = raw.trim().to_ascii_uppercase();
    UNIPROT.is_match(&value).then_some(value)
}

pub fn normalize_inchikey(raw: &str) -> Option<String> {
    let value = raw.trim().to_ascii_uppercase();
    INCHIKEY.is_match(&value).then_some(value)
}
