//! Normalization applied before field comparison.
//!
//! Equivalent representations of the same value (phone numbers with
//! different spacing or prefix forms, addresses differing only in case or
//! whitespace, URLs with or without scheme) must not be reported as
//! discrepancies. Each function here is pure and deterministic.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a parenthesised trunk prefix as in `+49 (0)30 1234`.
static TRUNK_IN_PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*0\s*\)").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Reduce a phone number to an international digit string.
///
/// - `+49 30 1234` and `0049 30 1234` both become `49301234`.
/// - A single leading trunk `0` is replaced with `default_country_code`,
///   so `030 1234` becomes `49301234` when the default is `49`.
/// - Numbers without any prefix are kept as bare digits.
pub fn normalize_phone(raw: &str, default_country_code: &str) -> String {
    let without_trunk = TRUNK_IN_PARENS_RE.replace_all(raw.trim(), "");
    let digits: String = without_trunk
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if without_trunk.trim_start().starts_with('+') {
        digits
    } else if let Some(rest) = digits.strip_prefix("00") {
        rest.to_string()
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("{default_country_code}{rest}")
    } else {
        digits
    }
}

/// Case-fold and collapse runs of whitespace.
pub fn normalize_text(raw: &str) -> String {
    WHITESPACE_RE
        .replace_all(raw.trim(), " ")
        .to_lowercase()
}

/// Lowercase, strip scheme, leading `www.` and trailing slashes.
pub fn normalize_website(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www.trim_end_matches('/').to_string()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Split into lowercase alphanumeric words.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `text` contains `token` as a whole word (case-insensitive).
///
/// Multi-word tokens match when their words appear consecutively.
pub fn contains_token(text: &str, token: &str) -> bool {
    let words = tokenize(text);
    let needle = tokenize(token);
    if needle.is_empty() {
        return true;
    }
    words.windows(needle.len()).any(|w| w == needle.as_slice())
}
