//! Confidence scorer. A field's confidence starts from the match quality of the
//! regex hit and is pushed up or down by independent multiplicative adjustments
//! that look at the shape of the extracted value.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::models::Field;

/// Returns the factor to multiply the running score by; 1.0 leaves it unchanged.
pub type Adjustment = fn(&str) -> f64;

static TITLE_CASE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+$").expect("valid name regex"));

const TITLE_TERMS: &[&str] = &["developer", "engineer", "manager", "analyst", "designer"];

const LEGAL_SUFFIXES: &[&str] = &["Inc", "LLC", "Ltd", "Corp", "Limited"];

const NAME_ADJUSTMENTS: &[Adjustment] = &[name_length_band, name_title_case, name_contains_digit];
const TITLE_ADJUSTMENTS: &[Adjustment] = &[title_length_band, title_vocabulary];
const COMPANY_ADJUSTMENTS: &[Adjustment] = &[company_length_band, company_legal_suffix];
const JOB_ID_ADJUSTMENTS: &[Adjustment] = &[job_id_length_and_shape];

/// Adjustments per field, applied in order.
pub fn adjustments(field: Field) -> &'static [Adjustment] {
    match field {
        Field::ApplicantName => NAME_ADJUSTMENTS,
        Field::JobTitle => TITLE_ADJUSTMENTS,
        Field::CompanyName => COMPANY_ADJUSTMENTS,
        Field::JobId => JOB_ID_ADJUSTMENTS,
    }
}

/// Confidence in `[0, 1]` for `value` extracted as `field` with the given match quality.
pub fn score(field: Field, value: &str, match_quality: f64) -> f64 {
    let value = value.trim();
    if value.is_empty() || !match_quality.is_finite() {
        return 0.0;
    }

    adjustments(field)
        .iter()
        .fold(match_quality, |acc, adjust| acc * adjust(value))
        .clamp(0.0, 1.0)
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn has_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

pub fn name_length_band(value: &str) -> f64 {
    let len = char_len(value);
    if (4..=50).contains(&len) && value.contains(' ') {
        1.2
    } else if !(4..=50).contains(&len) {
        0.5
    } else {
        1.0
    }
}

pub fn name_title_case(value: &str) -> f64 {
    if TITLE_CASE_NAME.is_match(value) {
        1.3
    } else {
        1.0
    }
}

pub fn name_contains_digit(value: &str) -> f64 {
    if has_digit(value) {
        0.4
    } else {
        1.0
    }
}

pub fn title_length_band(value: &str) -> f64 {
    if (5..=100).contains(&char_len(value)) {
        1.1
    } else {
        0.6
    }
}

pub fn title_vocabulary(value: &str) -> f64 {
    let lower = value.to_lowercase();
    if TITLE_TERMS.iter().any(|term| lower.contains(term)) {
        1.2
    } else {
        1.0
    }
}

pub fn company_length_band(value: &str) -> f64 {
    let len = char_len(value);
    if (2..=50).contains(&len) {
        1.1
    } else if len > 50 {
        0.7
    } else {
        1.0
    }
}

pub fn company_legal_suffix(value: &str) -> f64 {
    if LEGAL_SUFFIXES.iter().any(|suffix| value.contains(suffix)) {
        1.1
    } else {
        1.0
    }
}

pub fn job_id_length_and_shape(value: &str) -> f64 {
    let len = char_len(value);
    if (4..=20).contains(&len) && has_digit(value) {
        1.2
    } else if !(4..=20).contains(&len) {
        0.6
    } else {
        1.0
    }
}
