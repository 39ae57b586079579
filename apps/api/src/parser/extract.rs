//! Field extractor: runs every pattern of every field over the normalized text,
//! turns each hit into a scored candidate and keeps the best one per field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::models::{ExtractionCandidate, Field, FieldResult};
use crate::parser::patterns::PatternTable;
use crate::parser::scoring::score;

pub const BASE_MATCH_QUALITY: f64 = 0.7;
/// Added when the matched text starts with one of the field's own labels.
pub const LABEL_BOOST: f64 = 0.2;
/// Quality of a job title recovered from the subject line instead of a pattern.
pub const FALLBACK_MATCH_QUALITY: f64 = 0.5;

static CLAUSE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;|:\n]|\s[-–—]\s").expect("valid clause separator regex"));

static TITLE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:engineer|developer|manager|analyst|designer)s?\b")
        .expect("valid title keyword regex")
});

static SUBJECT_LEAD_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:your\s+)?(?:application|applying|apply)\s+(?:for|to)\s+(?:the\s+)?(?:(?:position|role)\s+of\s+)?(?:an?\s+)?",
    )
    .expect("valid subject lead-in regex")
});

static SKILLS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bskills[ \t]*:[ \t]*([^:\n]+)").expect("valid skills regex")
});

static NEXT_STEPS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bnext[ \t]+steps?[ \t]*:[ \t]*([^:\n]+)").expect("valid next steps regex")
});

/// All candidates per field, in pattern order then text order.
pub fn extract(text: &str, table: &PatternTable) -> BTreeMap<Field, Vec<ExtractionCandidate>> {
    let mut candidates: BTreeMap<Field, Vec<ExtractionCandidate>> = BTreeMap::new();

    for field_patterns in table.fields() {
        let field = field_patterns.field;
        let entry = candidates.entry(field).or_default();

        for regex in &field_patterns.patterns {
            for caps in regex.captures_iter(text) {
                let Some(value) = caps.get(1).map(|m| m.as_str().trim()) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                entry.push(ExtractionCandidate {
                    field,
                    value: value.to_string(),
                    match_quality: match_quality(field, matched),
                });
            }
        }
    }

    candidates
}

fn match_quality(field: Field, matched: &str) -> f64 {
    let matched = matched.to_lowercase();
    let own_label = field
        .label_prefixes()
        .iter()
        .any(|&prefix| matched.starts_with(prefix));
    let boost = if own_label {
        LABEL_BOOST
    } else {
        0.0
    };
    (BASE_MATCH_QUALITY + boost).min(1.0)
}

/// Highest-confidence candidate. Ties keep the earlier candidate, so pattern
/// order decides between equally plausible values.
pub fn select_best(field: Field, candidates: &[ExtractionCandidate]) -> FieldResult {
    let mut best = FieldResult::missing(field);

    for candidate in candidates {
        let confidence = score(field, &candidate.value, candidate.match_quality);
        if confidence > best.confidence {
            best = FieldResult {
                field,
                value: Some(candidate.value.clone()),
                confidence,
            };
        }
    }

    best
}

/// Job title guessed from the subject line: the first clause naming a common
/// title keyword, cut after the last keyword, minus "application for" style lead-ins.
pub fn subject_title_fallback(subject: &str) -> Option<String> {
    CLAUSE_SEPARATOR.split(subject).find_map(|clause| {
        let keyword = TITLE_KEYWORD.find_iter(clause).last()?;
        let head = clause[..keyword.end()].trim();
        let title = SUBJECT_LEAD_IN.replace(head, "");
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    })
}

/// Resolves every field in the table, falling back to the subject line for
/// job titles no pattern found.
pub fn extract_fields(
    text: &str,
    table: &PatternTable,
    subject: Option<&str>,
) -> Vec<FieldResult> {
    let mut candidates = extract(text, table);

    Field::ALL
        .iter()
        .map(|&field| {
            let found = candidates.remove(&field).unwrap_or_default();
            let result = select_best(field, &found);

            if field == Field::JobTitle && result.value.is_none() {
                if let Some(title) = subject.and_then(subject_title_fallback) {
                    tracing::debug!(%title, "job title taken from subject line");
                    let fallback = ExtractionCandidate {
                        field,
                        value: title,
                        match_quality: FALLBACK_MATCH_QUALITY,
                    };
                    return select_best(field, std::slice::from_ref(&fallback));
                }
            }

            result
        })
        .collect()
}

pub fn extract_skills(text: &str) -> Vec<String> {
    SKILLS_LINE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn extract_next_steps(text: &str) -> Option<String> {
    NEXT_STEPS_LINE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
