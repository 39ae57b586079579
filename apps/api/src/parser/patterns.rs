//! Field pattern table. Patterns are tried in declared order; earlier patterns win
//! confidence ties. Every pattern captures its value in group 1 and none of them
//! can match across a line break.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::parser::models::Field;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid pattern for {field}: {pattern}: {source}")]
    InvalidPattern {
        field: Field,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern for {field} has no capture group: {pattern}")]
    MissingCaptureGroup { field: Field, pattern: String },
}

const TITLE_CHARS: &str = r"[a-z0-9][a-z0-9 &/+.#()'-]*";
const NAME_CHARS: &str = r"[a-z][a-z .'-]*";
const COMPANY_CHARS: &str = r"[a-z0-9][a-z0-9 &.'-]*";
const ID_CHARS: &str = r"[a-z0-9][a-z0-9_-]*";

/// Built-in table, most specific patterns first.
pub fn default_pattern_specs() -> Vec<(Field, Vec<String>)> {
    vec![
        (
            Field::ApplicantName,
            vec![
                // Anchored so "Company Name:" and similar labels don't count.
                format!(
                    r"(?m)^(?:candidate(?:[ \t]+name)?|applicant(?:[ \t]+name)?|full[ \t]+name|name)[ \t]*:[ \t]*({NAME_CHARS})"
                ),
                format!(r"\bapplication[ \t]+(?:from|by)[ \t]*:[ \t]*({NAME_CHARS})"),
                format!(r"\bsubmitted[ \t]+by[ \t]*:[ \t]*({NAME_CHARS})"),
            ],
        ),
        (
            Field::JobTitle,
            vec![
                format!(
                    r"\b(?:position|job[ \t]+title|job|role|title)[ \t]*:[ \t]*({TITLE_CHARS})"
                ),
                format!(r"\bapplying[ \t]+for[ \t]*:[ \t]*({TITLE_CHARS})"),
                r"\bapplying[ \t]+for[ \t]+(?:the[ \t]+)?(?:position|role)[ \t]+of[ \t]+([^:\n,.]+)"
                    .to_string(),
                r"\bappl(?:y|ying)[ \t]+for[ \t]+the[ \t]+([^:\n,.]+?)[ \t]+(?:position|role)\b"
                    .to_string(),
            ],
        ),
        (
            Field::CompanyName,
            vec![
                format!(
                    r"\b(?:company|organi[sz]ation|employer)[ \t]*:[ \t]*({COMPANY_CHARS})"
                ),
                r"\b(?:position|role|job)[ \t]+at[ \t]+([a-z0-9][a-z0-9 &'-]*)".to_string(),
                r"\b(?:at|with)[ \t]+([a-z0-9][a-z0-9 &]*?[ \t]+(?:corp|inc|ltd|llc|limited|company))\b"
                    .to_string(),
            ],
        ),
        (
            Field::JobId,
            vec![
                format!(r"\bjob[ \t]*(?:reference|ref|id|number|#)[ \t]*:[ \t]*({ID_CHARS})"),
                format!(r"\bposition[ \t]*(?:reference|ref|id|#)[ \t]*:[ \t]*({ID_CHARS})"),
                format!(r"\breq(?:uisition)?[ \t]*(?:id|#|number)[ \t]*:[ \t]*({ID_CHARS})"),
            ],
        ),
    ]
}

/// Compiled patterns for one field, in priority order.
#[derive(Debug, Clone)]
pub struct FieldPatterns {
    pub field: Field,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct PatternTable {
    fields: Vec<FieldPatterns>,
}

impl PatternTable {
    /// Compiles a table. Patterns are case-insensitive and must capture the value
    /// in their first group.
    pub fn new<S: AsRef<str>>(specs: &[(Field, Vec<S>)]) -> Result<Self, ParserError> {
        let mut fields = Vec::with_capacity(specs.len());

        for (field, sources) in specs {
            let mut patterns = Vec::with_capacity(sources.len());
            for source in sources {
                let source = source.as_ref();
                let regex = RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ParserError::InvalidPattern {
                        field: *field,
                        pattern: source.to_string(),
                        source: e,
                    })?;

                if regex.captures_len() < 2 {
                    return Err(ParserError::MissingCaptureGroup {
                        field: *field,
                        pattern: source.to_string(),
                    });
                }
                patterns.push(regex);
            }
            fields.push(FieldPatterns {
                field: *field,
                patterns,
            });
        }

        Ok(Self { fields })
    }

    pub fn default_table() -> Result<Self, ParserError> {
        Self::new(&default_pattern_specs())
    }

    pub fn fields(&self) -> &[FieldPatterns] {
        &self.fields
    }

    pub fn patterns_for(&self, field: Field) -> &[Regex] {
        self.fields
            .iter()
            .find(|fp| fp.field == field)
            .map(|fp| fp.patterns.as_slice())
            .unwrap_or(&[])
    }
}
