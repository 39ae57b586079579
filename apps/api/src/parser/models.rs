use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A scored attribute the parser tries to recover from an application email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ApplicantName,
    JobTitle,
    CompanyName,
    JobId,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::ApplicantName,
        Field::JobTitle,
        Field::CompanyName,
        Field::JobId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ApplicantName => "applicant_name",
            Field::JobTitle => "job_title",
            Field::CompanyName => "company_name",
            Field::JobId => "job_id",
        }
    }

    /// Labels that name the field itself. A match whose text starts with one
    /// of them was found through the field's own label.
    pub fn label_prefixes(&self) -> &'static [&'static str] {
        match self {
            Field::ApplicantName => &["applicant"],
            Field::JobTitle => &["job", "position"],
            Field::CompanyName => &["company"],
            Field::JobId => &["job"],
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Field::ApplicantName | Field::JobTitle | Field::CompanyName => 0.3,
            Field::JobId => 0.1,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        match self {
            Field::ApplicantName => 0.6,
            Field::JobTitle | Field::CompanyName => 0.5,
            Field::JobId => 0.7,
        }
    }

    /// Required fields carry an extra overall penalty when weak.
    pub fn is_required(&self) -> bool {
        !matches!(self, Field::JobId)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An email as handed over by the upstream mail source, already decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEmail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl RawEmail {
    pub fn from_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// One regex match examined for a field, before field-specific scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionCandidate {
    pub field: Field,
    pub value: String,
    /// 0.0 – 1.0
    pub match_quality: f64,
}

/// Winning value for a field. `confidence == 0.0` exactly when `value` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldResult {
    pub field: Field,
    pub value: Option<String>,
    pub confidence: f64,
}

impl FieldResult {
    pub fn missing(field: Field) -> Self {
        Self {
            field,
            value: None,
            confidence: 0.0,
        }
    }
}

/// Structured output of a single `parse_email` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub applicant_name: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub job_id: Option<String>,
    pub skills: Vec<String>,
    pub next_steps: Option<String>,
    pub confidence_score: f64,
    pub field_scores: BTreeMap<Field, f64>,
}

impl ParseResult {
    /// All fields absent, every score zero.
    pub fn empty() -> Self {
        Self {
            applicant_name: None,
            job_title: None,
            company_name: None,
            job_id: None,
            skills: Vec::new(),
            next_steps: None,
            confidence_score: 0.0,
            field_scores: Field::ALL.iter().map(|f| (*f, 0.0)).collect(),
        }
    }

    pub fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::ApplicantName => self.applicant_name.as_deref(),
            Field::JobTitle => self.job_title.as_deref(),
            Field::CompanyName => self.company_name.as_deref(),
            Field::JobId => self.job_id.as_deref(),
        }
    }

    pub(crate) fn set_field(&mut self, result: FieldResult) {
        self.field_scores.insert(result.field, result.confidence);
        let slot = match result.field {
            Field::ApplicantName => &mut self.applicant_name,
            Field::JobTitle => &mut self.job_title,
            Field::CompanyName => &mut self.company_name,
            Field::JobId => &mut self.job_id,
        };
        *slot = result.value;
    }

    pub fn needs_review(&self, threshold: f64) -> bool {
        self.confidence_score < threshold
    }
}
