//! Email field extraction: recovers applicant, job and company details from
//! application emails and scores how far each value can be trusted.
//!
//! Pipeline: normalize → extract candidates → score per field → aggregate.
//! `EmailParser` holds no mutable state, so one instance can be shared across
//! threads and emails parsed in any order.

pub mod aggregate;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod patterns;
pub mod scoring;

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

pub use models::{ExtractionCandidate, Field, FieldResult, ParseResult, RawEmail};
pub use patterns::{ParserError, PatternTable};

use crate::parser::aggregate::aggregate;
use crate::parser::extract::{extract_fields, extract_next_steps, extract_skills};
use crate::parser::normalize::normalize;

pub const DEFAULT_MAX_INPUT_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct EmailParser {
    table: PatternTable,
    max_input_bytes: usize,
}

impl EmailParser {
    /// Parser with the built-in pattern table.
    pub fn new() -> Result<Self, ParserError> {
        Ok(Self::with_table(PatternTable::default_table()?))
    }

    pub fn with_table(table: PatternTable) -> Self {
        Self {
            table,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }

    /// Bodies longer than `max_input_bytes` are cut before parsing.
    pub fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    /// Never fails: anything unexpected inside the pipeline is logged and
    /// reported as an empty, zero-confidence result.
    pub fn parse_email(&self, email: &RawEmail) -> ParseResult {
        match catch_unwind(AssertUnwindSafe(|| self.parse_unchecked(email))) {
            Ok(result) => result,
            Err(_) => {
                error!(
                    email_id = email.id.as_deref().unwrap_or("-"),
                    "email parsing panicked; returning empty result"
                );
                ParseResult::empty()
            }
        }
    }

    /// Results are returned in input order.
    pub fn parse_batch(&self, emails: &[RawEmail]) -> Vec<ParseResult> {
        emails.iter().map(|email| self.parse_email(email)).collect()
    }

    fn parse_unchecked(&self, email: &RawEmail) -> ParseResult {
        let body = truncate_at_char_boundary(&email.body, self.max_input_bytes);
        if body.len() < email.body.len() {
            warn!(
                email_id = email.id.as_deref().unwrap_or("-"),
                original_bytes = email.body.len(),
                kept_bytes = body.len(),
                "email body truncated before parsing"
            );
        }

        let subject = email.subject.as_deref();
        let text = normalize(subject, email.sender.as_deref(), body);

        let mut result = ParseResult::empty();
        for field_result in extract_fields(&text, &self.table, subject) {
            debug!(
                field = %field_result.field,
                value = field_result.value.as_deref().unwrap_or(""),
                confidence = field_result.confidence,
                "field extracted"
            );
            result.set_field(field_result);
        }
        result.skills = extract_skills(&text);
        result.next_steps = extract_next_steps(&text);
        result.confidence_score = aggregate(&result.field_scores);

        info!(
            email_id = email.id.as_deref().unwrap_or("-"),
            confidence = result.confidence_score,
            "email parsed"
        );

        result
    }
}

fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN_TEXT_EMAIL: &str = "Name: John Smith\nPosition: Senior Software Engineer\nCompany: Tech Corp\nSkills: Python, Java, AWS, REST APIs\nNext Steps: Technical interview scheduled for next week";

    const WRAPPED_HTML_EMAIL: &str = "<html><body>\
        <p>Name: John Smith</p>\
        <p>Position: Senior Software Engineer</p>\
        <p>Company: Tech Corp</p>\
        <p>Skills: Python, Java, AWS, REST APIs</p>\
        <p>Next Steps: Technical interview scheduled for next week</p>\
        </body></html>";

    const HTML_LETTER: &str = r#"
<html>
<body>
<p>Name: Mike Brown</p>
<p>Position: Full Stack Developer</p>
<p>Company: Tech Solutions Inc</p>
<p>Skills: Python, React, Node.js, MongoDB</p>
<p>Next Steps: Technical interview scheduled for next Tuesday</p>
<p>Dear Hiring Manager,</p>
<p>I am writing to express my interest in the Full Stack Developer position at Tech Solutions Inc.
I have extensive experience in full-stack development using Python, React, and Node.js.</p>
<p>Best regards,<br>Mike Brown</p>
</body>
</html>
"#;

    const FORWARDED_EMAIL: &str = r#"
From: Sarah Johnson <sarah.j@email.com>
To: hiring@techcompany.com
Subject: Application for Data Science Position

Name: Sarah Johnson
Position: Senior Data Scientist
Company: Data Analytics Corp
Skills: Python, R, Machine Learning, TensorFlow, SQL, Big Data
Next Steps: Team interview scheduled for Friday

Dear Hiring Team,

I am excited to apply for the Senior Data Scientist position at Data Analytics Corp.
With my background in machine learning and big data analytics, I believe I would be
a great addition to your team.

Technical Skills:
- Advanced Python and R programming
- Machine Learning frameworks (TensorFlow, PyTorch)

Best regards,
Sarah Johnson
"#;

    const TEAM_EMAIL: &str = r#"
Team Lead: David Wilson
Team Members: Sarah Chen, Michael Rodriguez
Position: Senior Backend Engineer
Company: Enterprise Solutions Inc.
Required Skills: Go, Microservices, Kafka

Project team composition for the new backend service.
"#;

    const UNLABELLED_EMAIL: &str = r#"
RE: Job Application - Development Role

To whom it may concern,

This is regarding the open position. I have attached my resume.

Thanks
"#;

    fn parser() -> EmailParser {
        EmailParser::new().unwrap()
    }

    #[test]
    fn test_plain_text_email() {
        let result = parser().parse_email(&RawEmail::from_body(PLAIN_TEXT_EMAIL));
        assert_eq!(result.applicant_name.as_deref(), Some("John Smith"));
        assert_eq!(result.job_title.as_deref(), Some("Senior Software Engineer"));
        assert_eq!(result.company_name.as_deref(), Some("Tech Corp"));
        assert_eq!(result.job_id, None);
        assert_eq!(result.skills, vec!["Python", "Java", "AWS", "REST APIs"]);
        assert_eq!(
            result.next_steps.as_deref(),
            Some("Technical interview scheduled for next week")
        );
        // name, title and company saturate at 1.0 through their own labels; job id missing
        assert_eq!(result.confidence_score, 0.9);
        assert_eq!(result.field_scores[&Field::JobTitle], 1.0);
        assert_eq!(result.field_scores[&Field::JobId], 0.0);
    }

    #[test]
    fn test_html_wrapping_does_not_change_values() {
        let plain = parser().parse_email(&RawEmail::from_body(PLAIN_TEXT_EMAIL));
        let html = parser().parse_email(&RawEmail::from_body(WRAPPED_HTML_EMAIL));
        assert_eq!(plain, html);
    }

    #[test]
    fn test_html_letter() {
        let result = parser().parse_email(&RawEmail::from_body(HTML_LETTER));
        assert_eq!(result.applicant_name.as_deref(), Some("Mike Brown"));
        assert_eq!(result.job_title.as_deref(), Some("Full Stack Developer"));
        assert_eq!(result.company_name.as_deref(), Some("Tech Solutions Inc"));
        assert_eq!(result.skills, vec!["Python", "React", "Node.js", "MongoDB"]);
    }

    #[test]
    fn test_forwarded_email_with_prose() {
        let result = parser().parse_email(&RawEmail::from_body(FORWARDED_EMAIL));
        assert_eq!(result.applicant_name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(result.job_title.as_deref(), Some("Senior Data Scientist"));
        assert_eq!(result.company_name.as_deref(), Some("Data Analytics Corp"));
        assert_eq!(
            result.skills,
            vec!["Python", "R", "Machine Learning", "TensorFlow", "SQL", "Big Data"]
        );
        assert_eq!(
            result.next_steps.as_deref(),
            Some("Team interview scheduled for Friday")
        );
    }

    #[test]
    fn test_missing_applicant_flags_review() {
        let result = parser().parse_email(&RawEmail::from_body(TEAM_EMAIL));
        assert_eq!(result.applicant_name, None);
        assert_eq!(result.job_title.as_deref(), Some("Senior Backend Engineer"));
        assert_eq!(result.company_name.as_deref(), Some("Enterprise Solutions Inc."));
        assert_eq!(result.skills, vec!["Go", "Microservices", "Kafka"]);
        // (0.3 * 1.0 + 0.3 * 1.0) * 0.7
        assert_eq!(result.confidence_score, 0.42);
        assert!(result.needs_review(0.5));
    }

    #[test]
    fn test_unlabelled_email_is_empty() {
        let result = parser().parse_email(&RawEmail::from_body(UNLABELLED_EMAIL));
        assert_eq!(result, ParseResult::empty());
    }

    #[test]
    fn test_labels_hidden_in_markup_are_ignored() {
        let body = r#"<html><body><img src="x.png" alt="Company: Initech LLC">
            <div title="Position: Chief Engineer"></div>
            <script>document.title = "Name: Jane Doe";</script></body></html>"#;
        let result = parser().parse_email(&RawEmail::from_body(body));
        assert_eq!(result, ParseResult::empty());
    }

    #[test]
    fn test_outlook_fragment_decodes_entities() {
        let body = "<o:p>Name: Jane Doe</o:p>\n<o:p>Company: Smith &amp; Sons</o:p>";
        let result = parser().parse_email(&RawEmail::from_body(body));
        assert_eq!(result.applicant_name.as_deref(), Some("Jane Doe"));
        assert_eq!(result.company_name.as_deref(), Some("Smith & Sons"));
    }

    #[test]
    fn test_empty_email_is_empty() {
        let result = parser().parse_email(&RawEmail::default());
        assert_eq!(result, ParseResult::empty());
        assert_eq!(result.confidence_score, 0.0);
    }

    #[test]
    fn test_subject_supplies_missing_title() {
        let email = RawEmail::from_body("Hi team,\nName: Priya Patel\nCompany: Initech LLC")
            .with_subject("Application for Senior Backend Engineer")
            .with_sender("Priya Patel <priya@example.com>");
        let result = parser().parse_email(&email);
        assert_eq!(result.job_title.as_deref(), Some("Senior Backend Engineer"));
        assert!((result.field_scores[&Field::JobTitle] - 0.66).abs() < 1e-9);
        assert_eq!(result.applicant_name.as_deref(), Some("Priya Patel"));
    }

    #[test]
    fn test_confidence_zero_iff_value_missing() {
        for body in [PLAIN_TEXT_EMAIL, TEAM_EMAIL, UNLABELLED_EMAIL, HTML_LETTER] {
            let result = parser().parse_email(&RawEmail::from_body(body));
            for field in Field::ALL {
                let missing = result.value(field).is_none();
                let zero = result.field_scores[&field] == 0.0;
                assert_eq!(missing, zero, "{field} in {body:?}");
                assert_ne!(result.value(field), Some(""));
            }
        }
    }

    #[test]
    fn test_oversize_body_is_truncated() {
        let body = format!("Name: Jane Doe\n{}\nCompany: Late Corp", "x".repeat(1000));
        let result = parser()
            .with_max_input_bytes(100)
            .parse_email(&RawEmail::from_body(body));
        assert_eq!(result.applicant_name.as_deref(), Some("Jane Doe"));
        assert_eq!(result.company_name, None);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_at_char_boundary(&text, 5), "éé");
        assert_eq!(truncate_at_char_boundary(&text, 100), text);
    }

    #[test]
    fn test_batch_keeps_input_order() {
        let emails = vec![
            RawEmail::from_body(UNLABELLED_EMAIL),
            RawEmail::from_body(PLAIN_TEXT_EMAIL),
        ];
        let results = parser().parse_batch(&emails);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].applicant_name, None);
        assert_eq!(results[1].applicant_name.as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_parser_is_shareable_across_threads() {
        let parser = std::sync::Arc::new(parser());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let parser = std::sync::Arc::clone(&parser);
                std::thread::spawn(move || parser.parse_email(&RawEmail::from_body(PLAIN_TEXT_EMAIL)))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().confidence_score, 0.9);
        }
    }
}
