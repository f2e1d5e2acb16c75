use std::collections::BTreeMap;

use crate::careers::questions::MIN_QUESTIONS_TO_PUBLISH;
use crate::models::career::{CareerInput, QuestionSet};

/// Field name → user-facing message.
pub type FieldErrors = BTreeMap<&'static str, String>;

pub const QUESTIONS_FIELD: &str = "questions";

pub const SALARY_RANGE_MESSAGE: &str = "Minimum salary cannot be greater than maximum salary.";
pub const REQUIRED_FIELDS_MESSAGE: &str =
    "Job title, description, questions, location and work setup are required";
pub const QUESTION_COUNT_MESSAGE: &str = "At least 5 questions are required in total.";

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: bool,
    pub message: &'static str,
}

const fn required(field: &'static str, message: &'static str) -> FieldRule {
    FieldRule {
        field,
        required: true,
        message,
    }
}

/// Rules for the "Career Details" step.
pub const CAREER_DETAILS_RULES: &[FieldRule] = &[
    required("jobTitle", "Job title is required"),
    required("employmentType", "Employment type is required"),
    required("workSetup", "Work arrangement is required"),
    required("country", "Country is required"),
    required("province", "Province is required"),
    required("city", "City is required"),
    FieldRule {
        field: "salaryNegotiable",
        required: false,
        message: "",
    },
    required("minimumSalary", "Minimum salary is required"),
    required("maximumSalary", "Maximum salary is required"),
    required("description", "Description is required"),
];

/// Applies `rules` to the values returned by `value_of`. Blank values count as missing.
pub fn validate_fields<'a, F>(rules: &[FieldRule], value_of: F) -> FieldErrors
where
    F: Fn(&str) -> Option<&'a str>,
{
    rules
        .iter()
        .filter(|rule| rule.required)
        .filter(|rule| value_of(rule.field).map_or(true, |v| v.trim().is_empty()))
        .map(|rule| (rule.field, rule.message.to_string()))
        .collect()
}

/// Returns the message to show when the question set is too small to publish.
pub fn question_count_error(questions: &QuestionSet) -> Option<&'static str> {
    (questions.total_questions() < MIN_QUESTIONS_TO_PUBLISH).then_some(QUESTION_COUNT_MESSAGE)
}

/// Minimum must not exceed maximum. Zero or missing amounts are not compared.
pub fn salary_range_error(minimum: Option<f64>, maximum: Option<f64>) -> Option<&'static str> {
    match (minimum, maximum) {
        (Some(min), Some(max)) if min != 0.0 && max != 0.0 && min > max => {
            Some(SALARY_RANGE_MESSAGE)
        }
        _ => None,
    }
}

/// Server-side requiredness for a new posting.
pub fn has_required_fields(input: &CareerInput) -> bool {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    present(&input.job_title)
        && present(&input.description)
        && input.questions.as_ref().is_some_and(|q| !q.is_null())
        && present(&input.location)
        && present(&input.work_setup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_fields_reports_blank_and_missing() {
        let errors = validate_fields(CAREER_DETAILS_RULES, |field| match field {
            "jobTitle" => Some("   "),
            "employmentType" => Some("Full-Time"),
            "workSetup" => Some("Hybrid"),
            "country" => Some("Philippines"),
            "province" => Some("Cebu"),
            "city" => Some("Cebu City"),
            "minimumSalary" => Some("30000"),
            "description" => Some("<p>Role</p>"),
            _ => None,
        });

        assert_eq!(errors.len(), 2);
        assert_eq!(errors["jobTitle"], "Job title is required");
        assert_eq!(errors["maximumSalary"], "Maximum salary is required");
        assert!(!errors.contains_key("salaryNegotiable"));
    }

    #[test]
    fn test_salary_range() {
        assert_eq!(
            salary_range_error(Some(50000.0), Some(40000.0)),
            Some(SALARY_RANGE_MESSAGE)
        );
        assert_eq!(salary_range_error(Some(40000.0), Some(50000.0)), None);
        assert_eq!(salary_range_error(Some(40000.0), Some(40000.0)), None);
        assert_eq!(salary_range_error(Some(50000.0), None), None);
        assert_eq!(salary_range_error(Some(50000.0), Some(0.0)), None);
    }

    #[test]
    fn test_question_count() {
        let mut set = QuestionSet::with_default_categories();
        for i in 0..4 {
            set.add_question(1 + (i % 2), &format!("Q{i}"));
        }
        assert_eq!(question_count_error(&set), Some(QUESTION_COUNT_MESSAGE));
        set.add_question(5, "Q5");
        assert_eq!(question_count_error(&set), None);
    }

    #[test]
    fn test_required_fields() {
        let mut input: CareerInput = serde_json::from_value(json!({
            "jobTitle": "Engineer",
            "description": "<p>Build</p>",
            "questions": [],
            "location": "Makati",
            "workSetup": "Onsite"
        }))
        .unwrap();
        assert!(has_required_fields(&input));

        input.questions = None;
        assert!(!has_required_fields(&input));

        input.questions = Some(json!([]));
        input.work_setup = Some("  ".to_string());
        assert!(!has_required_fields(&input));
    }
}
