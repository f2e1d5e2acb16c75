use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Publication state of a posting. `Inactive` doubles as "draft / unpublished".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareerStatus {
    #[default]
    Active,
    Inactive,
}

impl CareerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareerStatus::Active => "active",
            CareerStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(CareerStatus::Active),
            "inactive" => Some(CareerStatus::Inactive),
            _ => None,
        }
    }
}

/// Threshold controlling automatic endorsement of screened candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningSetting {
    #[default]
    #[serde(rename = "Good Fit and above")]
    GoodFitAndAbove,
    #[serde(rename = "Only Strong Fit")]
    OnlyStrongFit,
    #[serde(rename = "No Automatic Promotion")]
    NoAutomaticPromotion,
}

impl ScreeningSetting {
    pub const ALL: [ScreeningSetting; 3] = [
        ScreeningSetting::GoodFitAndAbove,
        ScreeningSetting::OnlyStrongFit,
        ScreeningSetting::NoAutomaticPromotion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScreeningSetting::GoodFitAndAbove => "Good Fit and above",
            ScreeningSetting::OnlyStrongFit => "Only Strong Fit",
            ScreeningSetting::NoAutomaticPromotion => "No Automatic Promotion",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// The slice of a recruiter's profile stamped onto a posting as author/editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub image: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default = "new_question_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_question_id(),
            question: text.into(),
            kind: String::new(),
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCategory {
    pub id: i64,
    pub category: String,
    #[serde(default)]
    pub question_count_to_ask: Option<u32>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Ordered interview-question categories attached to a posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet {
    pub categories: Vec<QuestionCategory>,
}

/// A persisted job posting, serialized in the camelCase shape the web client uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    pub id: Uuid,
    pub job_title: String,
    pub description: String,
    pub questions: QuestionSet,
    pub location: String,
    pub work_setup: String,
    pub work_setup_remarks: String,
    pub country: String,
    pub province: String,
    pub employment_type: String,
    pub salary_negotiable: bool,
    pub minimum_salary: Option<f64>,
    pub maximum_salary: Option<f64>,
    pub screening_setting: ScreeningSetting,
    pub require_video: bool,
    #[serde(rename = "orgID")]
    pub org_id: String,
    pub status: CareerStatus,
    pub created_by: UserInfo,
    pub last_edited_by: UserInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// Request body for creating or updating a posting.
///
/// Everything is optional so that requiredness is reported as a 400 with a
/// readable message rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerInput {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub work_setup: Option<String>,
    #[serde(default)]
    pub work_setup_remarks: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub salary_negotiable: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub minimum_salary: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub maximum_salary: Option<f64>,
    #[serde(default)]
    pub screening_setting: Option<ScreeningSetting>,
    #[serde(default)]
    pub require_video: Option<bool>,
    #[serde(default, rename = "orgID")]
    pub org_id: Option<String>,
    #[serde(default)]
    pub status: Option<CareerStatus>,
    #[serde(default)]
    pub created_by: Option<UserInfo>,
    #[serde(default)]
    pub last_edited_by: Option<UserInfo>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CareerRow {
    pub id: Uuid,
    pub org_id: String,
    pub job_title: String,
    pub description: String,
    pub questions: Json<QuestionSet>,
    pub location: String,
    pub work_setup: String,
    pub work_setup_remarks: String,
    pub country: String,
    pub province: String,
    pub employment_type: String,
    pub salary_negotiable: bool,
    pub minimum_salary: Option<f64>,
    pub maximum_salary: Option<f64>,
    pub screening_setting: String,
    pub require_video: bool,
    pub status: String,
    pub created_by: Json<UserInfo>,
    pub last_edited_by: Json<UserInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl TryFrom<CareerRow> for Career {
    type Error = String;

    fn try_from(row: CareerRow) -> Result<Self, Self::Error> {
        let status = CareerStatus::parse(&row.status)
            .ok_or_else(|| format!("career {} has unknown status '{}'", row.id, row.status))?;
        let screening_setting = ScreeningSetting::parse(&row.screening_setting).ok_or_else(|| {
            format!(
                "career {} has unknown screening setting '{}'",
                row.id, row.screening_setting
            )
        })?;

        Ok(Career {
            id: row.id,
            job_title: row.job_title,
            description: row.description,
            questions: row.questions.0,
            location: row.location,
            work_setup: row.work_setup,
            work_setup_remarks: row.work_setup_remarks,
            country: row.country,
            province: row.province,
            employment_type: row.employment_type,
            salary_negotiable: row.salary_negotiable,
            minimum_salary: row.minimum_salary,
            maximum_salary: row.maximum_salary,
            screening_setting,
            require_video: row.require_video,
            org_id: row.org_id,
            status,
            created_by: row.created_by.0,
            last_edited_by: row.last_edited_by.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_activity_at: row.last_activity_at,
        })
    }
}

pub fn new_question_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parses a salary typed by a user: thousands separators are ignored,
/// blank or non-numeric text yields `None`.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(n) => n.to_string(),
    })
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawAmount>::deserialize(deserializer)? {
        None => None,
        Some(RawAmount::Number(n)) => Some(n),
        Some(RawAmount::Text(text)) => parse_amount(&text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_accepts_numeric_strings_for_salaries() {
        let input: CareerInput = serde_json::from_value(json!({
            "jobTitle": "Backend Engineer",
            "minimumSalary": "40,000",
            "maximumSalary": 60000,
            "orgID": "65a1f0c2e4b0a1b2c3d4e5f6"
        }))
        .unwrap();
        assert_eq!(input.minimum_salary, Some(40000.0));
        assert_eq!(input.maximum_salary, Some(60000.0));
        assert_eq!(input.org_id.as_deref(), Some("65a1f0c2e4b0a1b2c3d4e5f6"));
    }

    #[test]
    fn test_input_treats_blank_salary_as_absent() {
        let input: CareerInput =
            serde_json::from_value(json!({ "minimumSalary": "", "maximumSalary": null })).unwrap();
        assert_eq!(input.minimum_salary, None);
        assert_eq!(input.maximum_salary, None);
    }

    #[test]
    fn test_question_id_accepts_numbers() {
        let q: Question = serde_json::from_value(json!({ "id": 7, "question": "Why?" })).unwrap();
        assert_eq!(q.id, "7");
        assert_eq!(q.kind, "");
        assert!(!q.required);
    }

    #[test]
    fn test_screening_setting_wire_names() {
        let s: ScreeningSetting = serde_json::from_value(json!("Only Strong Fit")).unwrap();
        assert_eq!(s, ScreeningSetting::OnlyStrongFit);
        assert_eq!(
            ScreeningSetting::parse("No Automatic Promotion"),
            Some(ScreeningSetting::NoAutomaticPromotion)
        );
        assert_eq!(ScreeningSetting::parse("Anything"), None);
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert!(serde_json::from_value::<CareerStatus>(json!("archived")).is_err());
        assert_eq!(CareerStatus::parse("inactive"), Some(CareerStatus::Inactive));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 1,250.50 "), Some(1250.5));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("   "), None);
    }
}
