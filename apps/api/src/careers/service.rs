//! Creating and updating postings.
//!
//! Every text member is sanitized here before it reaches the store, whatever
//! the client already did.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::careers::sanitize::{
    is_blank_rich_text, is_valid_object_id, sanitize_rich_text, sanitize_string,
    validate_and_sanitize_questions,
};
use crate::careers::store::{CareerStore, WriteOutcome};
use crate::careers::validation::{
    has_required_fields, question_count_error, salary_range_error, REQUIRED_FIELDS_MESSAGE,
};
use crate::errors::AppError;
use crate::models::career::{Career, CareerInput, CareerStatus, QuestionSet, UserInfo};
use crate::models::organization::OrganizationPlan;

pub const INVALID_ORG_MESSAGE: &str = "Invalid organization id.";
pub const ORG_NOT_FOUND_MESSAGE: &str = "Organization not found";
pub const PLAN_LIMIT_MESSAGE: &str = "You have reached the maximum number of jobs for your plan";

pub async fn add_career(store: &dyn CareerStore, input: CareerInput) -> Result<Career, AppError> {
    if !has_required_fields(&input) {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    let org_id = input.org_id.as_deref().map(str::trim).unwrap_or_default();
    if !is_valid_object_id(org_id) {
        return Err(AppError::Validation(INVALID_ORG_MESSAGE.to_string()));
    }
    let org_id = org_id.to_string();

    let questions = sanitize_questions(&input)?.unwrap_or_default();
    let status = input.status.unwrap_or_default();
    check_publishable(status, &questions, input.minimum_salary, input.maximum_salary)?;

    let now = Utc::now();
    let created_by = sanitize_user(input.created_by.clone().unwrap_or_default());
    let last_edited_by = input
        .last_edited_by
        .clone()
        .map(sanitize_user)
        .unwrap_or_else(|| created_by.clone());

    let career = Career {
        id: Uuid::new_v4(),
        job_title: text(&input.job_title),
        description: rich_text(&input.description),
        questions,
        location: text(&input.location),
        work_setup: text(&input.work_setup),
        work_setup_remarks: text(&input.work_setup_remarks),
        country: text(&input.country),
        province: text(&input.province),
        employment_type: text(&input.employment_type),
        salary_negotiable: input.salary_negotiable.unwrap_or(true),
        minimum_salary: input.minimum_salary,
        maximum_salary: input.maximum_salary,
        screening_setting: input.screening_setting.unwrap_or_default(),
        require_video: input.require_video.unwrap_or(true),
        org_id,
        status,
        created_by,
        last_edited_by,
        created_at: now,
        updated_at: now,
        last_activity_at: now,
    };

    ensure_required_text(&career)?;

    let plan = find_plan(store, &career.org_id).await?;
    match store
        .insert_career(&career, Some(plan.job_capacity()))
        .await?
    {
        WriteOutcome::Written => {}
        WriteOutcome::OverLimit => return Err(plan_limit(&career.org_id)),
        WriteOutcome::NotFound => {
            return Err(AppError::NotFound(ORG_NOT_FOUND_MESSAGE.to_string()))
        }
    }
    info!(
        "Career {} '{}' created for org {} ({})",
        career.id,
        career.job_title,
        career.org_id,
        career.status.as_str()
    );
    Ok(career)
}

/// Merges the members present in `input` into the stored posting.
///
/// Authorship, creation time and organization never change on update.
pub async fn update_career(
    store: &dyn CareerStore,
    id: Uuid,
    input: CareerInput,
) -> Result<Career, AppError> {
    let mut career = store
        .get_career(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Career {id} not found")))?;
    let was_active = career.status == CareerStatus::Active;

    if let Some(questions) = sanitize_questions(&input)? {
        career.questions = questions;
    }
    if input.job_title.is_some() {
        career.job_title = text(&input.job_title);
    }
    if input.description.is_some() {
        career.description = rich_text(&input.description);
    }
    if input.location.is_some() {
        career.location = text(&input.location);
    }
    if input.work_setup.is_some() {
        career.work_setup = text(&input.work_setup);
    }
    if input.work_setup_remarks.is_some() {
        career.work_setup_remarks = text(&input.work_setup_remarks);
    }
    if input.country.is_some() {
        career.country = text(&input.country);
    }
    if input.province.is_some() {
        career.province = text(&input.province);
    }
    if input.employment_type.is_some() {
        career.employment_type = text(&input.employment_type);
    }
    if let Some(negotiable) = input.salary_negotiable {
        career.salary_negotiable = negotiable;
    }
    if input.minimum_salary.is_some() {
        career.minimum_salary = input.minimum_salary;
    }
    if input.maximum_salary.is_some() {
        career.maximum_salary = input.maximum_salary;
    }
    if let Some(setting) = input.screening_setting {
        career.screening_setting = setting;
    }
    if let Some(require_video) = input.require_video {
        career.require_video = require_video;
    }
    if let Some(status) = input.status {
        career.status = status;
    }
    if let Some(editor) = input.last_edited_by {
        career.last_edited_by = sanitize_user(editor);
    }

    ensure_required_text(&career)?;
    check_publishable(
        career.status,
        &career.questions,
        career.minimum_salary,
        career.maximum_salary,
    )?;

    // Publishing a draft takes a slot from the plan.
    let job_capacity = if career.status == CareerStatus::Active && !was_active {
        Some(find_plan(store, &career.org_id).await?.job_capacity())
    } else {
        None
    };

    let now = Utc::now();
    career.updated_at = now;
    career.last_activity_at = now;

    match store.update_career(&career, job_capacity).await? {
        WriteOutcome::Written => {}
        WriteOutcome::OverLimit => return Err(plan_limit(&career.org_id)),
        WriteOutcome::NotFound => {
            return Err(AppError::NotFound(format!("Career {id} not found")))
        }
    }
    info!("Career {} updated ({})", career.id, career.status.as_str());
    Ok(career)
}

async fn find_plan(store: &dyn CareerStore, org_id: &str) -> Result<OrganizationPlan, AppError> {
    store
        .find_organization_plan(org_id)
        .await?
        .ok_or_else(|| AppError::NotFound(ORG_NOT_FOUND_MESSAGE.to_string()))
}

fn plan_limit(org_id: &str) -> AppError {
    warn!("Organization {org_id} is at its job limit");
    AppError::PlanLimit(PLAN_LIMIT_MESSAGE.to_string())
}

/// Title and description must survive sanitization. A description left with
/// markup but no text counts as missing.
fn ensure_required_text(career: &Career) -> Result<(), AppError> {
    if career.job_title.is_empty() || is_blank_rich_text(&career.description) {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    }
    Ok(())
}

/// `None` when the input carries no questions member.
fn sanitize_questions(input: &CareerInput) -> Result<Option<QuestionSet>, AppError> {
    match input.questions.as_ref().filter(|q| !q.is_null()) {
        Some(raw) => validate_and_sanitize_questions(raw)
            .map(Some)
            .map_err(|e| AppError::Validation(e.to_string())),
        None => Ok(None),
    }
}

fn check_publishable(
    status: CareerStatus,
    questions: &QuestionSet,
    minimum_salary: Option<f64>,
    maximum_salary: Option<f64>,
) -> Result<(), AppError> {
    if let Some(message) = salary_range_error(minimum_salary, maximum_salary) {
        return Err(AppError::Validation(message.to_string()));
    }
    if status == CareerStatus::Active {
        if let Some(message) = question_count_error(questions) {
            return Err(AppError::Validation(message.to_string()));
        }
    }
    Ok(())
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(sanitize_string).unwrap_or_default()
}

fn rich_text(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(|html| sanitize_rich_text(html.trim()))
        .unwrap_or_default()
}

fn sanitize_user(user: UserInfo) -> UserInfo {
    UserInfo {
        image: user.image.trim().to_string(),
        name: sanitize_string(&user.name),
        email: sanitize_string(&user.email),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::careers::test_support::{test_plan, MemoryCareerStore, TEST_ORG_ID};
    use crate::careers::validation::QUESTION_COUNT_MESSAGE;
    use crate::models::career::ScreeningSetting;
    use serde_json::{json, Value};

    fn five_questions() -> Value {
        json!([
            {"id": 1, "category": "Technical", "questionCountToAsk": 2, "questions": [
                {"id": "a", "question": "What is ownership?"},
                {"id": "b", "question": "Explain <Send>"},
                {"id": "c", "question": "What is a trait object?"}
            ]},
            {"id": 2, "category": "Behavioral", "questions": [
                {"id": "d", "question": "Describe a conflict."},
                {"id": "e", "question": "Describe a failure."}
            ]}
        ])
    }

    fn input() -> CareerInput {
        CareerInput {
            job_title: Some("  Rust Engineer ".to_string()),
            description: Some("<p>Build <b>things</b></p><script>alert(1)</script>".to_string()),
            questions: Some(five_questions()),
            location: Some("Cebu City".to_string()),
            work_setup: Some("Hybrid".to_string()),
            country: Some("Philippines".to_string()),
            province: Some("Cebu".to_string()),
            employment_type: Some("Full-Time".to_string()),
            salary_negotiable: Some(true),
            minimum_salary: Some(40_000.0),
            maximum_salary: Some(60_000.0),
            org_id: Some(TEST_ORG_ID.to_string()),
            created_by: Some(UserInfo {
                image: String::new(),
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
            }),
            ..CareerInput::default()
        }
    }

    fn store_with_capacity(job_limit: i32, extra: i32) -> MemoryCareerStore {
        MemoryCareerStore::new().with_organization(test_plan(job_limit, extra))
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) | AppError::NotFound(m) | AppError::PlanLimit(m) => m,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_career_sanitizes_and_stores() {
        let store = store_with_capacity(3, 0);
        let career = add_career(&store, input()).await.unwrap();

        assert_eq!(career.job_title, "Rust Engineer");
        assert_eq!(career.description, "<p>Build <b>things</b></p>");
        assert_eq!(career.status, CareerStatus::Active);
        assert_eq!(career.screening_setting, ScreeningSetting::GoodFitAndAbove);
        assert_eq!(career.questions.total_questions(), 5);
        assert_eq!(
            career.questions.categories[0].questions[1].question,
            "Explain &lt;Send&gt;"
        );
        assert_eq!(career.last_edited_by, career.created_by);
        assert_eq!(store.careers().len(), 1);
    }

    #[tokio::test]
    async fn test_add_career_requires_fields() {
        let store = store_with_capacity(3, 0);
        let mut missing = input();
        missing.work_setup = Some("   ".to_string());
        let err = add_career(&store, missing).await.unwrap_err();
        assert_eq!(message(err), REQUIRED_FIELDS_MESSAGE);
    }

    #[tokio::test]
    async fn test_add_career_rejects_bad_org_id() {
        let store = store_with_capacity(3, 0);
        let mut bad = input();
        bad.org_id = Some("not-an-object-id".to_string());
        let err = add_career(&store, bad).await.unwrap_err();
        assert_eq!(message(err), INVALID_ORG_MESSAGE);
    }

    #[tokio::test]
    async fn test_add_career_rejects_inverted_salary() {
        let store = store_with_capacity(3, 0);
        let mut inverted = input();
        inverted.minimum_salary = Some(90_000.0);
        let err = add_career(&store, inverted).await.unwrap_err();
        assert_eq!(
            message(err),
            "Minimum salary cannot be greater than maximum salary."
        );
    }

    #[tokio::test]
    async fn test_add_career_rejects_non_array_questions() {
        let store = store_with_capacity(3, 0);
        let mut bad = input();
        bad.questions = Some(json!({"id": 1}));
        let err = add_career(&store, bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.careers().is_empty());
    }

    #[tokio::test]
    async fn test_publishing_needs_five_questions_but_drafts_do_not() {
        let store = store_with_capacity(3, 0);
        let mut few = input();
        few.questions = Some(json!([{"id": 1, "category": "Technical", "questions": [
            {"question": "Only one"}
        ]}]));

        let err = add_career(&store, few.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        few.status = Some(CareerStatus::Inactive);
        let draft = add_career(&store, few).await.unwrap();
        assert_eq!(draft.status, CareerStatus::Inactive);
    }

    #[tokio::test]
    async fn test_unknown_organization_is_not_found() {
        let store = MemoryCareerStore::new();
        let err = add_career(&store, input()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(message(err), ORG_NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_plan_limit_counts_extra_slots() {
        let store = store_with_capacity(1, 1);
        add_career(&store, input()).await.unwrap();
        add_career(&store, input()).await.unwrap();

        let err = add_career(&store, input()).await.unwrap_err();
        assert!(matches!(err, AppError::PlanLimit(_)));
        assert_eq!(store.careers().len(), 2);
    }

    #[tokio::test]
    async fn test_inactive_careers_do_not_use_quota() {
        let store = store_with_capacity(1, 0);
        let mut draft = input();
        draft.status = Some(CareerStatus::Inactive);
        add_career(&store, draft).await.unwrap();

        assert!(add_career(&store, input()).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_authorship() {
        let store = store_with_capacity(3, 0);
        let created = add_career(&store, input()).await.unwrap();

        let patch = CareerInput {
            job_title: Some("Senior Rust Engineer".to_string()),
            maximum_salary: Some(80_000.0),
            status: Some(CareerStatus::Inactive),
            org_id: Some("ffffffffffffffffffffffff".to_string()),
            last_edited_by: Some(UserInfo {
                name: "Lee".to_string(),
                ..UserInfo::default()
            }),
            ..CareerInput::default()
        };
        let updated = update_career(&store, created.id, patch).await.unwrap();

        assert_eq!(updated.job_title, "Senior Rust Engineer");
        assert_eq!(updated.maximum_salary, Some(80_000.0));
        assert_eq!(updated.minimum_salary, Some(40_000.0));
        assert_eq!(updated.location, "Cebu City");
        assert_eq!(updated.org_id, TEST_ORG_ID);
        assert_eq!(updated.created_by.name, "Dana");
        assert_eq!(updated.last_edited_by.name, "Lee");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_checks_merged_salary_range() {
        let store = store_with_capacity(3, 0);
        let created = add_career(&store, input()).await.unwrap();
        let patch = CareerInput {
            maximum_salary: Some(10_000.0),
            ..CareerInput::default()
        };
        let err = update_career(&store, created.id, patch).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_career_rejects_description_with_no_text() {
        let store = store_with_capacity(3, 0);
        let mut markup_only = input();
        markup_only.description = Some("<img src=x onerror=alert(1)>".to_string());
        let err = add_career(&store, markup_only).await.unwrap_err();
        assert_eq!(message(err), REQUIRED_FIELDS_MESSAGE);
        assert!(store.careers().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_description_with_no_text() {
        let store = store_with_capacity(3, 0);
        let created = add_career(&store, input()).await.unwrap();
        let patch = CareerInput {
            description: Some("<script>alert(1)</script>".to_string()),
            ..CareerInput::default()
        };
        let err = update_career(&store, created.id, patch).await.unwrap_err();
        assert_eq!(message(err), REQUIRED_FIELDS_MESSAGE);
        assert_eq!(
            store.careers()[0].description,
            "<p>Build <b>things</b></p>"
        );
    }

    #[tokio::test]
    async fn test_update_publishing_needs_five_questions() {
        let store = store_with_capacity(3, 0);
        let mut draft = input();
        draft.status = Some(CareerStatus::Inactive);
        draft.questions = Some(json!([{"id": 1, "category": "Technical", "questions": [
            {"question": "Only one"}
        ]}]));
        let created = add_career(&store, draft).await.unwrap();

        let publish = CareerInput {
            status: Some(CareerStatus::Active),
            ..CareerInput::default()
        };
        let err = update_career(&store, created.id, publish).await.unwrap_err();
        assert_eq!(message(err), QUESTION_COUNT_MESSAGE);
        assert_eq!(store.careers()[0].status, CareerStatus::Inactive);
    }

    #[tokio::test]
    async fn test_publishing_drafts_respects_plan_limit() {
        let store = store_with_capacity(1, 0);
        let mut draft = input();
        draft.status = Some(CareerStatus::Inactive);
        let first = add_career(&store, draft.clone()).await.unwrap();
        let second = add_career(&store, draft).await.unwrap();

        let publish = || CareerInput {
            status: Some(CareerStatus::Active),
            ..CareerInput::default()
        };
        update_career(&store, first.id, publish()).await.unwrap();
        let err = update_career(&store, second.id, publish())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PlanLimit(_)));
        let active = store
            .careers()
            .iter()
            .filter(|c| c.status == CareerStatus::Active)
            .count();
        assert_eq!(active, 1);
    }

    #[tokio::test]
    async fn test_editing_active_career_at_limit_is_allowed() {
        let store = store_with_capacity(1, 0);
        let created = add_career(&store, input()).await.unwrap();
        let patch = CareerInput {
            status: Some(CareerStatus::Active),
            work_setup_remarks: Some("Fridays remote".to_string()),
            ..CareerInput::default()
        };
        let updated = update_career(&store, created.id, patch).await.unwrap();
        assert_eq!(updated.work_setup_remarks, "Fridays remote");
    }

    #[tokio::test]
    async fn test_update_missing_career_is_not_found() {
        let store = MemoryCareerStore::new();
        let err = update_career(&store, Uuid::new_v4(), CareerInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
