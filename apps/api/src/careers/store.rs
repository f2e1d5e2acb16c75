//! Persistence for careers, organizations and global settings.
//!
//! Handlers and the service depend on `CareerStore`; `PgCareerStore` is the
//! production implementation.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::career::{Career, CareerRow};
use crate::models::organization::OrganizationPlan;

const QUESTION_GEN_PROMPT_SETTING: &str = "question_gen_prompt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result of a write that may be refused by the organization's job limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    NotFound,
    OverLimit,
}

#[async_trait]
pub trait CareerStore: Send + Sync {
    /// The organization joined with its plan, or `None` when either is missing.
    async fn find_organization_plan(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationPlan>, StoreError>;

    /// Inserts `career`. With a `job_capacity`, the write is refused when the
    /// organization already holds that many active careers; the count and the
    /// write happen atomically.
    async fn insert_career(
        &self,
        career: &Career,
        job_capacity: Option<i64>,
    ) -> Result<WriteOutcome, StoreError>;

    /// Replaces the stored career with the same id. `job_capacity` works as for
    /// [`CareerStore::insert_career`], not counting `career` itself.
    async fn update_career(
        &self,
        career: &Career,
        job_capacity: Option<i64>,
    ) -> Result<WriteOutcome, StoreError>;

    async fn get_career(&self, id: Uuid) -> Result<Option<Career>, StoreError>;

    /// Organization-wide extra instruction appended to question generation prompts.
    async fn question_gen_prompt(&self) -> Result<Option<String>, StoreError>;
}

#[derive(Clone)]
pub struct PgCareerStore {
    pool: PgPool,
}

impl PgCareerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks the organization row for the rest of the transaction, then counts its
/// active careers other than `exclude`.
async fn lock_and_count_active(
    conn: &mut PgConnection,
    org_id: &str,
    exclude: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query("SELECT id FROM organizations WHERE id = $1 FOR UPDATE")
        .bind(org_id)
        .fetch_optional(&mut *conn)
        .await?;

    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM careers WHERE org_id = $1 AND status = 'active' AND id <> $2",
    )
    .bind(org_id)
    .bind(exclude)
    .fetch_one(&mut *conn)
    .await
}

#[async_trait]
impl CareerStore for PgCareerStore {
    async fn find_organization_plan(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationPlan>, StoreError> {
        Ok(sqlx::query_as::<_, OrganizationPlan>(
            r#"
            SELECT o.id AS org_id,
                   o.name,
                   p.id AS plan_id,
                   p.job_limit,
                   COALESCE(o.extra_job_slots, 0) AS extra_job_slots
            FROM organizations o
            JOIN organization_plans p ON p.id = o.plan_id
            WHERE o.id = $1
            "#,
        )
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_career(
        &self,
        career: &Career,
        job_capacity: Option<i64>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(capacity) = job_capacity {
            let active = lock_and_count_active(&mut tx, &career.org_id, career.id).await?;
            if active >= capacity {
                info!(
                    "Refusing career for org {}: {active} active of {capacity}",
                    career.org_id
                );
                return Ok(WriteOutcome::OverLimit);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO careers
                (id, org_id, job_title, description, questions, location, work_setup,
                 work_setup_remarks, country, province, employment_type, salary_negotiable,
                 minimum_salary, maximum_salary, screening_setting, require_video, status,
                 created_by, last_edited_by, created_at, updated_at, last_activity_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22)
            "#,
        )
        .bind(career.id)
        .bind(&career.org_id)
        .bind(&career.job_title)
        .bind(&career.description)
        .bind(Json(&career.questions))
        .bind(&career.location)
        .bind(&career.work_setup)
        .bind(&career.work_setup_remarks)
        .bind(&career.country)
        .bind(&career.province)
        .bind(&career.employment_type)
        .bind(career.salary_negotiable)
        .bind(career.minimum_salary)
        .bind(career.maximum_salary)
        .bind(career.screening_setting.as_str())
        .bind(career.require_video)
        .bind(career.status.as_str())
        .bind(Json(&career.created_by))
        .bind(Json(&career.last_edited_by))
        .bind(career.created_at)
        .bind(career.updated_at)
        .bind(career.last_activity_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Inserted career {} for org {}", career.id, career.org_id);
        Ok(WriteOutcome::Written)
    }

    async fn update_career(
        &self,
        career: &Career,
        job_capacity: Option<i64>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(capacity) = job_capacity {
            let active = lock_and_count_active(&mut tx, &career.org_id, career.id).await?;
            if active >= capacity {
                info!(
                    "Refusing to publish career {}: {active} active of {capacity}",
                    career.id
                );
                return Ok(WriteOutcome::OverLimit);
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE careers SET
                job_title = $2, description = $3, questions = $4, location = $5,
                work_setup = $6, work_setup_remarks = $7, country = $8, province = $9,
                employment_type = $10, salary_negotiable = $11, minimum_salary = $12,
                maximum_salary = $13, screening_setting = $14, require_video = $15,
                status = $16, last_edited_by = $17, updated_at = $18, last_activity_at = $19
            WHERE id = $1
            "#,
        )
        .bind(career.id)
        .bind(&career.job_title)
        .bind(&career.description)
        .bind(Json(&career.questions))
        .bind(&career.location)
        .bind(&career.work_setup)
        .bind(&career.work_setup_remarks)
        .bind(&career.country)
        .bind(&career.province)
        .bind(&career.employment_type)
        .bind(career.salary_negotiable)
        .bind(career.minimum_salary)
        .bind(career.maximum_salary)
        .bind(career.screening_setting.as_str())
        .bind(career.require_video)
        .bind(career.status.as_str())
        .bind(Json(&career.last_edited_by))
        .bind(career.updated_at)
        .bind(career.last_activity_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(WriteOutcome::NotFound);
        }
        tx.commit().await?;
        Ok(WriteOutcome::Written)
    }

    async fn get_career(&self, id: Uuid) -> Result<Option<Career>, StoreError> {
        let row = sqlx::query_as::<_, CareerRow>("SELECT * FROM careers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Career::try_from)
            .transpose()
            .map_err(StoreError::Corrupt)
    }

    async fn question_gen_prompt(&self) -> Result<Option<String>, StoreError> {
        let value: Option<Value> =
            sqlx::query_scalar("SELECT value FROM global_settings WHERE name = $1")
                .bind(QUESTION_GEN_PROMPT_SETTING)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value
            .as_ref()
            .and_then(|v| v.get("prompt"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }
}
