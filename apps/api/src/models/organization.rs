use serde::Serialize;
use sqlx::FromRow;

/// An organization joined with its subscription plan.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrganizationPlan {
    pub org_id: String,
    pub name: String,
    pub plan_id: String,
    pub job_limit: i32,
    pub extra_job_slots: i32,
}

impl OrganizationPlan {
    /// Number of active postings the organization may hold at once.
    pub fn job_capacity(&self) -> i64 {
        i64::from(self.job_limit) + i64::from(self.extra_job_slots.max(0))
    }
}
