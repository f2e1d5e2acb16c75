//! In-memory doubles for the store and the question model.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::careers::generator::QuestionModel;
use crate::careers::store::{CareerStore, StoreError, WriteOutcome};
use crate::llm_client::LlmError;
use crate::models::career::{Career, CareerStatus};
use crate::models::organization::OrganizationPlan;

pub const TEST_ORG_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

pub fn test_plan(job_limit: i32, extra_job_slots: i32) -> OrganizationPlan {
    OrganizationPlan {
        org_id: TEST_ORG_ID.to_string(),
        name: "Acme Recruiting".to_string(),
        plan_id: "starter".to_string(),
        job_limit,
        extra_job_slots,
    }
}

#[derive(Default)]
pub struct MemoryCareerStore {
    careers: Mutex<HashMap<Uuid, Career>>,
    plans: Mutex<HashMap<String, OrganizationPlan>>,
    question_gen_prompt: Option<String>,
    fail_prompt_lookup: bool,
}

impl MemoryCareerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(self, plan: OrganizationPlan) -> Self {
        self.plans
            .lock()
            .unwrap()
            .insert(plan.org_id.clone(), plan);
        self
    }

    pub fn with_question_gen_prompt(mut self, prompt: &str) -> Self {
        self.question_gen_prompt = Some(prompt.to_string());
        self
    }

    pub fn with_failing_prompt_lookup(mut self) -> Self {
        self.fail_prompt_lookup = true;
        self
    }

    pub fn careers(&self) -> Vec<Career> {
        self.careers.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl CareerStore for MemoryCareerStore {
    async fn find_organization_plan(
        &self,
        org_id: &str,
    ) -> Result<Option<OrganizationPlan>, StoreError> {
        Ok(self.plans.lock().unwrap().get(org_id).cloned())
    }

    async fn insert_career(
        &self,
        career: &Career,
        job_capacity: Option<i64>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut careers = self.careers.lock().unwrap();
        if over_limit(&careers, career, job_capacity) {
            return Ok(WriteOutcome::OverLimit);
        }
        careers.insert(career.id, career.clone());
        Ok(WriteOutcome::Written)
    }

    async fn update_career(
        &self,
        career: &Career,
        job_capacity: Option<i64>,
    ) -> Result<WriteOutcome, StoreError> {
        let mut careers = self.careers.lock().unwrap();
        if !careers.contains_key(&career.id) {
            return Ok(WriteOutcome::NotFound);
        }
        if over_limit(&careers, career, job_capacity) {
            return Ok(WriteOutcome::OverLimit);
        }
        careers.insert(career.id, career.clone());
        Ok(WriteOutcome::Written)
    }

    async fn get_career(&self, id: Uuid) -> Result<Option<Career>, StoreError> {
        Ok(self.careers.lock().unwrap().get(&id).cloned())
    }

    async fn question_gen_prompt(&self) -> Result<Option<String>, StoreError> {
        if self.fail_prompt_lookup {
            return Err(StoreError::Corrupt("settings unavailable".to_string()));
        }
        Ok(self.question_gen_prompt.clone())
    }
}

fn over_limit(careers: &HashMap<Uuid, Career>, career: &Career, job_capacity: Option<i64>) -> bool {
    let Some(capacity) = job_capacity else {
        return false;
    };
    let active = careers
        .values()
        .filter(|c| c.id != career.id)
        .filter(|c| c.org_id == career.org_id && c.status == CareerStatus::Active)
        .count() as i64;
    active >= capacity
}

/// Replies with queued results in order and records every prompt it receives.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionModel for ScriptedModel {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
