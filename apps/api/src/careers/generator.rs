//! Interview-question generation.
//!
//! Builds a prompt from the posting's title, description and existing questions,
//! asks the model for new questions, and merges the reply into the question set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::careers::prompts::{
    ALL_CATEGORIES_PROMPT, EXISTING_QUESTIONS_HEADER, ONE_CATEGORY_PROMPT, QUESTION_GEN_ROLE,
};
use crate::careers::questions::GeneratedBatch;
use crate::careers::sanitize::unescape_string;
use crate::careers::store::CareerStore;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, LlmClient, LlmError};
use crate::models::career::QuestionSet;

/// Questions requested per category on every generation call.
pub const QUESTIONS_PER_CATEGORY: usize = 5;

pub struct InterviewCategory {
    pub name: &'static str,
    pub description: &'static str,
}

/// Categories the generator knows how to write for, with the scope given to the model.
pub const INTERVIEW_CATEGORIES: &[InterviewCategory] = &[
    InterviewCategory {
        name: "CV Validation / Experience",
        description: "Questions that verify the candidate's stated work history, \
            responsibilities and accomplishments against what the role needs.",
    },
    InterviewCategory {
        name: "Technical",
        description: "Questions that probe the hard skills, tools and domain knowledge \
            named in the job description.",
    },
    InterviewCategory {
        name: "Behavioral",
        description: "Questions about past situations that show how the candidate works \
            with others, handles pressure and takes ownership.",
    },
    InterviewCategory {
        name: "Analytical",
        description: "Questions that ask the candidate to reason through a problem, \
            weigh trade-offs or interpret data relevant to the role.",
    },
    InterviewCategory {
        name: "Others",
        description: "Questions about motivation, availability, expectations and culture \
            fit that do not belong to the other categories.",
    },
];

pub fn find_category(name: &str) -> Option<&'static InterviewCategory> {
    let name = name.trim();
    INTERVIEW_CATEGORIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
}

/// The text-completion backend used for generation.
#[async_trait]
pub trait QuestionModel: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl QuestionModel for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.call_text(prompt, system).await
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Option<QuestionSet>,
    /// Generate for one category only; all categories when absent.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsResponse {
    pub questions: QuestionSet,
    pub added: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedReply {
    Many(Vec<GeneratedBatch>),
    One(GeneratedBatch),
}

impl GeneratedReply {
    fn into_batches(self) -> Vec<GeneratedBatch> {
        match self {
            GeneratedReply::Many(batches) => batches,
            GeneratedReply::One(batch) => vec![batch],
        }
    }
}

pub async fn generate_questions(
    model: &dyn QuestionModel,
    store: &dyn CareerStore,
    request: GenerateQuestionsRequest,
) -> Result<GenerateQuestionsResponse, AppError> {
    if request.job_title.trim().is_empty() || request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job title and description are required to generate questions".to_string(),
        ));
    }

    let mut questions = request
        .questions
        .unwrap_or_else(QuestionSet::with_default_categories);

    let batches = match request.category.as_deref() {
        Some(name) => {
            let category = find_category(name).ok_or_else(|| {
                AppError::Validation(format!("Unknown interview category '{}'", name.trim()))
            })?;
            let instruction = match store.question_gen_prompt().await {
                Ok(instruction) => instruction,
                Err(e) => {
                    warn!("Could not load question generation instruction: {e}");
                    None
                }
            };
            let prompt = build_category_prompt(
                &request.job_title,
                &request.description,
                category,
                &questions,
                instruction.as_deref(),
            );
            let mut batches = request_batches(model, &prompt).await?;
            // The reply is for the requested category whatever it calls itself.
            for batch in &mut batches {
                batch.category = category.name.to_string();
            }
            batches
        }
        None => {
            let prompt = build_all_categories_prompt(
                &request.job_title,
                &request.description,
                &questions,
            );
            request_batches(model, &prompt).await?
        }
    };

    let added = questions.merge_generated(&batches);
    info!(
        "Generated {added} interview questions for '{}'",
        request.job_title.trim()
    );

    Ok(GenerateQuestionsResponse { questions, added })
}

async fn request_batches(
    model: &dyn QuestionModel,
    prompt: &str,
) -> Result<Vec<GeneratedBatch>, AppError> {
    let system = format!("{QUESTION_GEN_ROLE} {JSON_ONLY_SYSTEM}");
    let reply = model
        .complete(prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;
    parse_reply(&reply)
}

fn parse_reply(reply: &str) -> Result<Vec<GeneratedBatch>, AppError> {
    serde_json::from_str::<GeneratedReply>(strip_json_fences(reply))
        .map(GeneratedReply::into_batches)
        .map_err(|e| AppError::Llm(format!("Question generation returned malformed JSON: {e}")))
}

/// Numbered list of the questions already on the posting, or empty when there are none.
fn existing_questions_block(questions: &QuestionSet) -> String {
    if questions.total_questions() == 0 {
        return String::new();
    }
    let mut block = format!("{EXISTING_QUESTIONS_HEADER}\n");
    for category in &questions.categories {
        for (i, question) in category.questions.iter().enumerate() {
            block.push_str(&format!(
                "  {}. {}\n",
                i + 1,
                unescape_string(&question.question)
            ));
        }
    }
    block
}

pub fn build_all_categories_prompt(
    job_title: &str,
    description: &str,
    questions: &QuestionSet,
) -> String {
    let categories = INTERVIEW_CATEGORIES
        .iter()
        .map(|c| format!("- {}: {}", c.name, c.description))
        .collect::<Vec<_>>()
        .join("\n");

    let total = (QUESTIONS_PER_CATEGORY * INTERVIEW_CATEGORIES.len()).to_string();
    let per_category = QUESTIONS_PER_CATEGORY.to_string();
    let existing = existing_questions_block(questions);
    fill_template(
        ALL_CATEGORIES_PROMPT,
        &[
            ("total", total.as_str()),
            ("per_category", per_category.as_str()),
            ("categories", categories.as_str()),
            ("existing", existing.as_str()),
            ("job_title", job_title.trim()),
            ("description", description.trim()),
        ],
    )
}

pub fn build_category_prompt(
    job_title: &str,
    description: &str,
    category: &InterviewCategory,
    questions: &QuestionSet,
    instruction: Option<&str>,
) -> String {
    let per_category = QUESTIONS_PER_CATEGORY.to_string();
    let existing = existing_questions_block(questions);
    fill_template(
        ONE_CATEGORY_PROMPT,
        &[
            ("per_category", per_category.as_str()),
            ("category_description", category.description),
            ("category", category.name),
            ("existing", existing.as_str()),
            ("instruction", instruction.unwrap_or("").trim()),
            ("job_title", job_title.trim()),
            ("description", description.trim()),
        ],
    )
}

/// Replaces `{name}` placeholders in one pass. Substituted values are never
/// rescanned, so braces inside user text come through literally.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = values.iter().find(|(name, _)| {
            after
                .strip_prefix(*name)
                .is_some_and(|tail| tail.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
