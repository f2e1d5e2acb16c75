#![allow(dead_code)]

//! Editing and drag-and-drop reordering of a posting's interview questions.
//!
//! All operations are no-ops when the referenced category or question does not
//! exist, so a stale drag event can never drop a question on the floor.

use serde::{Deserialize, Serialize};

use crate::careers::sanitize::unescape_string;
use crate::models::career::{Question, QuestionCategory, QuestionSet};

/// Minimum number of questions a posting needs before it can be published.
pub const MIN_QUESTIONS_TO_PUBLISH: usize = 5;

/// Category names of a new posting, in display order. Ids are 1-based positions.
pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "CV Validation / Experience",
    "Technical",
    "Behavioral",
    "Analytical",
    "Others",
];

/// A batch of questions proposed by the language model for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBatch {
    pub category: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Where a dragged item lands relative to the element it was dropped on.
pub fn drop_insert_index(target_index: usize, in_lower_half: bool) -> usize {
    if in_lower_half {
        target_index + 1
    } else {
        target_index
    }
}

impl QuestionSet {
    pub fn with_default_categories() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .zip(1..)
            .map(|(name, id)| QuestionCategory {
                id,
                category: (*name).to_string(),
                question_count_to_ask: None,
                questions: Vec::new(),
            })
            .collect();
        Self { categories }
    }

    pub fn total_questions(&self) -> usize {
        self.categories.iter().map(|c| c.questions.len()).sum()
    }

    pub fn category(&self, category_id: i64) -> Option<&QuestionCategory> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    fn position(&self, category_id: i64) -> Option<usize> {
        self.categories.iter().position(|c| c.id == category_id)
    }

    /// Appends a question to a category and returns its id.
    pub fn add_question(&mut self, category_id: i64, text: &str) -> Option<String> {
        let idx = self.position(category_id)?;
        let question = Question::new(text);
        let id = question.id.clone();
        self.categories[idx].questions.push(question);
        Some(id)
    }

    pub fn edit_question(&mut self, category_id: i64, question_id: &str, text: &str) -> bool {
        let Some(idx) = self.position(category_id) else {
            return false;
        };
        match self.categories[idx]
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
        {
            Some(question) => {
                question.question = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete_question(&mut self, category_id: i64, question_id: &str) -> bool {
        let Some(idx) = self.position(category_id) else {
            return false;
        };
        let category = &mut self.categories[idx];
        let before = category.questions.len();
        category.questions.retain(|q| q.id != question_id);
        let removed = category.questions.len() != before;
        clamp_count_to_ask(category);
        removed
    }

    /// Moves a category so that it lands at `drop_index`, an index into the list as
    /// it looked before the drag started.
    pub fn reorder_categories(&mut self, dragged_category_id: i64, drop_index: usize) -> bool {
        let Some(from) = self.position(dragged_category_id) else {
            return false;
        };
        let category = self.categories.remove(from);
        let to = adjust_for_removal(from, drop_index).min(self.categories.len());
        self.categories.insert(to, category);
        true
    }

    /// Moves a question within its category (to `insert_index`, default 0) or to
    /// the end of another category.
    ///
    /// `insert_index` refers to the destination list as it looked before the drag.
    pub fn reorder_questions(
        &mut self,
        question_id: &str,
        from_category_id: i64,
        to_category_id: i64,
        insert_index: Option<usize>,
    ) -> bool {
        let (Some(from), Some(to)) = (
            self.position(from_category_id),
            self.position(to_category_id),
        ) else {
            return false;
        };
        let Some(question_idx) = self.categories[from]
            .questions
            .iter()
            .position(|q| q.id == question_id)
        else {
            return false;
        };

        let question = self.categories[from].questions.remove(question_idx);

        if from == to {
            let questions = &mut self.categories[from].questions;
            let target = adjust_for_removal(question_idx, insert_index.unwrap_or(0))
                .min(questions.len());
            questions.insert(target, question);
        } else {
            self.categories[to].questions.push(question);
            clamp_count_to_ask(&mut self.categories[from]);
        }
        true
    }

    /// Appends generated questions to the categories they were generated for and
    /// returns how many were added. Batches for unknown categories are ignored.
    pub fn merge_generated(&mut self, batches: &[GeneratedBatch]) -> usize {
        let mut added = 0;
        for batch in batches {
            let wanted = batch.category.trim();
            let Some(category) = self
                .categories
                .iter_mut()
                .find(|c| unescape_string(&c.category).eq_ignore_ascii_case(wanted))
            else {
                continue;
            };
            for text in batch.questions.iter().filter(|t| !t.trim().is_empty()) {
                category.questions.push(Question::new(text.trim()));
                added += 1;
            }
        }
        added
    }
}

fn adjust_for_removal(removed_from: usize, target: usize) -> usize {
    if removed_from < target {
        target - 1
    } else {
        target
    }
}

fn clamp_count_to_ask(category: &mut QuestionCategory) {
    let remaining = category.questions.len() as u32;
    if let Some(count) = category.question_count_to_ask {
        if count > remaining {
            category.question_count_to_ask = Some(remaining);
        }
    }
}
