#![allow(dead_code)]

//! Multi-step career form: the state behind "Career Details" → "AI Interview
//! Setup" → "Review Career".
//!
//! The form never talks to the network itself. `begin_save` validates and hands
//! back the request to send; the caller reports the result through
//! `finish_save`, which decides whether to stay, advance or redirect.

use serde::Serialize;
use thiserror::Error;

use crate::careers::questions::MIN_QUESTIONS_TO_PUBLISH;
use crate::careers::sanitize::{sanitize_rich_text, unescape_string};
use crate::careers::validation::{
    question_count_error, salary_range_error, validate_fields, FieldErrors,
    CAREER_DETAILS_RULES, QUESTIONS_FIELD, SALARY_RANGE_MESSAGE,
};
use crate::models::career::{
    parse_amount, Career, CareerInput, CareerStatus, QuestionSet, ScreeningSetting, UserInfo,
};

pub const STEP_TITLES: [&str; 3] = ["Career Details", "AI Interview Setup", "Review Career"];

const CAREER_DETAILS_STEP: usize = 0;
const INTERVIEW_SETUP_STEP: usize = 1;
const REVIEW_STEP: usize = 2;

pub const CAREERS_LIST_PATH: &str = "/recruiter-dashboard/careers";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub title: &'static str,
    pub has_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { career_id: String },
}

/// Text-valued fields of the "Career Details" step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    JobTitle,
    EmploymentType,
    WorkSetup,
    Country,
    Province,
    City,
    MinimumSalary,
    MaximumSalary,
    Description,
}

impl DetailField {
    pub fn key(&self) -> &'static str {
        match self {
            DetailField::JobTitle => "jobTitle",
            DetailField::EmploymentType => "employmentType",
            DetailField::WorkSetup => "workSetup",
            DetailField::Country => "country",
            DetailField::Province => "province",
            DetailField::City => "city",
            DetailField::MinimumSalary => "minimumSalary",
            DetailField::MaximumSalary => "maximumSalary",
            DetailField::Description => "description",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerDetails {
    pub job_title: String,
    pub employment_type: String,
    pub work_setup: String,
    pub country: String,
    pub province: String,
    pub city: String,
    pub salary_negotiable: bool,
    /// Raw text as typed; converted to a number when saving.
    pub minimum_salary: String,
    pub maximum_salary: String,
    pub description: String,
}

impl Default for CareerDetails {
    fn default() -> Self {
        Self {
            job_title: String::new(),
            employment_type: "Full-Time".to_string(),
            work_setup: String::new(),
            country: "Philippines".to_string(),
            province: String::new(),
            city: String::new(),
            salary_negotiable: true,
            minimum_salary: String::new(),
            maximum_salary: String::new(),
            description: String::new(),
        }
    }
}

impl CareerDetails {
    fn field_mut(&mut self, field: DetailField) -> &mut String {
        match field {
            DetailField::JobTitle => &mut self.job_title,
            DetailField::EmploymentType => &mut self.employment_type,
            DetailField::WorkSetup => &mut self.work_setup,
            DetailField::Country => &mut self.country,
            DetailField::Province => &mut self.province,
            DetailField::City => &mut self.city,
            DetailField::MinimumSalary => &mut self.minimum_salary,
            DetailField::MaximumSalary => &mut self.maximum_salary,
            DetailField::Description => &mut self.description,
        }
    }

    fn value(&self, key: &str) -> Option<&str> {
        let value = match key {
            "jobTitle" => &self.job_title,
            "employmentType" => &self.employment_type,
            "workSetup" => &self.work_setup,
            "country" => &self.country,
            "province" => &self.province,
            "city" => &self.city,
            "minimumSalary" => &self.minimum_salary,
            "maximumSalary" => &self.maximum_salary,
            "description" => &self.description,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn salaries(&self) -> (Option<f64>, Option<f64>) {
        (
            parse_amount(&self.minimum_salary),
            parse_amount(&self.maximum_salary),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterviewSetup {
    pub screening_setting: ScreeningSetting,
    pub require_video: bool,
    pub questions: QuestionSet,
}

impl Default for InterviewSetup {
    fn default() -> Self {
        Self {
            screening_setting: ScreeningSetting::default(),
            require_video: true,
            questions: QuestionSet::with_default_categories(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIntent {
    /// "Save as Unpublished", available on every step.
    Unpublished,
    /// "Save and Continue" on the first two steps.
    Continue,
    /// "Publish" on the review step.
    Publish,
}

#[derive(Debug, Clone)]
pub enum SaveRequest {
    Create(CareerInput),
    Update { career_id: String, input: CareerInput },
}

impl SaveRequest {
    pub fn input(&self) -> &CareerInput {
        match self {
            SaveRequest::Create(input) => input,
            SaveRequest::Update { input, .. } => input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Advance(usize),
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("{0}")]
    SalaryRange(&'static str),

    #[error("Please fill out all required fields")]
    Incomplete,

    #[error("This action is not available on the current step")]
    WrongStep,

    #[error("No save is in progress")]
    NoSaveInFlight,
}

/// One numbered line of the review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewQuestion {
    pub number: usize,
    pub category: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerReview {
    pub job_title: String,
    pub employment_type: String,
    pub work_setup: String,
    pub location: String,
    pub minimum_salary: Option<f64>,
    pub maximum_salary: Option<f64>,
    pub salary_negotiable: bool,
    pub description_html: String,
    pub screening_setting: &'static str,
    pub require_video: bool,
    pub questions: Vec<ReviewQuestion>,
}

#[derive(Debug, Clone)]
pub struct CareerForm {
    mode: FormMode,
    current_step: usize,
    steps: Vec<Step>,
    details: CareerDetails,
    details_errors: FieldErrors,
    setup: InterviewSetup,
    setup_errors: FieldErrors,
    saved_career_id: Option<String>,
    in_flight: Option<SaveIntent>,
    notice: Option<Notice>,
}

impl CareerForm {
    pub fn new() -> Self {
        Self::with(FormMode::Add, CareerDetails::default(), InterviewSetup::default())
    }

    /// Opens an existing posting for editing. Stored text is unescaped so that it
    /// is not escaped twice when saved again.
    pub fn edit(career: &Career) -> Self {
        let details = CareerDetails {
            job_title: unescape_string(&career.job_title),
            employment_type: unescape_string(&career.employment_type),
            work_setup: unescape_string(&career.work_setup),
            country: unescape_string(&career.country),
            province: unescape_string(&career.province),
            city: unescape_string(&career.location),
            salary_negotiable: career.salary_negotiable,
            minimum_salary: career.minimum_salary.map(|n| n.to_string()).unwrap_or_default(),
            maximum_salary: career.maximum_salary.map(|n| n.to_string()).unwrap_or_default(),
            description: career.description.clone(),
        };

        let mut questions = career.questions.clone();
        for category in &mut questions.categories {
            category.category = unescape_string(&category.category);
            for question in &mut category.questions {
                question.question = unescape_string(&question.question);
                question.kind = unescape_string(&question.kind);
            }
        }

        let setup = InterviewSetup {
            screening_setting: career.screening_setting,
            require_video: career.require_video,
            questions,
        };

        Self::with(
            FormMode::Edit {
                career_id: career.id.to_string(),
            },
            details,
            setup,
        )
    }

    fn with(mode: FormMode, details: CareerDetails, setup: InterviewSetup) -> Self {
        Self {
            mode,
            current_step: CAREER_DETAILS_STEP,
            steps: STEP_TITLES
                .into_iter()
                .map(|title| Step {
                    title,
                    has_error: false,
                })
                .collect(),
            details,
            details_errors: FieldErrors::new(),
            setup,
            setup_errors: FieldErrors::new(),
            saved_career_id: None,
            in_flight: None,
            notice: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn details(&self) -> &CareerDetails {
        &self.details
    }

    pub fn setup(&self) -> &InterviewSetup {
        &self.setup
    }

    pub fn details_errors(&self) -> &FieldErrors {
        &self.details_errors
    }

    pub fn setup_errors(&self) -> &FieldErrors {
        &self.setup_errors
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Id of the posting this form writes to, once one exists.
    pub fn career_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit { career_id } => Some(career_id),
            FormMode::Add => self.saved_career_id.as_deref(),
        }
    }

    pub fn title(&self) -> &str {
        if !self.details.job_title.is_empty() {
            return &self.details.job_title;
        }
        match self.mode {
            FormMode::Add => "Add New Career",
            FormMode::Edit { .. } => "Edit Career Details",
        }
    }

    fn is_last_step(&self) -> bool {
        self.current_step == self.steps.len() - 1
    }

    pub fn set_field(&mut self, field: DetailField, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.details_errors.remove(field.key());
        }
        *self.details.field_mut(field) = value;
        self.refresh_step_error();
    }

    pub fn set_salary_negotiable(&mut self, negotiable: bool) {
        self.details.salary_negotiable = negotiable;
    }

    pub fn set_screening_setting(&mut self, setting: ScreeningSetting) {
        self.setup.screening_setting = setting;
    }

    pub fn set_require_video(&mut self, require_video: bool) {
        self.setup.require_video = require_video;
    }

    /// Replaces the question set; the question error clears once there are enough.
    pub fn set_questions(&mut self, questions: QuestionSet) {
        if questions.total_questions() >= MIN_QUESTIONS_TO_PUBLISH {
            self.setup_errors.remove(QUESTIONS_FIELD);
        }
        self.setup.questions = questions;
        self.refresh_step_error();
    }

    /// Applies an edit (add, delete, reorder, merge) to the question set.
    pub fn update_questions<R>(&mut self, edit: impl FnOnce(&mut QuestionSet) -> R) -> R {
        let mut questions = std::mem::take(&mut self.setup.questions);
        let result = edit(&mut questions);
        self.set_questions(questions);
        result
    }

    /// Validates the step currently shown and flags it on the stepper.
    pub fn validate_current_step(&mut self) -> bool {
        let valid = match self.current_step {
            CAREER_DETAILS_STEP => self.validate_details(),
            INTERVIEW_SETUP_STEP => self.validate_questions(),
            _ => true,
        };
        self.refresh_step_error();
        valid
    }

    fn validate_details(&mut self) -> bool {
        let details = &self.details;
        self.details_errors = validate_fields(CAREER_DETAILS_RULES, |key| details.value(key));
        self.details_errors.is_empty()
    }

    fn validate_questions(&mut self) -> bool {
        match question_count_error(&self.setup.questions) {
            Some(message) => {
                self.setup_errors.insert(QUESTIONS_FIELD, message.to_string());
                false
            }
            None => {
                self.setup_errors.remove(QUESTIONS_FIELD);
                true
            }
        }
    }

    fn refresh_step_error(&mut self) {
        let has_error = match self.current_step {
            CAREER_DETAILS_STEP => !self.details_errors.is_empty(),
            INTERVIEW_SETUP_STEP => !self.setup_errors.is_empty(),
            _ => false,
        };
        if let Some(step) = self.steps.get_mut(self.current_step) {
            step.has_error = has_error;
        }
    }

    pub fn back(&mut self) {
        self.current_step = self.current_step.saturating_sub(1);
    }

    /// Jumps back to an earlier step, as the review step's edit links do.
    pub fn go_to_step(&mut self, step: usize) -> Result<(), FormError> {
        if step > self.current_step {
            return Err(FormError::WrongStep);
        }
        self.current_step = step;
        Ok(())
    }

    fn check_salary_range(&self) -> Result<(), FormError> {
        let (minimum, maximum) = self.details.salaries();
        match salary_range_error(minimum, maximum) {
            Some(message) => Err(FormError::SalaryRange(message)),
            None => Ok(()),
        }
    }

    /// Validates the form for `intent` and returns the request to send.
    ///
    /// While the returned request is in flight further saves are rejected
    /// until [`CareerForm::finish_save`] is called.
    pub fn begin_save(
        &mut self,
        intent: SaveIntent,
        author: &UserInfo,
        org_id: &str,
    ) -> Result<SaveRequest, FormError> {
        if self.is_saving() {
            return Err(FormError::SaveInProgress);
        }
        if let Err(err) = self.check_salary_range() {
            self.notice = Some(Notice::Error(SALARY_RANGE_MESSAGE.to_string()));
            return Err(err);
        }

        match intent {
            SaveIntent::Continue => {
                if self.is_last_step() {
                    return Err(FormError::WrongStep);
                }
                if !self.validate_current_step() {
                    return Err(self.incomplete());
                }
            }
            SaveIntent::Publish => {
                if !self.is_last_step() {
                    return Err(FormError::WrongStep);
                }
                self.validate_for_publish()?;
            }
            SaveIntent::Unpublished => {
                if self.mode == FormMode::Add && !self.validate_current_step() {
                    return Err(self.incomplete());
                }
            }
        }

        let status = match intent {
            SaveIntent::Publish => CareerStatus::Active,
            SaveIntent::Unpublished | SaveIntent::Continue => CareerStatus::Inactive,
        };

        let mut input = self.to_input(status, author);
        let request = match self.career_id() {
            Some(career_id) => SaveRequest::Update {
                career_id: career_id.to_string(),
                input,
            },
            None => {
                input.org_id = Some(org_id.to_string());
                input.created_by = Some(author.clone());
                SaveRequest::Create(input)
            }
        };

        self.in_flight = Some(intent);
        self.notice = None;
        Ok(request)
    }

    /// Records the outcome of the request returned by [`CareerForm::begin_save`].
    ///
    /// `result` carries the id of the saved posting or the failure message.
    pub fn finish_save(&mut self, result: Result<String, String>) -> Result<Navigation, FormError> {
        let intent = self.in_flight.take().ok_or(FormError::NoSaveInFlight)?;
        let created = self.career_id().is_none();

        let career_id = match result {
            Ok(id) => id,
            Err(message) => {
                let fallback = if created {
                    "Failed to add career"
                } else {
                    "Failed to update career"
                };
                let message = if message.is_empty() {
                    fallback.to_string()
                } else {
                    message
                };
                self.notice = Some(Notice::Error(message));
                return Ok(Navigation::Stay);
            }
        };

        if self.mode == FormMode::Add {
            self.saved_career_id = Some(career_id.clone());
        }
        self.notice = Some(Notice::Success(
            if created {
                "Career added successfully"
            } else {
                "Career updated successfully"
            }
            .to_string(),
        ));

        Ok(match intent {
            SaveIntent::Continue => {
                self.current_step += 1;
                Navigation::Advance(self.current_step)
            }
            SaveIntent::Unpublished | SaveIntent::Publish => match self.mode {
                FormMode::Add => Navigation::Redirect(CAREERS_LIST_PATH.to_string()),
                FormMode::Edit { .. } => {
                    Navigation::Redirect(format!("{CAREERS_LIST_PATH}/manage/{career_id}"))
                }
            },
        })
    }

    fn incomplete(&mut self) -> FormError {
        self.notice = Some(Notice::Error(FormError::Incomplete.to_string()));
        FormError::Incomplete
    }

    /// Publishing needs both editable steps to be valid; the first failing step is shown.
    fn validate_for_publish(&mut self) -> Result<(), FormError> {
        for step in [CAREER_DETAILS_STEP, INTERVIEW_SETUP_STEP] {
            self.current_step = step;
            if !self.validate_current_step() {
                return Err(self.incomplete());
            }
        }
        self.current_step = REVIEW_STEP;
        Ok(())
    }

    fn to_input(&self, status: CareerStatus, author: &UserInfo) -> CareerInput {
        let (minimum_salary, maximum_salary) = self.details.salaries();
        CareerInput {
            job_title: Some(self.details.job_title.clone()),
            description: Some(self.details.description.clone()),
            questions: serde_json::to_value(&self.setup.questions).ok(),
            location: Some(self.details.city.clone()),
            work_setup: Some(self.details.work_setup.clone()),
            work_setup_remarks: None,
            country: Some(self.details.country.clone()),
            province: Some(self.details.province.clone()),
            employment_type: Some(self.details.employment_type.clone()),
            salary_negotiable: Some(self.details.salary_negotiable),
            minimum_salary,
            maximum_salary,
            screening_setting: Some(self.setup.screening_setting),
            require_video: Some(self.setup.require_video),
            org_id: None,
            status: Some(status),
            created_by: None,
            last_edited_by: Some(author.clone()),
        }
    }

    /// Summary shown on the review step. Questions are numbered across categories.
    pub fn review(&self) -> CareerReview {
        let (minimum_salary, maximum_salary) = self.details.salaries();
        let questions = self
            .setup
            .questions
            .categories
            .iter()
            .flat_map(|c| c.questions.iter().map(move |q| (c, q)))
            .enumerate()
            .map(|(i, (category, question))| ReviewQuestion {
                number: i + 1,
                category: category.category.clone(),
                question: question.question.clone(),
            })
            .collect();

        CareerReview {
            job_title: self.details.job_title.clone(),
            employment_type: self.details.employment_type.clone(),
            work_setup: self.details.work_setup.clone(),
            location: [&self.details.city, &self.details.province, &self.details.country]
                .iter()
                .filter(|s| !s.is_empty())
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            minimum_salary,
            maximum_salary,
            salary_negotiable: self.details.salary_negotiable,
            description_html: sanitize_rich_text(&self.details.description),
            screening_setting: self.setup.screening_setting.as_str(),
            require_video: self.setup.require_video,
            questions,
        }
    }
}

impl Default for CareerForm {
    fn default() -> Self {
        Self::new()
    }
}
