// Interview-question generation prompt templates.
// Placeholders in braces are substituted by the generator.

pub const QUESTION_GEN_ROLE: &str = "\
You are an experienced technical recruiter who writes clear, job-specific interview questions. \
Questions must be answerable in a short spoken reply and must not ask about protected \
characteristics (age, religion, marital status, health, ethnicity).";

pub const ALL_CATEGORIES_PROMPT: &str = r#"Generate {total} interview questions for the following job opening.

JOB TITLE:
{job_title}

JOB DESCRIPTION:
{description}

CATEGORIES:
{categories}

Write {per_category} questions for each category above, staying within the category's scope.
{existing}
OUTPUT FORMAT (return exactly this structure, one element per category):
[{"category": "<category name>", "questions": ["question 1", "question 2"]}]"#;

pub const ONE_CATEGORY_PROMPT: &str = r#"Generate {per_category} interview questions for the following job opening.

JOB TITLE:
{job_title}

JOB DESCRIPTION:
{description}

INTERVIEW CATEGORY:
{category}

CATEGORY DESCRIPTION:
{category_description}

The questions must relate to the job description and follow the scope of the interview category.
{existing}
OUTPUT FORMAT (return exactly this structure):
{"category": "{category}", "questions": ["question 1", "question 2"]}
{instruction}"#;

pub const EXISTING_QUESTIONS_HEADER: &str =
    "Do not generate questions that are already covered in this list:";
