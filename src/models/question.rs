// src/models/question.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'quiz_questions' table in the database.
/// A question belongs to the bucket identified by its (date, level) pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: i64,

    #[serde(rename = "date")]
    pub quiz_date: NaiveDate,

    /// Canonical level key (see `Level::as_str`).
    pub level: String,

    pub question: String,

    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    pub correct_answer: String,

    pub explanation: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Fully validated question data ready to be written by a store.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub quiz_date: NaiveDate,
    pub level: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(equal = 10, message = "date must be formatted as YYYY-MM-DD"))]
    pub date: String,
    #[validate(length(min = 1, max = 50))]
    pub level: String,
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: String,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
}

/// DTO for updating a question. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    #[validate(length(equal = 10, message = "date must be formatted as YYYY-MM-DD"))]
    pub date: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub level: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub question: Option<String>,
    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,
    #[validate(length(min = 1, max = 500))]
    pub correct_answer: Option<String>,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
