// src/models/progress.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::QuizQuestion;

/// One question's attempt history inside a progress record.
/// Represents a row of the 'progress_answers' table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerAttempt {
    pub question_id: i64,
    pub attempts: i32,
    pub earned_diamonds: i32,
    /// Latched: never reset by a later incorrect attempt.
    pub is_correct: bool,
}

impl AnswerAttempt {
    pub fn new(question_id: i64) -> Self {
        Self {
            question_id,
            attempts: 0,
            earned_diamonds: 0,
            is_correct: false,
        }
    }
}

/// Represents the 'student_quiz_progress' table in the database.
/// Unique per (student_id, quiz_date, level).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuizProgress {
    pub id: i64,
    pub student_id: i64,

    #[serde(rename = "date")]
    pub quiz_date: NaiveDate,

    pub level: String,

    /// Loaded from 'progress_answers' in insertion order.
    #[sqlx(skip)]
    pub answers: Vec<AnswerAttempt>,

    pub total_diamonds: i64,
    pub completed: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl StudentQuizProgress {
    pub fn answer(&self, question_id: i64) -> Option<&AnswerAttempt> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }
}

/// DTO for submitting one answer.
/// Every field is optional at the JSON layer so that a missing field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[validate(required(message = "questionId is required"))]
    pub question_id: Option<i64>,
    #[validate(required(message = "date is required"))]
    pub date: Option<String>,
    #[validate(required(message = "level is required"))]
    pub level: Option<String>,
    #[validate(required(message = "isCorrect is required"))]
    pub is_correct: Option<bool>,
}

/// Response for `GET /student-quiz/{date}/{level}`.
#[derive(Debug, Serialize)]
pub struct BucketResponse {
    pub questions: Vec<QuizQuestion>,
    pub progress: StudentQuizProgress,
}

/// Response for an accepted answer submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub success: bool,
    pub attempts: i32,
    pub earned_diamonds: i32,
    pub total_diamonds: i64,
    pub completed: bool,
    pub answer: AnswerAttempt,
    pub progress: StudentQuizProgress,
}

/// Response for a submission against an already completed bucket.
#[derive(Debug, Serialize)]
pub struct BlockedResponse {
    pub blocked: bool,
    pub message: String,
}

/// Response for `GET /student-quiz/total`.
#[derive(Debug, Serialize)]
pub struct TotalResponse {
    pub total: i64,
}
