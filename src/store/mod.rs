// src/store/mod.rs

//! Storage seams of the service.
//!
//! Handlers and services only see the traits below. `PgStore` is the
//! production backend; `MemoryStore` keeps everything in process and is used
//! when no database is configured and throughout the tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        leaderboard::{LevelTotal, StudentTotal},
        level::Level,
        progress::StudentQuizProgress,
        question::{NewQuestion, QuizQuestion},
        user::{NewUser, User},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Per-(student, date, level) progress records and their answer entries.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Returns the record for the triple, creating it if absent.
    /// `completed_if_created` is only applied when a new record is inserted.
    async fn find_or_create_progress(
        &self,
        student_id: i64,
        quiz_date: NaiveDate,
        level: &Level,
        completed_if_created: bool,
    ) -> Result<StudentQuizProgress, AppError>;

    /// Loads a record together with its answer entries.
    async fn load_progress(&self, progress_id: i64) -> Result<StudentQuizProgress, AppError>;

    /// Idempotently creates an empty answer entry (attempts = 0).
    async fn ensure_answer_entry(&self, progress_id: i64, question_id: i64)
    -> Result<(), AppError>;

    /// Atomically adds one attempt and returns the resulting count.
    async fn increment_attempts(&self, progress_id: i64, question_id: i64)
    -> Result<i32, AppError>;

    /// Latches `is_correct` and overwrites `earned_diamonds`.
    async fn mark_correct(
        &self,
        progress_id: i64,
        question_id: i64,
        earned_diamonds: i32,
    ) -> Result<(), AppError>;

    /// Last-writer-wins save of the derived fields.
    async fn save_progress_summary(
        &self,
        progress_id: i64,
        total_diamonds: i64,
        completed: bool,
    ) -> Result<(), AppError>;

    /// Sum of `total_diamonds` over every record of the student.
    async fn student_total(&self, student_id: i64) -> Result<i64, AppError>;

    /// Sums of `total_diamonds` grouped by stored level for one student.
    async fn level_totals(&self, student_id: i64) -> Result<Vec<LevelTotal>, AppError>;

    /// One row per student owning at least one record, ordered by student id.
    async fn student_totals(&self) -> Result<Vec<StudentTotal>, AppError>;
}

/// Quiz questions grouped in (date, level) buckets.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Questions of a bucket ordered by id.
    async fn list_bucket(
        &self,
        quiz_date: NaiveDate,
        level: &Level,
    ) -> Result<Vec<QuizQuestion>, AppError>;

    async fn bucket_question_ids(
        &self,
        quiz_date: NaiveDate,
        level: &Level,
    ) -> Result<Vec<i64>, AppError>;

    async fn find_question(&self, id: i64) -> Result<Option<QuizQuestion>, AppError>;

    async fn create_question(&self, question: NewQuestion) -> Result<QuizQuestion, AppError>;

    /// Replaces every field of an existing question. `None` if it does not exist.
    async fn update_question(
        &self,
        id: i64,
        question: NewQuestion,
    ) -> Result<Option<QuizQuestion>, AppError>;

    /// Returns whether a question was removed.
    async fn delete_question(&self, id: i64) -> Result<bool, AppError>;
}

/// Student and admin identities.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AppError::Conflict` when the username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

/// Everything the application needs from its storage backend.
pub trait Store: ProgressStore + QuestionStore + UserStore {}

impl<T: ProgressStore + QuestionStore + UserStore> Store for T {}

pub type DynStore = Arc<dyn Store>;
