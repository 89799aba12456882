// src/store/postgres.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, types::Json};

use crate::{
    error::AppError,
    models::{
        leaderboard::{LevelTotal, StudentTotal},
        level::Level,
        progress::{AnswerAttempt, StudentQuizProgress},
        question::{NewQuestion, QuizQuestion},
        user::{NewUser, User},
    },
    store::{ProgressStore, QuestionStore, UserStore},
};

const PROGRESS_COLUMNS: &str = r#"
    id, student_id, quiz_date, level, total_diamonds, completed, created_at, updated_at
"#;

const QUESTION_COLUMNS: &str = r#"
    id, quiz_date, level, question, options, correct_answer, explanation, created_at
"#;

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_answers(&self, progress_id: i64) -> Result<Vec<AnswerAttempt>, AppError> {
        let answers = sqlx::query_as::<_, AnswerAttempt>(
            r#"
            SELECT question_id, attempts, earned_diamonds, is_correct
            FROM progress_answers
            WHERE progress_id = $1
            ORDER BY id
            "#,
        )
        .bind(progress_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn find_or_create_progress(
        &self,
        student_id: i64,
        quiz_date: NaiveDate,
        level: &Level,
        completed_if_created: bool,
    ) -> Result<StudentQuizProgress, AppError> {
        // Concurrent first fetches race on the unique triple; the loser's insert is a no-op.
        sqlx::query(
            r#"
            INSERT INTO student_quiz_progress (student_id, quiz_date, level, completed)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, quiz_date, level) DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(quiz_date)
        .bind(level.as_str())
        .bind(completed_if_created)
        .execute(&self.pool)
        .await?;

        let mut progress = sqlx::query_as::<_, StudentQuizProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM student_quiz_progress
             WHERE student_id = $1 AND quiz_date = $2 AND level = $3"
        ))
        .bind(student_id)
        .bind(quiz_date)
        .bind(level.as_str())
        .fetch_one(&self.pool)
        .await?;

        progress.answers = self.load_answers(progress.id).await?;
        Ok(progress)
    }

    async fn load_progress(&self, progress_id: i64) -> Result<StudentQuizProgress, AppError> {
        let mut progress = sqlx::query_as::<_, StudentQuizProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM student_quiz_progress WHERE id = $1"
        ))
        .bind(progress_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(format!("Progress record {} vanished", progress_id))
        })?;

        progress.answers = self.load_answers(progress.id).await?;
        Ok(progress)
    }

    async fn ensure_answer_entry(
        &self,
        progress_id: i64,
        question_id: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO progress_answers (progress_id, question_id)
            VALUES ($1, $2)
            ON CONFLICT (progress_id, question_id) DO NOTHING
            "#,
        )
        .bind(progress_id)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn increment_attempts(
        &self,
        progress_id: i64,
        question_id: i64,
    ) -> Result<i32, AppError> {
        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE progress_answers
            SET attempts = attempts + 1
            WHERE progress_id = $1 AND question_id = $2
            RETURNING attempts
            "#,
        )
        .bind(progress_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError(format!(
                "Answer entry for question {} missing in progress {}",
                question_id, progress_id
            ))
        })?;

        Ok(attempts)
    }

    async fn mark_correct(
        &self,
        progress_id: i64,
        question_id: i64,
        earned_diamonds: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE progress_answers
            SET is_correct = TRUE, earned_diamonds = $3
            WHERE progress_id = $1 AND question_id = $2
            "#,
        )
        .bind(progress_id)
        .bind(question_id)
        .bind(earned_diamonds)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_progress_summary(
        &self,
        progress_id: i64,
        total_diamonds: i64,
        completed: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE student_quiz_progress
            SET total_diamonds = $2, completed = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            "#,
        )
        .bind(progress_id)
        .bind(total_diamonds)
        .bind(completed)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn student_total(&self, student_id: i64) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(total_diamonds), 0)::BIGINT
            FROM student_quiz_progress
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn level_totals(&self, student_id: i64) -> Result<Vec<LevelTotal>, AppError> {
        let totals = sqlx::query_as::<_, LevelTotal>(
            r#"
            SELECT level, COALESCE(SUM(total_diamonds), 0)::BIGINT AS total
            FROM student_quiz_progress
            WHERE student_id = $1
            GROUP BY level
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn student_totals(&self) -> Result<Vec<StudentTotal>, AppError> {
        let totals = sqlx::query_as::<_, StudentTotal>(
            r#"
            SELECT
                p.student_id,
                COALESCE(MAX(u.name), 'Unknown') AS name,
                COALESCE(SUM(p.total_diamonds), 0)::BIGINT AS score
            FROM student_quiz_progress p
            LEFT JOIN users u ON u.id = p.student_id
            GROUP BY p.student_id
            ORDER BY p.student_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn list_bucket(
        &self,
        quiz_date: NaiveDate,
        level: &Level,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let questions = sqlx::query_as::<_, QuizQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM quiz_questions
             WHERE quiz_date = $1 AND level = $2
             ORDER BY id"
        ))
        .bind(quiz_date)
        .bind(level.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn bucket_question_ids(
        &self,
        quiz_date: NaiveDate,
        level: &Level,
    ) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM quiz_questions WHERE quiz_date = $1 AND level = $2 ORDER BY id",
        )
        .bind(quiz_date)
        .bind(level.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn find_question(&self, id: i64) -> Result<Option<QuizQuestion>, AppError> {
        let question = sqlx::query_as::<_, QuizQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    async fn create_question(&self, question: NewQuestion) -> Result<QuizQuestion, AppError> {
        let created = sqlx::query_as::<_, QuizQuestion>(&format!(
            "INSERT INTO quiz_questions
                (quiz_date, level, question, options, correct_answer, explanation)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(question.quiz_date)
        .bind(&question.level)
        .bind(&question.question)
        .bind(Json(&question.options))
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update_question(
        &self,
        id: i64,
        question: NewQuestion,
    ) -> Result<Option<QuizQuestion>, AppError> {
        let updated = sqlx::query_as::<_, QuizQuestion>(&format!(
            "UPDATE quiz_questions
             SET quiz_date = $2, level = $3, question = $4, options = $5,
                 correct_answer = $6, explanation = $7
             WHERE id = $1
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(question.quiz_date)
        .bind(&question.level)
        .bind(&question.question)
        .bind(Json(&question.options))
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, name, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, name, password, role, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Username '{}' already exists", user.username))
            }
            _ => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, name, password, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, name, password, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
