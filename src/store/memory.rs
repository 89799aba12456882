// src/store/memory.rs

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;

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

type ProgressKey = (i64, NaiveDate, String);

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    questions: BTreeMap<i64, QuizQuestion>,
    progress: BTreeMap<i64, StudentQuizProgress>,
    progress_index: HashMap<ProgressKey, i64>,
    next_user_id: i64,
    next_question_id: i64,
    next_progress_id: i64,
}

impl Tables {
    fn progress_mut(&mut self, progress_id: i64) -> Result<&mut StudentQuizProgress, AppError> {
        self.progress.get_mut(&progress_id).ok_or_else(|| {
            AppError::InternalServerError(format!("Progress record {} vanished", progress_id))
        })
    }

    fn answer_mut(
        &mut self,
        progress_id: i64,
        question_id: i64,
    ) -> Result<&mut AnswerAttempt, AppError> {
        self.progress_mut(progress_id)?
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "Answer entry for question {} missing in progress {}",
                    question_id, progress_id
                ))
            })
    }
}

/// Process-local store. Every operation runs inside one critical section,
/// so the attempts increment is atomic like its Postgres counterpart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|e| AppError::InternalServerError(format!("Store lock poisoned: {}", e)))
    }
}

fn in_bucket(question: &QuizQuestion, quiz_date: NaiveDate, level: &Level) -> bool {
    question.quiz_date == quiz_date && question.level == level.as_str()
}

fn build_question(id: i64, question: NewQuestion) -> QuizQuestion {
    QuizQuestion {
        id,
        quiz_date: question.quiz_date,
        level: question.level,
        question: question.question,
        options: Json(question.options),
        correct_answer: question.correct_answer,
        explanation: question.explanation,
        created_at: Some(Utc::now()),
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn find_or_create_progress(
        &self,
        student_id: i64,
        quiz_date: NaiveDate,
        level: &Level,
        completed_if_created: bool,
    ) -> Result<StudentQuizProgress, AppError> {
        let mut tables = self.lock()?;
        let key = (student_id, quiz_date, level.as_str().to_string());

        if let Some(id) = tables.progress_index.get(&key).copied() {
            return Ok(tables.progress_mut(id)?.clone());
        }

        tables.next_progress_id += 1;
        let id = tables.next_progress_id;
        let now = Utc::now();
        let progress = StudentQuizProgress {
            id,
            student_id,
            quiz_date,
            level: level.as_str().to_string(),
            answers: Vec::new(),
            total_diamonds: 0,
            completed: completed_if_created,
            created_at: Some(now),
            updated_at: Some(now),
        };
        tables.progress.insert(id, progress.clone());
        tables.progress_index.insert(key, id);

        Ok(progress)
    }

    async fn load_progress(&self, progress_id: i64) -> Result<StudentQuizProgress, AppError> {
        let mut tables = self.lock()?;
        Ok(tables.progress_mut(progress_id)?.clone())
    }

    async fn ensure_answer_entry(
        &self,
        progress_id: i64,
        question_id: i64,
    ) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let progress = tables.progress_mut(progress_id)?;
        if progress.answer(question_id).is_none() {
            progress.answers.push(AnswerAttempt::new(question_id));
        }
        Ok(())
    }

    async fn increment_attempts(
        &self,
        progress_id: i64,
        question_id: i64,
    ) -> Result<i32, AppError> {
        let mut tables = self.lock()?;
        let answer = tables.answer_mut(progress_id, question_id)?;
        answer.attempts += 1;
        Ok(answer.attempts)
    }

    async fn mark_correct(
        &self,
        progress_id: i64,
        question_id: i64,
        earned_diamonds: i32,
    ) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let answer = tables.answer_mut(progress_id, question_id)?;
        answer.is_correct = true;
        answer.earned_diamonds = earned_diamonds;
        Ok(())
    }

    async fn save_progress_summary(
        &self,
        progress_id: i64,
        total_diamonds: i64,
        completed: bool,
    ) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let progress = tables.progress_mut(progress_id)?;
        progress.total_diamonds = total_diamonds;
        progress.completed = completed;
        progress.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn student_total(&self, student_id: i64) -> Result<i64, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .progress
            .values()
            .filter(|p| p.student_id == student_id)
            .map(|p| p.total_diamonds)
            .sum())
    }

    async fn level_totals(&self, student_id: i64) -> Result<Vec<LevelTotal>, AppError> {
        let tables = self.lock()?;
        let mut by_level: BTreeMap<String, i64> = BTreeMap::new();
        for progress in tables.progress.values().filter(|p| p.student_id == student_id) {
            *by_level.entry(progress.level.clone()).or_default() += progress.total_diamonds;
        }
        Ok(by_level
            .into_iter()
            .map(|(level, total)| LevelTotal { level, total })
            .collect())
    }

    async fn student_totals(&self) -> Result<Vec<StudentTotal>, AppError> {
        let tables = self.lock()?;
        let mut scores: BTreeMap<i64, i64> = BTreeMap::new();
        for progress in tables.progress.values() {
            *scores.entry(progress.student_id).or_default() += progress.total_diamonds;
        }
        Ok(scores
            .into_iter()
            .map(|(student_id, score)| StudentTotal {
                student_id,
                name: tables
                    .users
                    .get(&student_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                score,
            })
            .collect())
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn list_bucket(
        &self,
        quiz_date: NaiveDate,
        level: &Level,
    ) -> Result<Vec<QuizQuestion>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .questions
            .values()
            .filter(|q| in_bucket(q, quiz_date, level))
            .cloned()
            .collect())
    }

    async fn bucket_question_ids(
        &self,
        quiz_date: NaiveDate,
        level: &Level,
    ) -> Result<Vec<i64>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .questions
            .values()
            .filter(|q| in_bucket(q, quiz_date, level))
            .map(|q| q.id)
            .collect())
    }

    async fn find_question(&self, id: i64) -> Result<Option<QuizQuestion>, AppError> {
        let tables = self.lock()?;
        Ok(tables.questions.get(&id).cloned())
    }

    async fn create_question(&self, question: NewQuestion) -> Result<QuizQuestion, AppError> {
        let mut tables = self.lock()?;
        tables.next_question_id += 1;
        let id = tables.next_question_id;
        let created = build_question(id, question);
        tables.questions.insert(id, created.clone());
        Ok(created)
    }

    async fn update_question(
        &self,
        id: i64,
        question: NewQuestion,
    ) -> Result<Option<QuizQuestion>, AppError> {
        let mut tables = self.lock()?;
        let Some(existing) = tables.questions.get_mut(&id) else {
            return Ok(None);
        };
        let created_at = existing.created_at;
        *existing = QuizQuestion {
            created_at,
            ..build_question(id, question)
        };
        Ok(Some(existing.clone()))
    }

    async fn delete_question(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.lock()?;
        Ok(tables.questions.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        tables.next_user_id += 1;
        let created = User {
            id: tables.next_user_id,
            username: user.username,
            name: user.name,
            password: user.password_hash,
            role: user.role,
            created_at: Some(Utc::now()),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let tables = self.lock()?;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[tokio::test]
    async fn progress_is_unique_per_triple() {
        let store = MemoryStore::new();
        let a = store
            .find_or_create_progress(1, date(), &Level::Beginner, false)
            .await
            .unwrap();
        let b = store
            .find_or_create_progress(1, date(), &Level::Beginner, true)
            .await
            .unwrap();
        let c = store
            .find_or_create_progress(1, date(), &Level::Advanced, false)
            .await
            .unwrap();

        assert_eq!(a.id, b.id);
        // The creation flag only applies to the first insert.
        assert!(!b.completed);
        assert_ne!(a.id, c.id);
    }

    #[tokio::test]
    async fn answer_entries_keep_insertion_order() {
        let store = MemoryStore::new();
        let p = store
            .find_or_create_progress(1, date(), &Level::Beginner, false)
            .await
            .unwrap();
        for q in [30, 10, 20, 10] {
            store.ensure_answer_entry(p.id, q).await.unwrap();
        }
        let loaded = store.load_progress(p.id).await.unwrap();
        let ids: Vec<i64> = loaded.answers.iter().map(|a| a.question_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn increment_without_entry_fails() {
        let store = MemoryStore::new();
        let p = store
            .find_or_create_progress(1, date(), &Level::Beginner, false)
            .await
            .unwrap();
        assert!(store.increment_attempts(p.id, 99).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            username: "ada".to_string(),
            name: "Ada".to_string(),
            password_hash: "hash".to_string(),
            role: "student".to_string(),
        };
        store.create_user(new_user.clone()).await.unwrap();
        let err = store.create_user(new_user).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
