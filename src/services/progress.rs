// src/services/progress.rs

//! Per-student, per-bucket progress reconciliation.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        level::Level,
        progress::{AnswerAttempt, StudentQuizProgress},
        question::QuizQuestion,
    },
    services::scoring,
    store::{ProgressStore, QuestionStore, Store},
};

/// A validated answer submission.
#[derive(Debug, Clone)]
pub struct AnswerSubmission {
    pub student_id: i64,
    pub quiz_date: NaiveDate,
    pub level: Level,
    pub question_id: i64,
    pub is_correct: bool,
}

/// State after an accepted submission.
#[derive(Debug, Clone)]
pub struct AnswerReceipt {
    pub attempts: i32,
    pub earned_diamonds: i32,
    pub total_diamonds: i64,
    pub completed: bool,
    pub answer: AnswerAttempt,
    pub progress: StudentQuizProgress,
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The bucket was already completed; nothing was written.
    Blocked,
    Recorded(AnswerReceipt),
}

/// Sum of every entry's earned diamonds.
pub fn total_diamonds(answers: &[AnswerAttempt]) -> i64 {
    answers.iter().map(|a| i64::from(a.earned_diamonds)).sum()
}

/// A bucket is completed when it has no questions or every question has a correct entry.
pub fn is_bucket_completed(bucket_question_ids: &[i64], answers: &[AnswerAttempt]) -> bool {
    let solved: HashSet<i64> = answers
        .iter()
        .filter(|a| a.is_correct)
        .map(|a| a.question_id)
        .collect();

    bucket_question_ids.iter().all(|id| solved.contains(id))
}

/// Loads a bucket's questions and the student's progress on it.
///
/// The progress record is created on first access; an empty bucket starts out completed.
pub async fn open_bucket(
    store: &dyn Store,
    student_id: i64,
    quiz_date: NaiveDate,
    level: &Level,
) -> Result<(Vec<QuizQuestion>, StudentQuizProgress), AppError> {
    let questions = store.list_bucket(quiz_date, level).await?;
    let progress = store
        .find_or_create_progress(student_id, quiz_date, level, questions.is_empty())
        .await?;

    Ok((questions, progress))
}

/// Records one answer: bumps the attempt counter, scores it, and refreshes
/// the record's total and completion flag.
///
/// The counter increment is atomic in the store. The reward write and the
/// summary save are separate steps; concurrent submissions on other questions
/// of the same bucket resolve the summary last-writer-wins.
pub async fn submit_answer(
    store: &dyn Store,
    submission: AnswerSubmission,
) -> Result<SubmitOutcome, AppError> {
    let AnswerSubmission {
        student_id,
        quiz_date,
        level,
        question_id,
        is_correct,
    } = submission;

    let progress = store
        .find_or_create_progress(student_id, quiz_date, &level, false)
        .await?;

    if progress.completed {
        tracing::info!(
            student_id,
            %quiz_date,
            %level,
            question_id,
            "Submission blocked: bucket already completed"
        );
        return Ok(SubmitOutcome::Blocked);
    }

    store.ensure_answer_entry(progress.id, question_id).await?;
    let attempts = store.increment_attempts(progress.id, question_id).await?;

    let reward = scoring::reward(&level, attempts, is_correct);
    if is_correct {
        store.mark_correct(progress.id, question_id, reward).await?;
    }

    let mut progress = store.load_progress(progress.id).await?;
    let bucket = store.bucket_question_ids(quiz_date, &level).await?;

    let total = total_diamonds(&progress.answers);
    let completed = is_bucket_completed(&bucket, &progress.answers);
    store
        .save_progress_summary(progress.id, total, completed)
        .await?;
    progress.total_diamonds = total;
    progress.completed = completed;

    let answer = progress.answer(question_id).cloned().ok_or_else(|| {
        AppError::InternalServerError(format!(
            "Answer entry for question {} missing after update",
            question_id
        ))
    })?;

    tracing::info!(
        student_id,
        %quiz_date,
        %level,
        question_id,
        attempts,
        is_correct,
        reward,
        total,
        completed,
        "Answer recorded"
    );

    Ok(SubmitOutcome::Recorded(AnswerReceipt {
        attempts,
        earned_diamonds: answer.earned_diamonds,
        total_diamonds: total,
        completed,
        answer,
        progress,
    }))
}
