// src/handlers/student_quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::{
    error::AppError,
    extractors::AppJson,
    models::{
        level::{Level, MAX_LEVEL_LEN},
        progress::{
            AnswerResponse, BlockedResponse, BucketResponse, SubmitAnswerRequest, TotalResponse,
        },
    },
    services::progress::{self, AnswerSubmission, SubmitOutcome},
    store::{DynStore, ProgressStore},
    utils::{date::parse_quiz_date, jwt::Claims},
};

fn parse_level(raw: &str) -> Result<Level, AppError> {
    Level::parse(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "level must be between 1 and {} characters",
            MAX_LEVEL_LEN
        ))
    })
}

/// Total diamonds the current student has earned across every bucket.
pub async fn get_total(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.student_id()?;
    let total = store.student_total(student_id).await?;

    Ok(Json(TotalResponse { total }))
}

/// Questions of one (date, level) bucket together with the student's progress on it.
///
/// The progress record is created on first visit.
pub async fn get_bucket(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path((date, level)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.student_id()?;
    let quiz_date = parse_quiz_date(&date)?;
    let level = parse_level(&level)?;

    let (questions, progress) =
        progress::open_bucket(store.as_ref(), student_id, quiz_date, &level).await?;

    Ok(Json(BucketResponse {
        questions,
        progress,
    }))
}

/// Records one answer attempt.
///
/// * Rejects incomplete payloads with 400 before touching any state.
/// * Answers `{ blocked: true }` once the bucket is completed.
pub async fn submit_answer(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<SubmitAnswerRequest>,
) -> Result<Response, AppError> {
    let student_id = claims.student_id()?;

    req.validate()?;

    let SubmitAnswerRequest {
        question_id: Some(question_id),
        date: Some(date),
        level: Some(level),
        is_correct: Some(is_correct),
    } = req
    else {
        return Err(AppError::BadRequest(
            "questionId, date, level and isCorrect are required".to_string(),
        ));
    };

    let submission = AnswerSubmission {
        student_id,
        quiz_date: parse_quiz_date(&date)?,
        level: parse_level(&level)?,
        question_id,
        is_correct,
    };

    let response = match progress::submit_answer(store.as_ref(), submission).await? {
        SubmitOutcome::Blocked => Json(BlockedResponse {
            blocked: true,
            message: "Quiz already completed".to_string(),
        })
        .into_response(),
        SubmitOutcome::Recorded(receipt) => Json(AnswerResponse {
            success: true,
            attempts: receipt.attempts,
            earned_diamonds: receipt.earned_diamonds,
            total_diamonds: receipt.total_diamonds,
            completed: receipt.completed,
            answer: receipt.answer,
            progress: receipt.progress,
        })
        .into_response(),
    };

    Ok(response)
}
