// src/handlers/questions.rs

//! Quiz question management. Every route here sits behind the admin middleware.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    extractors::AppJson,
    models::{
        level::{Level, MAX_LEVEL_LEN},
        question::{CreateQuestionRequest, NewQuestion, UpdateQuestionRequest},
    },
    store::{DynStore, QuestionStore},
    utils::{
        date::parse_quiz_date,
        html::{clean_all, clean_html},
    },
};

fn bucket_level(raw: &str) -> Result<Level, AppError> {
    Level::parse(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "level must be between 1 and {} characters",
            MAX_LEVEL_LEN
        ))
    })
}

/// Creates a question in the bucket named by its date and level.
pub async fn create_question(
    State(store): State<DynStore>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let question = store
        .create_question(NewQuestion {
            quiz_date: parse_quiz_date(&payload.date)?,
            level: bucket_level(&payload.level)?.as_str().to_string(),
            question: clean_html(&payload.question),
            options: clean_all(&payload.options),
            correct_answer: clean_html(&payload.correct_answer),
            explanation: payload.explanation.as_deref().map(clean_html),
        })
        .await?;

    tracing::info!(question_id = question.id, "Quiz question created");

    Ok((StatusCode::CREATED, Json(question)))
}

/// Lists the questions of one (date, level) bucket.
pub async fn list_bucket(
    State(store): State<DynStore>,
    Path((date, level)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store
        .list_bucket(parse_quiz_date(&date)?, &bucket_level(&level)?)
        .await?;

    Ok(Json(questions))
}

pub async fn get_question(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = store
        .find_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Updates the given fields of a question. Moving it to another bucket is allowed.
pub async fn update_question(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = store
        .find_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let merged = NewQuestion {
        quiz_date: match payload.date {
            Some(date) => parse_quiz_date(&date)?,
            None => existing.quiz_date,
        },
        level: match payload.level {
            Some(level) => bucket_level(&level)?.as_str().to_string(),
            None => existing.level,
        },
        question: payload
            .question
            .as_deref()
            .map(clean_html)
            .unwrap_or(existing.question),
        options: payload
            .options
            .as_deref()
            .map(clean_all)
            .unwrap_or(existing.options.0),
        correct_answer: payload
            .correct_answer
            .as_deref()
            .map(clean_html)
            .unwrap_or(existing.correct_answer),
        explanation: match payload.explanation {
            Some(explanation) => Some(clean_html(&explanation)),
            None => existing.explanation,
        },
    };

    let updated = store
        .update_question(id, merged)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_question(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_question(id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!(question_id = id, "Quiz question deleted");

    Ok(StatusCode::NO_CONTENT)
}
