// src/handlers/leaderboard.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::leaderboard::LeaderboardParams,
    services::leaderboard,
    store::DynStore,
    utils::jwt::Claims,
};

/// Paginated leaderboard. With `focus=true` the page holding the caller is returned.
pub async fn get_leaderboard(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    // A caller without a numeric identity simply has no rank.
    let requester_id = claims.student_id().unwrap_or(0);

    let view = leaderboard::get_leaderboard(store.as_ref(), requester_id, &params).await?;

    Ok(Json(view))
}

/// Per-level diamonds and global rank of one student.
pub async fn get_summary(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let summary = leaderboard::get_student_summary(store.as_ref(), id).await?;

    Ok(Json(summary))
}
