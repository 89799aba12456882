// src/models/leaderboard.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::StudentProfile;

/// Aggregated diamonds of one student across every progress record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StudentTotal {
    pub student_id: i64,
    pub name: String,
    pub score: i64,
}

/// Per-level diamonds of one student, keyed by the stored level string.
#[derive(Debug, Clone, FromRow)]
pub struct LevelTotal {
    pub level: String,
    pub total: i64,
}

/// A ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student_id: i64,
    pub name: String,
    pub score: i64,
    pub is_you: bool,
}

/// Query parameters of `GET /leaderboard`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub focus: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub top3: Vec<LeaderboardEntry>,
    pub page: i64,
    pub per_page: i64,
    pub total_count: usize,
    pub user_rank: Option<usize>,
    pub page_list: Vec<LeaderboardEntry>,
}

/// Diamonds per recognized level.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LevelBreakdown {
    pub beginner: i64,
    pub intermediate: i64,
    pub advanced: i64,
}

impl LevelBreakdown {
    pub fn overall(&self) -> i64 {
        self.beginner + self.intermediate + self.advanced
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub student: StudentProfile,
    pub levels: LevelBreakdown,
    pub overall: i64,
    pub rank: Option<usize>,
}
