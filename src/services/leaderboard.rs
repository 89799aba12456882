// src/services/leaderboard.rs

//! Global ranking built from per-student diamond totals.
//!
//! Nothing is cached; every request re-aggregates the progress records.

use crate::{
    config::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PODIUM_SIZE},
    error::AppError,
    models::{
        leaderboard::{
            LeaderboardEntry, LeaderboardParams, LeaderboardResponse, LevelBreakdown,
            LevelTotal, StudentTotal, SummaryResponse,
        },
        level::Level,
    },
    store::{ProgressStore, Store, UserStore},
};

/// A student's place in the ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedStudent {
    pub rank: usize,
    pub student_id: i64,
    pub name: String,
    pub score: i64,
}

impl RankedStudent {
    fn entry_for(&self, requester_id: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: self.rank,
            student_id: self.student_id,
            name: self.name.clone(),
            score: self.score,
            is_you: self.student_id == requester_id,
        }
    }
}

/// Orders totals by descending score and numbers them 1..=N.
///
/// The sort is stable, so equal scores keep their aggregation order and
/// still receive distinct consecutive ranks.
pub fn rank_students(mut totals: Vec<StudentTotal>) -> Vec<RankedStudent> {
    totals.sort_by(|a, b| b.score.cmp(&a.score));
    totals
        .into_iter()
        .enumerate()
        .map(|(i, t)| RankedStudent {
            rank: i + 1,
            student_id: t.student_id,
            name: t.name,
            score: t.score,
        })
        .collect()
}

/// Builds one leaderboard view over an already ranked list.
pub fn build_leaderboard(
    ranked: &[RankedStudent],
    requester_id: i64,
    params: &LeaderboardParams,
) -> LeaderboardResponse {
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    if ranked.is_empty() {
        return LeaderboardResponse {
            top3: Vec::new(),
            page: 1,
            per_page,
            total_count: 0,
            user_rank: None,
            page_list: Vec::new(),
        };
    }

    let total_count = ranked.len();
    let user_rank = ranked
        .iter()
        .find(|r| r.student_id == requester_id)
        .map(|r| r.rank);

    let page = match (params.focus.unwrap_or(false), user_rank) {
        (true, Some(rank)) => (rank as i64 - 1) / per_page + 1,
        _ => {
            let total_pages = (total_count as i64 + per_page - 1) / per_page;
            params.page.unwrap_or(1).clamp(1, total_pages)
        }
    };

    let start = ((page - 1) * per_page) as usize;
    let end = (start + per_page as usize).min(total_count);

    LeaderboardResponse {
        top3: ranked
            .iter()
            .take(PODIUM_SIZE)
            .map(|r| r.entry_for(requester_id))
            .collect(),
        page,
        per_page,
        total_count,
        user_rank,
        page_list: ranked[start..end]
            .iter()
            .map(|r| r.entry_for(requester_id))
            .collect(),
    }
}

/// Folds stored per-level totals into the three recognized levels.
/// Totals of unrecognized levels are dropped.
pub fn level_breakdown(totals: &[LevelTotal]) -> LevelBreakdown {
    let mut breakdown = LevelBreakdown::default();
    for t in totals {
        match Level::parse(&t.level) {
            Some(Level::Beginner) => breakdown.beginner += t.total,
            Some(Level::Intermediate) => breakdown.intermediate += t.total,
            Some(Level::Advanced) => breakdown.advanced += t.total,
            Some(Level::Unrecognized(_)) | None => {}
        }
    }
    breakdown
}

pub async fn get_leaderboard(
    store: &dyn Store,
    requester_id: i64,
    params: &LeaderboardParams,
) -> Result<LeaderboardResponse, AppError> {
    let ranked = rank_students(store.student_totals().await?);
    Ok(build_leaderboard(&ranked, requester_id, params))
}

pub async fn get_student_summary(
    store: &dyn Store,
    student_id: i64,
) -> Result<SummaryResponse, AppError> {
    let student = store
        .find_user(student_id)
        .await?
        .ok_or(AppError::NotFound("Student not found".to_string()))?;

    let levels = level_breakdown(&store.level_totals(student_id).await?);
    let rank = rank_students(store.student_totals().await?)
        .iter()
        .find(|r| r.student_id == student_id)
        .map(|r| r.rank);

    Ok(SummaryResponse {
        student: student.into(),
        overall: levels.overall(),
        levels,
        rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(scores: &[i64]) -> Vec<StudentTotal> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| StudentTotal {
                student_id: i as i64 + 1,
                name: format!("student{}", i + 1),
                score,
            })
            .collect()
    }

    fn params(page: Option<i64>, per_page: Option<i64>, focus: bool) -> LeaderboardParams {
        LeaderboardParams {
            page,
            per_page,
            focus: Some(focus),
        }
    }

    #[test]
    fn ranks_are_dense_and_descending() {
        let ranked = rank_students(totals(&[5, 40, 0, 40, 12]));
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);

        let scores: Vec<i64> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![40, 40, 12, 5, 0]);

        // Ties keep aggregation order.
        assert_eq!(ranked[0].student_id, 2);
        assert_eq!(ranked[1].student_id, 4);
    }

    #[test]
    fn empty_leaderboard_has_explicit_empty_state() {
        let view = build_leaderboard(&[], 1, &params(Some(4), None, true));
        assert!(view.top3.is_empty());
        assert!(view.page_list.is_empty());
        assert_eq!(view.page, 1);
        assert_eq!(view.total_count, 0);
        assert_eq!(view.user_rank, None);
    }

    #[test]
    fn top3_ignores_page_and_focus() {
        let ranked = rank_students(totals(&[1, 2, 3, 4, 5, 6, 7]));
        let view = build_leaderboard(&ranked, 1, &params(Some(3), Some(2), false));

        let podium: Vec<i64> = view.top3.iter().map(|e| e.score).collect();
        assert_eq!(podium, vec![7, 6, 5]);
        assert_eq!(view.page, 3);
        let page: Vec<usize> = view.page_list.iter().map(|e| e.rank).collect();
        assert_eq!(page, vec![5, 6]);
    }

    #[test]
    fn page_is_clamped_to_existing_pages() {
        let ranked = rank_students(totals(&[1, 2, 3, 4, 5]));

        let high = build_leaderboard(&ranked, 99, &params(Some(50), Some(2), false));
        assert_eq!(high.page, 3);
        assert_eq!(high.page_list.len(), 1);

        let low = build_leaderboard(&ranked, 99, &params(Some(-4), Some(2), false));
        assert_eq!(low.page, 1);
        assert_eq!(low.page_list.len(), 2);
    }

    #[test]
    fn focus_jumps_to_requester_page() {
        let scores: Vec<i64> = (0..25).rev().collect();
        let ranked = rank_students(totals(&scores));

        for requester in 1..=25i64 {
            for per_page in [1, 3, 10, 25] {
                let view = build_leaderboard(&ranked, requester, &params(Some(1), Some(per_page), true));
                let rank = view.user_rank.unwrap() as i64;
                assert_eq!(view.page, (rank - 1) / per_page + 1);
                let mine: Vec<&LeaderboardEntry> =
                    view.page_list.iter().filter(|e| e.is_you).collect();
                assert_eq!(mine.len(), 1);
                assert_eq!(mine[0].student_id, requester);
            }
        }
    }

    #[test]
    fn focus_without_rank_falls_back_to_requested_page() {
        let ranked = rank_students(totals(&[1, 2, 3]));
        let view = build_leaderboard(&ranked, 404, &params(Some(2), Some(2), true));
        assert_eq!(view.page, 2);
        assert_eq!(view.user_rank, None);
        assert!(view.page_list.iter().all(|e| !e.is_you));
    }

    #[test]
    fn per_page_is_bounded() {
        let ranked = rank_students(totals(&[1, 2, 3]));
        let view = build_leaderboard(&ranked, 1, &params(None, Some(0), false));
        assert_eq!(view.per_page, 1);
        let view = build_leaderboard(&ranked, 1, &params(None, Some(10_000), false));
        assert_eq!(view.per_page, MAX_PER_PAGE);
        let view = build_leaderboard(&ranked, 1, &LeaderboardParams::default());
        assert_eq!(view.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn breakdown_drops_unrecognized_levels() {
        let stored = vec![
            LevelTotal { level: "beginner".to_string(), total: 13 },
            LevelTotal { level: "intermediate".to_string(), total: 20 },
            LevelTotal { level: "advanced".to_string(), total: 55 },
            LevelTotal { level: "expert".to_string(), total: 10 },
        ];
        let breakdown = level_breakdown(&stored);
        assert_eq!(
            breakdown,
            LevelBreakdown { beginner: 13, intermediate: 20, advanced: 55 }
        );
        assert_eq!(breakdown.overall(), 88);
    }
}
