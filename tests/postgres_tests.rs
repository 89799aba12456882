// tests/postgres_tests.rs

//! Exercises `PgStore` against a real database.
//! Every test returns early when DATABASE_URL is not set.

use chrono::NaiveDate;
use daily_quiz::{
    models::{level::Level, question::NewQuestion, user::NewUser},
    services::leaderboard::{level_breakdown, rank_students},
    services::progress::{AnswerSubmission, SubmitOutcome, submit_answer},
    store::{PgStore, ProgressStore, QuestionStore, UserStore},
};
use sqlx::postgres::PgPoolOptions;

async fn connect() -> Option<PgStore> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(PgStore::new(pool))
}

async fn new_student(store: &PgStore) -> i64 {
    store
        .create_user(NewUser {
            username: format!("pg_{}", &uuid::Uuid::new_v4().to_string()[..8]),
            name: "Pg Student".to_string(),
            password_hash: "unused".to_string(),
            role: "student".to_string(),
        })
        .await
        .unwrap()
        .id
}

/// A level name no other test run shares, so buckets start empty.
fn fresh_level() -> Level {
    Level::Unrecognized(format!("lvl_{}", &uuid::Uuid::new_v4().to_string()[..8]))
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

#[tokio::test]
async fn pg_attempt_counter_is_atomic() {
    let Some(store) = connect().await else {
        return;
    };
    let student_id = new_student(&store).await;
    let level = fresh_level();
    let question = store
        .create_question(NewQuestion {
            quiz_date: date(),
            level: level.as_str().to_string(),
            question: "Q".to_string(),
            options: vec!["A".to_string()],
            correct_answer: "A".to_string(),
            explanation: None,
        })
        .await
        .unwrap();

    let progress = store
        .find_or_create_progress(student_id, date(), &level, false)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        let progress_id = progress.id;
        let question_id = question.id;
        handles.push(tokio::spawn(async move {
            store.ensure_answer_entry(progress_id, question_id).await.unwrap();
            store.increment_attempts(progress_id, question_id).await.unwrap()
        }));
    }

    let mut seen = Vec::new();
    for handle in handles {
        seen.push(handle.await.unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, (1..=10).collect::<Vec<i32>>());
}

#[tokio::test]
async fn pg_submission_flow_blocks_after_completion() {
    let Some(store) = connect().await else {
        return;
    };
    let student_id = new_student(&store).await;
    let level = fresh_level();
    let question = store
        .create_question(NewQuestion {
            quiz_date: date(),
            level: level.as_str().to_string(),
            question: "Q".to_string(),
            options: vec!["A".to_string()],
            correct_answer: "A".to_string(),
            explanation: None,
        })
        .await
        .unwrap();

    let submit = |is_correct| AnswerSubmission {
        student_id,
        quiz_date: date(),
        level: level.clone(),
        question_id: question.id,
        is_correct,
    };

    let outcome = submit_answer(&store, submit(true)).await.unwrap();
    let SubmitOutcome::Recorded(receipt) = outcome else {
        panic!("first submission should be recorded");
    };
    assert_eq!(receipt.attempts, 1);
    assert_eq!(receipt.total_diamonds, 10);
    assert!(receipt.completed);

    let outcome = submit_answer(&store, submit(true)).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Blocked));

    assert_eq!(store.student_total(student_id).await.unwrap(), 10);
    let totals = store.student_totals().await.unwrap();
    let mine = totals.iter().find(|t| t.student_id == student_id).unwrap();
    assert_eq!(mine.score, 10);
    assert_eq!(mine.name, "Pg Student");
}

#[tokio::test]
async fn pg_aggregates_totals_per_student_and_level() {
    let Some(store) = connect().await else {
        return;
    };
    let student_id = new_student(&store).await;
    // No user row; progress owners are not foreign keys.
    let ghost_id = i64::from(i32::MAX) + (uuid::Uuid::new_v4().as_u128() % 1_000_000_000) as i64;

    let beginner = store
        .find_or_create_progress(student_id, date(), &Level::Beginner, false)
        .await
        .unwrap();
    store.save_progress_summary(beginner.id, 13, true).await.unwrap();

    let advanced = store
        .find_or_create_progress(student_id, date(), &Level::Advanced, false)
        .await
        .unwrap();
    store.save_progress_summary(advanced.id, 55, false).await.unwrap();

    let other_day = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let later = store
        .find_or_create_progress(student_id, other_day, &Level::Beginner, false)
        .await
        .unwrap();
    store.save_progress_summary(later.id, 7, false).await.unwrap();

    let odd = fresh_level();
    let unranked = store
        .find_or_create_progress(student_id, date(), &odd, false)
        .await
        .unwrap();
    store.save_progress_summary(unranked.id, 4, false).await.unwrap();

    let ghost = store
        .find_or_create_progress(ghost_id, date(), &Level::Beginner, false)
        .await
        .unwrap();
    store.save_progress_summary(ghost.id, 1_000_000, false).await.unwrap();

    let levels = store.level_totals(student_id).await.unwrap();
    assert_eq!(levels.len(), 3);
    let breakdown = level_breakdown(&levels);
    assert_eq!(breakdown.beginner, 20);
    assert_eq!(breakdown.intermediate, 0);
    assert_eq!(breakdown.advanced, 55);
    assert_eq!(breakdown.overall(), 75);

    let totals = store.student_totals().await.unwrap();
    let ids: Vec<i64> = totals.iter().map(|t| t.student_id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    let mine = totals.iter().find(|t| t.student_id == student_id).unwrap();
    assert_eq!(mine.name, "Pg Student");
    assert_eq!(mine.score, 79);
    let theirs = totals.iter().find(|t| t.student_id == ghost_id).unwrap();
    assert_eq!(theirs.name, "Unknown");
    assert_eq!(theirs.score, 1_000_000);

    let ranked = rank_students(totals);
    let ghost_rank = ranked.iter().find(|r| r.student_id == ghost_id).unwrap().rank;
    let my_rank = ranked.iter().find(|r| r.student_id == student_id).unwrap().rank;
    assert!(ghost_rank < my_rank);
}

#[tokio::test]
async fn pg_overlong_level_never_reaches_storage() {
    let Some(store) = connect().await else {
        return;
    };
    let student_id = new_student(&store).await;

    assert!(Level::parse(&"x".repeat(60)).is_none());

    let widest = Level::parse(&"y".repeat(50)).unwrap();
    let outcome = submit_answer(
        &store,
        AnswerSubmission {
            student_id,
            quiz_date: date(),
            level: widest,
            question_id: 1,
            is_correct: false,
        },
    )
    .await
    .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Recorded(_)));
}
