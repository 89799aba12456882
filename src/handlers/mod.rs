// src/handlers/mod.rs

pub mod auth;
pub mod leaderboard;
pub mod questions;
pub mod student_quiz;
