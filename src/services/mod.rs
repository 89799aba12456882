// src/services/mod.rs

pub mod leaderboard;
pub mod progress;
pub mod scoring;
