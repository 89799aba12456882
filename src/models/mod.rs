// src/models/mod.rs

pub mod leaderboard;
pub mod level;
pub mod progress;
pub mod question;
pub mod user;
