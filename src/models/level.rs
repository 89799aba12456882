// src/models/level.rs

use std::fmt;

use serde::{Serialize, Serializer};

/// Longest level name accepted, matching the `level` column width.
pub const MAX_LEVEL_LEN: usize = 50;

/// Difficulty level of a quiz bucket.
///
/// Clients send free-form level names ("Beginner", "intermediate-1", ...).
/// They are matched once, case-insensitively, against the known prefixes
/// `begin`, `inter` and `advance`; anything else is kept verbatim (trimmed,
/// lower-cased) as `Unrecognized` so it still forms a stable bucket key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
    Unrecognized(String),
}

impl Level {
    /// Parses a client-supplied level name.
    ///
    /// Returns `None` for a blank name or one longer than `MAX_LEVEL_LEN` characters.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized.chars().count() > MAX_LEVEL_LEN {
            return None;
        }

        let level = if normalized.contains("begin") {
            Level::Beginner
        } else if normalized.contains("inter") {
            Level::Intermediate
        } else if normalized.contains("advance") {
            Level::Advanced
        } else {
            Level::Unrecognized(normalized)
        };
        Some(level)
    }

    /// Canonical bucket key stored alongside questions and progress records.
    pub fn as_str(&self) -> &str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::Unrecognized(raw) => raw,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
