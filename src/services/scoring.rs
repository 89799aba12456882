// src/services/scoring.rs

use crate::models::level::Level;

/// Diamonds per attempt for each recognized level. Index 0 is the first attempt;
/// the last column applies to every attempt after the third.
const BEGINNER_REWARDS: [i32; 4] = [10, 5, 3, 0];
const INTERMEDIATE_REWARDS: [i32; 4] = [20, 15, 10, 5];
const ADVANCED_REWARDS: [i32; 4] = [30, 25, 20, 10];

/// Only a first-attempt correct answer scores on an unrecognized level.
const UNRECOGNIZED_FIRST_ATTEMPT_REWARD: i32 = 10;

/// Diamonds earned by an answer.
///
/// `attempt` is the 1-based number of attempts made on the question so far,
/// including the current one. Wrong answers never score.
pub fn reward(level: &Level, attempt: i32, is_correct: bool) -> i32 {
    if !is_correct || attempt < 1 {
        return 0;
    }

    let table = match level {
        Level::Beginner => &BEGINNER_REWARDS,
        Level::Intermediate => &INTERMEDIATE_REWARDS,
        Level::Advanced => &ADVANCED_REWARDS,
        Level::Unrecognized(_) => {
            return if attempt == 1 {
                UNRECOGNIZED_FIRST_ATTEMPT_REWARD
            } else {
                0
            };
        }
    };

    let index = (attempt as usize - 1).min(table.len() - 1);
    table[index]
}
