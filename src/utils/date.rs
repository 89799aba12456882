// src/utils/date.rs

use chrono::NaiveDate;

use crate::error::AppError;

/// Parses a quiz bucket date in `YYYY-MM-DD` form.
pub fn parse_quiz_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}
