//! Validation of raw rating observations
//!
//! The intake payload comes from a scraped page, so `mr` may arrive as an
//! integer, a float or a numeric string. Anything else is rejected before it
//! reaches the engine.

use serde_json::Value;
use sfl_common::{Error, Result};

/// Largest accepted rating
///
/// Ratings are non-negative and bounded so that differences, sums and chart
/// padding computed from them stay far inside `i64`.
pub const MAX_RATING: i64 = i32::MAX as i64;

/// Convert a raw JSON value into a rating
///
/// Floats are rounded to the nearest integer. Null, booleans, non-numeric
/// strings and values outside `0..=MAX_RATING` are `Error::InvalidInput`.
pub fn parse_rating(value: &Value) -> Result<i64> {
    let rating = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64() {
                from_float(f)?
            } else {
                return Err(Error::InvalidInput(format!("rating out of range: {}", n)));
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<i64>() {
                Ok(i) => i,
                Err(_) => match trimmed.parse::<f64>() {
                    Ok(f) => from_float(f)?,
                    Err(_) => {
                        return Err(Error::InvalidInput(format!("rating is not numeric: {:?}", s)))
                    }
                },
            }
        }
        Value::Null => return Err(Error::InvalidInput("rating is missing".to_string())),
        other => return Err(Error::InvalidInput(format!("rating is not numeric: {}", other))),
    };

    if !(0..=MAX_RATING).contains(&rating) {
        return Err(Error::InvalidInput(format!(
            "rating out of range 0..={}: {}",
            MAX_RATING, rating
        )));
    }
    Ok(rating)
}

fn from_float(f: f64) -> Result<i64> {
    if !f.is_finite() {
        return Err(Error::InvalidInput(format!("rating is not finite: {}", f)));
    }
    let rounded = f.round();
    if rounded < 0.0 || rounded > MAX_RATING as f64 {
        return Err(Error::InvalidInput(format!("rating out of range: {}", f)));
    }
    Ok(rounded as i64)
}
