//! Typed validation of model replies.
//!
//! Model output is untrusted text. Each expected shape has an explicit
//! schema that either produces a typed value or rejects the reply; a
//! rejected reply is never "best-effort" repaired.

use thiserror::Error;

/// Errors from validating a reply.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Expected a number, got '{raw}'")]
    NotANumber { raw: String },

    #[error("Expected a whole number, got {value}")]
    NotWhole { value: f64 },

    #[error("Score {value} outside {min}..={max}")]
    OutOfRange { value: f64, min: i64, max: i64 },
}

/// A typed parser for one reply shape.
pub trait ResponseSchema: Send + Sync {
    type Output: Send;

    /// Human-readable schema name for logs.
    fn name(&self) -> &'static str;

    /// Parse and validate non-empty reply text.
    fn parse(&self, raw: &str) -> Result<Self::Output, ValidationError>;
}

/// Whole number within an inclusive range, coerced from text.
///
/// Coercion trims surrounding whitespace and reads the rest as a decimal
/// number, so `" 73 "`, `"73.0"` and `"7.3e1"` are all 73. Anything that is
/// not a finite number is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerScore {
    pub min: i64,
    pub max: i64,
}

impl IntegerScore {
    /// The 0..=100 metric score shape.
    pub const PERCENT: IntegerScore = IntegerScore { min: 0, max: 100 };
}

impl Default for IntegerScore {
    fn default() -> Self {
        Self::PERCENT
    }
}

impl ResponseSchema for IntegerScore {
    type Output = i64;

    fn name(&self) -> &'static str {
        "integer-score"
    }

    fn parse(&self, raw: &str) -> Result<i64, ValidationError> {
        let trimmed = raw.trim();
        let value: f64 = trimmed
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| ValidationError::NotANumber {
                raw: trimmed.to_string(),
            })?;

        if value.fract() != 0.0 {
            return Err(ValidationError::NotWhole { value });
        }

        if value < self.min as f64 || value > self.max as f64 {
            return Err(ValidationError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }

        Ok(value as i64)
    }
}
