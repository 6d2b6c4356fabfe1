//! Mining thresholds: validation, defaults and parsing of user-supplied values.

use crate::error::MiningError;

/// Confidence used when the caller does not supply one.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Lower bound of the default minimum support.
pub const DEFAULT_SUPPORT_FLOOR: f64 = 0.01;

/// Thresholds as supplied by the caller. `None` means "use the default".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MiningParams {
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
}

/// Thresholds after defaults were applied and both values were validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub min_support: f64,
    pub min_confidence: f64,
}

impl MiningParams {
    pub fn new(min_support: Option<f64>, min_confidence: Option<f64>) -> Self {
        Self {
            min_support,
            min_confidence,
        }
    }

    /// Check explicitly supplied thresholds without resolving defaults.
    ///
    /// Lets callers reject bad input before any transaction is built.
    pub fn validate(&self) -> Result<(), MiningError> {
        if let Some(value) = self.min_support {
            validate_threshold("min_support", value)?;
        }
        if let Some(value) = self.min_confidence {
            validate_threshold("min_confidence", value)?;
        }
        Ok(())
    }

    /// Apply defaults for absent thresholds and validate present ones.
    ///
    /// An invalid explicit value is an error; it is never replaced by a default.
    pub fn resolve(&self, transaction_count: usize) -> Result<ResolvedParams, MiningError> {
        let min_support = match self.min_support {
            Some(value) => validate_threshold("min_support", value)?,
            None => default_min_support(transaction_count),
        };
        let min_confidence = match self.min_confidence {
            Some(value) => validate_threshold("min_confidence", value)?,
            None => DEFAULT_MIN_CONFIDENCE,
        };
        Ok(ResolvedParams {
            min_support,
            min_confidence,
        })
    }
}

/// `max(1 / transaction_count, 0.01)`, so a pattern seen in a single order can
/// qualify on small datasets.
pub fn default_min_support(transaction_count: usize) -> f64 {
    if transaction_count == 0 {
        return 1.0;
    }
    (1.0 / transaction_count as f64).max(DEFAULT_SUPPORT_FLOOR)
}

/// Accept a threshold in the half-open interval (0, 1].
pub fn validate_threshold(name: &'static str, value: f64) -> Result<f64, MiningError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(MiningError::invalid(name, value, "must be a number in (0, 1]"))
    }
}

/// Parse a threshold typed by a user. Blank input means "not supplied".
pub fn parse_threshold(name: &'static str, raw: &str) -> Result<Option<f64>, MiningError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| MiningError::invalid(name, trimmed, "not a number"))?;
    validate_threshold(name, value).map(Some)
}
