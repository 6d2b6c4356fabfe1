//! Error types for the mining engine.

use thiserror::Error;

/// Errors raised by the transaction builder, lattice miner and rule generator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MiningError {
    /// A threshold or option is outside its accepted range.
    #[error("invalid {name} '{value}': {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// No order with at least two distinct items survived transaction building.
    #[error("no transactions with at least two distinct items (out of {orders} orders)")]
    EmptyInput { orders: usize },

    /// The run was cancelled before the given level was started.
    #[error("mining cancelled before level {level}")]
    Cancelled { level: usize },
}

impl MiningError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MiningError::invalid("min_support", 1.5, "must be in (0, 1]");
        assert_eq!(err.to_string(), "invalid min_support '1.5': must be in (0, 1]");

        let err = MiningError::EmptyInput { orders: 3 };
        assert!(err.to_string().contains("3 orders"));
    }
}
