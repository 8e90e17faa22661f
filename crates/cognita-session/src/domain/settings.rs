//! Per-session tuning that content does not carry.

use cognita_core::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Arithmetic rounds per session unless configured otherwise.
pub const DEFAULT_ARITHMETIC_ROUNDS: u32 = 10;

/// Knobs applied to every session a host creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    arithmetic_rounds: u32,
    time_limit_ms: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            arithmetic_rounds: DEFAULT_ARITHMETIC_ROUNDS,
            time_limit_ms: None,
        }
    }
}

impl SessionSettings {
    /// Creates settings.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `arithmetic_rounds` is zero or `time_limit_ms` is
    /// `Some(0)`.
    pub fn new(
        arithmetic_rounds: u32,
        time_limit_ms: Option<u64>,
    ) -> Result<Self, ValidationError> {
        if arithmetic_rounds == 0 {
            return Err(ValidationError::OutOfRange {
                field: "arithmeticRounds".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if time_limit_ms == Some(0) {
            return Err(ValidationError::OutOfRange {
                field: "timeLimitMs".to_owned(),
                reason: "must be positive".to_owned(),
            });
        }
        Ok(Self {
            arithmetic_rounds,
            time_limit_ms,
        })
    }

    /// Problems generated for an arithmetic session.
    #[must_use]
    pub fn arithmetic_rounds(self) -> u32 {
        self.arithmetic_rounds
    }

    /// Wall-clock budget of the active phase, if any.
    #[must_use]
    pub fn time_limit_ms(self) -> Option<u64> {
        self.time_limit_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SessionSettings::default();

        assert_eq!(settings.arithmetic_rounds(), 10);
        assert_eq!(settings.time_limit_ms(), None);
    }

    #[test]
    fn test_new_rejects_zero_rounds_and_zero_limit() {
        assert_eq!(
            SessionSettings::new(0, None).unwrap_err().field(),
            Some("arithmeticRounds")
        );
        assert_eq!(
            SessionSettings::new(5, Some(0)).unwrap_err().field(),
            Some("timeLimitMs")
        );
        assert!(SessionSettings::new(5, Some(30_000)).is_ok());
    }
}
