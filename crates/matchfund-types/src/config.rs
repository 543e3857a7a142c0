//! Configuration for the matching engine.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Tunables for the optimistic allocation protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// How many times the adapter may retry compensation after a decrement
    /// drives a balance negative, before giving up with a terminal lock.
    pub max_compensation_attempts: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_compensation_attempts: constants::DEFAULT_MAX_COMPENSATION_ATTEMPTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cap_is_six() {
        let cfg = MatchingConfig::default();
        assert_eq!(cfg.max_compensation_attempts, 6);
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = MatchingConfig {
            max_compensation_attempts: 3,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: MatchingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_compensation_attempts, 3);
    }
}
