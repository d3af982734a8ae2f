//! Configuration errors
//!
//! Runtime events never fail: stale clicks and out-of-state calls are
//! no-ops. Only malformed options are reported, and only when they are
//! supplied (construction, `update_options`, JSON parsing).

use thiserror::Error;

/// A rejected game or rest-break configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_lives must be at least 1, got {0}")]
    NonPositiveLives(i32),

    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },

    #[error("{name} must be a finite, non-negative fraction, got {value}")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("spawn weight for {kind} must be finite and non-negative, got {value}")]
    InvalidWeight { kind: &'static str, value: f64 },

    #[error("spawn weights must sum to 1.0, got {sum}")]
    WeightSum { sum: f64 },

    #[error("level_up_score must be positive, got {0}")]
    ZeroLevelUpScore(i64),

    #[error("failed to parse options: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = ConfigError::ZeroDuration {
            name: "base_spawn_interval_ms",
        };
        assert_eq!(
            err.to_string(),
            "base_spawn_interval_ms must be greater than zero"
        );
        assert!(ConfigError::NonPositiveLives(0).to_string().contains("got 0"));
    }
}
