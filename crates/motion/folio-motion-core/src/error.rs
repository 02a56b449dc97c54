//! Error types for the motion core.
//!
//! Presentation work has almost no failure modes; these cover host mistakes
//! (bad config, unknown handles) and storage that refuses a write.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    Threshold { name: &'static str, value: f32 },

    #[error("{name} must be a finite, non-negative number, got {value}")]
    Duration { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum MotionError {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("unknown element handle '{handle}'")]
    UnknownHandle { handle: String },

    #[error("element handle '{handle}' is already observed as {role}")]
    DuplicateHandle { handle: String, role: &'static str },
}

/// A preference write the host store rejected (quota, private mode, ...).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("preference store rejected '{key}': {reason}")]
pub struct StoreError {
    pub key: String,
    pub reason: String,
}
