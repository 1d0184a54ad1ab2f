//! Error taxonomy for the what-if engine.
//!
//! Configuration problems are fatal at construction time; input problems are
//! reported to the caller of the failing operation. Nothing here is retriable:
//! the engine performs no I/O, so every failure is deterministic.

use thiserror::Error;

use crate::model::Stage;

/// Malformed or missing scoring configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A subject's scoring table has no rows at all.
    #[error("scoring map for '{subject}' is empty")]
    EmptyScoringMap { subject: String },

    /// The same raw score appears twice in one subject's table.
    #[error("scoring map for '{subject}' lists raw score {raw} more than once")]
    DuplicateRawScore { subject: String, raw: u32 },

    /// The adaptive threshold is not a fraction in [0, 1].
    #[error("adaptive threshold must be in [0, 1], got {0}")]
    ThresholdOutOfRange(f64),
}

/// Invalid attempt data or an invalid request against it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The attempt has no sections.
    #[error("attempt contains no sections")]
    EmptyAttempt,

    /// Two sections were supplied for the same subject.
    #[error("subject '{0}' appears more than once in the attempt")]
    DuplicateSubject(String),

    /// The requested subject is not part of the attempt.
    #[error("subject '{0}' is not present in the attempt")]
    UnknownSubject(String),

    /// The scoring table has no entry for a subject.
    #[error("no scoring map for subject '{0}'")]
    MissingScoringMap(String),

    /// A question index past the end of a stage.
    #[error("{stage} index {index} out of range for '{subject}' ({len} items)")]
    IndexOutOfRange {
        subject: String,
        stage: Stage,
        index: usize,
        len: usize,
    },

    /// A subject key disagrees with the subject recorded on its contents.
    #[error("subject mismatch: expected '{key}', found '{subject}'")]
    SubjectMismatch { key: String, subject: String },

    /// A question was filed under a stage other than its own tag.
    #[error("question '{question_id}' is not tagged {expected}")]
    StageMismatch { question_id: String, expected: Stage },

    /// A stage-1 question carries an adaptive tier label.
    #[error("stage1 question '{question_id}' carries a tier label")]
    TierLabelOnStageOne { question_id: String },
}

/// Any failure surfaced by the engine API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WhatIfError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl WhatIfError {
    /// Returns `true` if the failure stems from configuration rather than input.
    pub fn is_config(&self) -> bool {
        matches!(self, WhatIfError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = InputError::IndexOutOfRange {
            subject: "Math".into(),
            stage: Stage::Two,
            index: 7,
            len: 3,
        };
        assert_eq!(err.to_string(), "stage2 index 7 out of range for 'Math' (3 items)");

        let err = ConfigError::ThresholdOutOfRange(1.5);
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn umbrella_classifies_source() {
        let err: WhatIfError = ConfigError::EmptyScoringMap {
            subject: "Math".into(),
        }
        .into();
        assert!(err.is_config());

        let err: WhatIfError = InputError::EmptyAttempt.into();
        assert!(!err.is_config());
        assert_eq!(err.to_string(), "attempt contains no sections");
    }
}
