// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Labelwerk.

use thiserror::Error;

/// Top-level error type for all Labelwerk operations.
#[derive(Debug, Error)]
pub enum LabelwerkError {
    // -- Configuration defects (fatal) --
    #[error("driver registry misconfigured: {keywords} keywords but {models} model strings")]
    RegistryMismatch { keywords: usize, models: usize },

    #[error("driver keyword registered twice: {0}")]
    DuplicateDriver(String),

    #[error("unknown media keyword: {0}")]
    UnknownMedia(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -- Runtime --
    #[error("printer state lock poisoned")]
    LockPoisoned,

    #[error("device error: {0}")]
    Device(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LabelwerkError {
    /// Whether this error marks a broken driver table or configuration rather
    /// than a runtime condition.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::RegistryMismatch { .. }
                | Self::DuplicateDriver(_)
                | Self::UnknownMedia(_)
                | Self::Config(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LabelwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_and_registry_errors_are_configuration_defects() {
        assert!(LabelwerkError::UnknownMedia("bogus".into()).is_configuration_defect());
        assert!(
            LabelwerkError::RegistryMismatch {
                keywords: 2,
                models: 1
            }
            .is_configuration_defect()
        );
        assert!(!LabelwerkError::LockPoisoned.is_configuration_defect());
        assert!(!LabelwerkError::Device("closed".into()).is_configuration_defect());
    }

    #[test]
    fn mismatch_message_names_both_counts() {
        let err = LabelwerkError::RegistryMismatch {
            keywords: 25,
            models: 24,
        };
        assert_eq!(
            err.to_string(),
            "driver registry misconfigured: 25 keywords but 24 model strings"
        );
    }
}
