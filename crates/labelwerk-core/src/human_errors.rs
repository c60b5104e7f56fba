// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for operators.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives how the front end presents it.

use crate::error::LabelwerkError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Momentary condition — retrying may help.
    Transient,
    /// The operator must change something (config file, device cable).
    ActionRequired,
    /// The driver itself is broken; only a new build fixes it.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether retrying the same operation can succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `LabelwerkError` into a `HumanError`.
pub fn humanize_error(err: &LabelwerkError) -> HumanError {
    match err {
        LabelwerkError::RegistryMismatch { .. } | LabelwerkError::DuplicateDriver(_) => {
            HumanError {
                message: "The built-in printer list is damaged.".into(),
                suggestion: format!("Reinstall Labelwerk or report this problem. ({err})"),
                retriable: false,
                severity: Severity::Permanent,
            }
        }

        LabelwerkError::UnknownMedia(keyword) => HumanError {
            message: "This printer driver lists a label size we don't recognise.".into(),
            suggestion: format!(
                "Choose a different printer model, or report the size \"{keyword}\" as a driver bug."
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        LabelwerkError::Config(detail) => HumanError {
            message: "The settings file has a problem.".into(),
            suggestion: format!("Check the settings file and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::LockPoisoned => HumanError {
            message: "The printer stopped responding inside Labelwerk.".into(),
            suggestion: "Restart Labelwerk.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::Device(detail) => HumanError {
            message: "We couldn't talk to the printer.".into(),
            suggestion: format!("Check that the printer is plugged in and turned on. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        LabelwerkError::Io(e) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the file exists and you have permission to use it. ({e})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        LabelwerkError::Serialization(e) => HumanError {
            message: "The settings file isn't valid.".into(),
            suggestion: format!("Fix or delete the settings file. ({e})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
