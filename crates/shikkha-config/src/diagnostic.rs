// SPDX-FileCopyrightText: 2026 Shikkha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics.
//!
//! Wraps Figment deserialization failures and post-deserialization
//! validation findings into miette diagnostics for consistent terminal
//! rendering.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error suitable for miette rendering.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ConfigError {
    /// A Figment-level failure: bad TOML, unknown key, type mismatch.
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(shikkha::config::invalid),
        help("check shikkha.toml and SHIKKHA_* environment variables")
    )]
    Figment { message: String },

    /// A semantic validation failure on an otherwise well-formed config.
    #[error("{message}")]
    #[diagnostic(code(shikkha::config::validation))]
    Validation { message: String },
}

/// Convert a Figment error (which may aggregate several failures) into
/// one `ConfigError` per underlying failure.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Figment {
            message: e.to_string(),
        })
        .collect()
}

/// Render all collected errors to stderr via miette.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        let report = miette::Report::new(error.clone());
        eprintln!("{report:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figment_errors_are_collected() {
        let err = figment::Error::from("boom".to_string());
        let collected = figment_to_config_errors(err);
        assert_eq!(collected.len(), 1);
        assert!(collected[0].to_string().contains("boom"));
    }

    #[test]
    fn validation_error_displays_message_verbatim() {
        let e = ConfigError::Validation {
            message: "gateway.country_code must be digits".into(),
        };
        assert_eq!(e.to_string(), "gateway.country_code must be digits");
    }
}
