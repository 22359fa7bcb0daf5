#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the card generator."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

use crate::options::CardKind;

/// Unified error type returned by the orchestration core and CLI.
///
/// Every fatal precondition of a generation run maps to its own variant so
/// callers can distinguish configuration mistakes from collaborator
/// failures. Instances are typically constructed through the helper
/// functions or by converting from [`masterror::AppError`] at the
/// collaborator seam.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// No account identity was resolvable from parameters or queries.
    #[error("no account identity given: pass --username or embed username= in a query")]
    MissingIdentity,
    /// A non-sample run found neither credential slot usable.
    #[error("no credential available: set GITHUB_TOKEN or PAT_1")]
    MissingCredential,
    /// Sample mode was combined with a passthrough query.
    #[error("sample mode cannot be combined with the {card} passthrough query")]
    InvalidCombination {
        /// Card whose query conflicted with sample mode.
        card: CardKind
    },
    /// Both cards resolved to the same destination path.
    #[error("both cards resolve to the same output path {path:?}")]
    PathCollision {
        /// The colliding destination.
        path: PathBuf
    },
    /// A JSON options blob could not be decoded.
    #[error("failed to parse {card} options: {source}")]
    OptionParse {
        /// Card whose options blob was malformed.
        card:   CardKind,
        /// Underlying decoding error.
        source: serde_json::Error
    },
    /// An option value or other input violated invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// A fetch, render, or passthrough collaborator failed.
    #[error("collaborator failure: {message}")]
    Collaborator {
        /// Human readable message propagated from the collaborator.
        message: String
    },
    /// Wraps I/O errors raised while persisting card artifacts.
    #[error("failed to write card artifact at {path:?}: {source}")]
    Io {
        /// Location of the artifact being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a collaborator error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the collaborator failure.
    pub fn collaborator<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Collaborator {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Collaborator {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the artifact that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::options::CardKind;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::validation("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/card.svg");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn app_error_conversion_maps_to_collaborator_variant() {
        let app_error = masterror::AppError::service("upstream exploded");
        let mapped: Error = app_error.into();
        match mapped {
            Error::Collaborator {
                ref message
            } => {
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected collaborator error, got {other:?}")
        }
    }

    #[test]
    fn invalid_combination_names_the_card() {
        let error = Error::InvalidCombination {
            card: CardKind::Stats
        };
        assert!(error.to_string().contains("stats"));
    }

    #[test]
    fn option_parse_wraps_decoding_source() {
        let source = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let error = Error::OptionParse {
            card: CardKind::TopLanguages,
            source
        };
        assert!(error.to_string().contains("top-langs"));
    }
}
