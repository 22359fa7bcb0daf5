// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Explicit credential resolution for non-sample runs.
//!
//! The credential is resolved once by the orchestrator from the primary
//! slot with a secondary fallback, then threaded by parameter into every
//! collaborator that talks to the network. It is never written back into
//! ambient process state, so concurrent invocations cannot observe each
//! other's tokens.

use crate::error::Error;

/// Resolved API credential handed to fetch and passthrough collaborators.
#[derive(Clone, PartialEq, Eq,)]
pub struct Credentials
{
    token: String,
}

impl Credentials
{
    /// Returns the bearer token value.
    pub fn token(&self,) -> &str
    {
        &self.token
    }
}

impl std::fmt::Debug for Credentials
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Credentials",).field("token", &"<redacted>",).finish()
    }
}

/// Resolves a credential from the primary slot, falling back to the
/// secondary slot.
///
/// Values that are empty after trimming count as unset.
///
/// # Errors
///
/// Returns [`Error::MissingCredential`](Error::MissingCredential) when
/// neither slot holds a usable value.
pub fn resolve(primary: Option<&str,>, fallback: Option<&str,>,) -> Result<Credentials, Error,>
{
    usable(primary,)
        .or_else(|| usable(fallback,),)
        .map(|token| Credentials {
            token: token.to_owned(),
        },)
        .ok_or(Error::MissingCredential,)
}

fn usable(slot: Option<&str,>,) -> Option<&str,>
{
    slot.map(str::trim,).filter(|value| !value.is_empty(),)
}

/// Enforces the credential precondition for a run.
///
/// Sample runs never touch the network and resolve no credential; every
/// other run must resolve one before any pipeline starts.
///
/// # Errors
///
/// Returns [`Error::MissingCredential`](Error::MissingCredential) for a
/// non-sample run with no usable slot.
pub fn ensure(
    sample_mode: bool,
    primary: Option<&str,>,
    fallback: Option<&str,>,
) -> Result<Option<Credentials,>, Error,>
{
    if sample_mode {
        return Ok(None,);
    }
    resolve(primary, fallback,).map(Some,)
}

#[cfg(test)]
mod tests
{
    use super::{ensure, resolve};
    use crate::error::Error;

    #[test]
    fn primary_slot_wins_over_fallback()
    {
        let credentials =
            resolve(Some("ghp_primary",), Some("ghp_fallback",),).expect("expected credential",);
        assert_eq!(credentials.token(), "ghp_primary");
    }

    #[test]
    fn fallback_slot_is_used_when_primary_is_unset()
    {
        let credentials = resolve(None, Some("ghp_fallback",),).expect("expected credential",);
        assert_eq!(credentials.token(), "ghp_fallback");
    }

    #[test]
    fn whitespace_only_slots_count_as_unset()
    {
        let error = resolve(Some("   ",), None,).expect_err("expected missing credential",);
        assert!(matches!(error, Error::MissingCredential));

        let credentials =
            resolve(Some("   ",), Some("ghp_fallback",),).expect("expected fallback credential",);
        assert_eq!(credentials.token(), "ghp_fallback");
    }

    #[test]
    fn resolved_tokens_are_trimmed()
    {
        let credentials = resolve(Some("  ghp_token  ",), None,).expect("expected credential",);
        assert_eq!(credentials.token(), "ghp_token");
    }

    #[test]
    fn sample_runs_resolve_no_credential()
    {
        let resolved = ensure(true, None, None,).expect("expected sample run to pass",);
        assert!(resolved.is_none());
    }

    #[test]
    fn non_sample_runs_require_a_slot()
    {
        let error = ensure(false, None, None,).expect_err("expected missing credential",);
        assert!(matches!(error, Error::MissingCredential));
    }

    #[test]
    fn debug_output_redacts_the_token()
    {
        let credentials = resolve(Some("ghp_secret",), None,).expect("expected credential",);
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("redacted"));
    }
}
