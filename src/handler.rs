// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Passthrough request handling.
//!
//! In passthrough mode a card's query mapping is forwarded verbatim and
//! the handler's output is used as the document body without inspection.
//! The local default interprets the query the way the hosted card
//! endpoints would: `username` names the subject and every other pair is
//! a string option override.

use std::future::Future;

use crate::{
    credentials::Credentials,
    error::Error,
    fetch::DataSource,
    options::{CardKind, LanguagesFetchOptions, StatsFetchOptions, normalize_query},
    query::{IDENTITY_KEY, QueryMap},
    render::CardRenderer
};

/// Collaborator that accepts a raw query and produces a finished document.
pub trait RequestHandler {
    /// Handles a verbatim query mapping for the given card kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the query cannot be served; the caller
    /// propagates the failure unmodified.
    fn handle(
        &self,
        kind: CardKind,
        query: &QueryMap,
        credentials: &Credentials
    ) -> impl Future<Output = Result<String, Error>>;
}

/// Default handler that performs fetch and render itself.
#[derive(Debug, Clone)]
pub struct LocalRequestHandler<D, R> {
    source:   D,
    renderer: R
}

impl<D, R> LocalRequestHandler<D, R> {
    /// Creates a handler around the given fetch and render collaborators.
    pub fn new(source: D, renderer: R) -> Self {
        Self {
            source,
            renderer
        }
    }
}

impl<D, R> RequestHandler for LocalRequestHandler<D, R>
where
    D: DataSource,
    R: CardRenderer
{
    async fn handle(
        &self,
        kind: CardKind,
        query: &QueryMap,
        credentials: &Credentials
    ) -> Result<String, Error> {
        let username = query
            .get(IDENTITY_KEY)
            .map(String::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::validation(format!("{kind} passthrough query is missing the username key"))
            })?;

        let options = normalize_query(kind, query)?;

        match kind {
            CardKind::Stats => {
                let fetch_options = StatsFetchOptions::from_options(&options);
                let payload =
                    self.source.fetch_stats(credentials, username, &fetch_options).await?;
                self.renderer.render_stats(&payload, &options)
            }
            CardKind::TopLanguages => {
                let fetch_options = LanguagesFetchOptions::from_options(&options);
                let payload = self
                    .source
                    .fetch_top_languages(credentials, username, &fetch_options)
                    .await?;
                self.renderer.render_top_languages(&payload, &options)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use masterror::AppError;

    use super::{LocalRequestHandler, RequestHandler};
    use crate::{
        credentials,
        error::Error,
        fetch::{DataSource, LanguagesPayload, StatsPayload},
        options::{CardKind, LanguagesFetchOptions, StatsFetchOptions},
        query::QueryMap,
        render::SvgRenderer,
        sample
    };

    struct StubSource;

    impl DataSource for StubSource {
        async fn fetch_stats(
            &self,
            _credentials: &credentials::Credentials,
            username: &str,
            _options: &StatsFetchOptions
        ) -> Result<StatsPayload, AppError> {
            Ok(sample::stats_payload(username))
        }

        async fn fetch_top_languages(
            &self,
            _credentials: &credentials::Credentials,
            _username: &str,
            _options: &LanguagesFetchOptions
        ) -> Result<LanguagesPayload, AppError> {
            Ok(sample::top_languages_payload())
        }
    }

    fn handler() -> LocalRequestHandler<StubSource, SvgRenderer> {
        LocalRequestHandler::new(StubSource, SvgRenderer::new())
    }

    fn token() -> credentials::Credentials {
        credentials::resolve(Some("ghp_test"), None).expect("expected credential")
    }

    #[tokio::test]
    async fn serves_a_stats_query_with_overrides() {
        let mut query = QueryMap::new();
        query.insert("username".to_owned(), "octocat".to_owned());
        query.insert("theme".to_owned(), "dark".to_owned());

        let body = handler()
            .handle(CardKind::Stats, &query, &token())
            .await
            .expect("expected document body");
        assert!(body.contains("octocat's GitHub Stats"));
        assert!(body.contains("#151515"));
    }

    #[tokio::test]
    async fn serves_a_top_languages_query() {
        let mut query = QueryMap::new();
        query.insert("username".to_owned(), "octocat".to_owned());
        query.insert("langs_count".to_owned(), "2".to_owned());

        let body = handler()
            .handle(CardKind::TopLanguages, &query, &token())
            .await
            .expect("expected document body");
        assert!(body.contains("Most Used Languages"));
        assert!(!body.contains("Python"));
    }

    #[tokio::test]
    async fn rejects_queries_without_an_identity() {
        let mut query = QueryMap::new();
        query.insert("theme".to_owned(), "dark".to_owned());

        let error = handler()
            .handle(CardKind::Stats, &query, &token())
            .await
            .expect_err("expected missing username failure");
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn propagates_option_coercion_failures() {
        let mut query = QueryMap::new();
        query.insert("username".to_owned(), "octocat".to_owned());
        query.insert("langs_count".to_owned(), "lots".to_owned());

        let error = handler()
            .handle(CardKind::TopLanguages, &query, &token())
            .await
            .expect_err("expected coercion failure");
        assert!(matches!(error, Error::Validation { .. }));
    }
}
