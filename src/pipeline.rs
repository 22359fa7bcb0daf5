//! Per-card acquisition pipelines.
//!
//! Each card run selects exactly one acquisition mode up front and matches
//! on it exhaustively, so the passthrough/sample/direct-fetch decision
//! lives in one place. Passthrough wins over everything when a non-empty
//! query is present; sample wins over direct fetch. Collaborator failures
//! propagate unmodified.

use crate::{
    credentials::Credentials,
    error::Error,
    fetch::DataSource,
    handler::RequestHandler,
    options::{CardKind, CardOptions, LanguagesFetchOptions, StatsFetchOptions},
    query::QueryMap,
    render::CardRenderer,
    sample,
};

/// Acquisition mode for a single card run.
#[derive(Debug, Clone, PartialEq,)]
pub enum PipelineMode<O,>
{
    /// Forward the query verbatim to the request handler.
    Passthrough(QueryMap,),
    /// Substitute deterministic placeholder data, no network access.
    Sample,
    /// Call the fetch collaborator with locally derived options.
    DirectFetch(O,),
}

/// Selects the acquisition mode for one card.
///
/// The derivation closure runs only when direct fetch is actually
/// selected, so passthrough runs never compute fetch options.
pub fn select_mode<O,>(
    query: Option<&QueryMap,>,
    sample_mode: bool,
    fetch_options: impl FnOnce() -> O,
) -> PipelineMode<O,>
{
    match query {
        Some(map,) if !map.is_empty() => PipelineMode::Passthrough(map.clone(),),
        _ if sample_mode => PipelineMode::Sample,
        _ => PipelineMode::DirectFetch(fetch_options(),),
    }
}

/// Runs the stats pipeline and yields the document body.
///
/// # Errors
///
/// Propagates collaborator failures unmodified and reports
/// [`Error::MissingCredential`](Error::MissingCredential) when a
/// network-bound mode was selected without a resolved credential.
pub async fn run_stats<D, R, H,>(
    mode: PipelineMode<StatsFetchOptions,>,
    username: &str,
    options: &CardOptions,
    credentials: Option<&Credentials,>,
    source: &D,
    renderer: &R,
    handler: &H,
) -> Result<String, Error,>
where
    D: DataSource,
    R: CardRenderer,
    H: RequestHandler,
{
    match mode {
        PipelineMode::Passthrough(query,) => {
            let credentials = credentials.ok_or(Error::MissingCredential,)?;
            handler.handle(CardKind::Stats, &query, credentials,).await
        }
        PipelineMode::Sample => {
            renderer.render_stats(&sample::stats_payload(username,), options,)
        }
        PipelineMode::DirectFetch(fetch_options,) => {
            let credentials = credentials.ok_or(Error::MissingCredential,)?;
            let payload = source.fetch_stats(credentials, username, &fetch_options,).await?;
            renderer.render_stats(&payload, options,)
        }
    }
}

/// Runs the top languages pipeline and yields the document body.
///
/// # Errors
///
/// Same contract as [`run_stats`].
pub async fn run_top_languages<D, R, H,>(
    mode: PipelineMode<LanguagesFetchOptions,>,
    username: &str,
    options: &CardOptions,
    credentials: Option<&Credentials,>,
    source: &D,
    renderer: &R,
    handler: &H,
) -> Result<String, Error,>
where
    D: DataSource,
    R: CardRenderer,
    H: RequestHandler,
{
    match mode {
        PipelineMode::Passthrough(query,) => {
            let credentials = credentials.ok_or(Error::MissingCredential,)?;
            handler.handle(CardKind::TopLanguages, &query, credentials,).await
        }
        PipelineMode::Sample => {
            renderer.render_top_languages(&sample::top_languages_payload(), options,)
        }
        PipelineMode::DirectFetch(fetch_options,) => {
            let credentials = credentials.ok_or(Error::MissingCredential,)?;
            let payload =
                source.fetch_top_languages(credentials, username, &fetch_options,).await?;
            renderer.render_top_languages(&payload, options,)
        }
    }
}
