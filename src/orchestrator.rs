//! Top-level coordination of a card generation run.
//!
//! The run is a linear ladder: resolve queries, resolve the identity,
//! validate the mode combination, resolve credentials, normalize options,
//! resolve output paths, ensure directories, run both card pipelines, and
//! persist the bodies. Every failure up to the pipeline runs aborts before
//! any artifact I/O. The two pipelines carry no data dependency on each
//! other and are awaited concurrently; their output files are written
//! stats-first, so a failed second write leaves the first artifact on
//! disk.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
    credentials,
    error::Error,
    fetch::{DataSource, GithubDataSource},
    handler::{LocalRequestHandler, RequestHandler},
    options::{self, CardKind, LanguagesFetchOptions, StatsFetchOptions},
    paths,
    pipeline,
    query::{self, IDENTITY_KEY, QueryInput, QueryMap},
    render::{CardRenderer, SvgRenderer},
};

/// Output directory applied when the caller supplies none.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Caller input describing one generation run.
#[derive(Debug, Clone,)]
pub struct GenerateRequest
{
    /// Explicit account identity; highest precedence.
    pub username:          Option<String,>,
    /// Directory receiving derived output paths.
    pub output_dir:        PathBuf,
    /// Explicit destination override for the stats card.
    pub stats_output:      Option<PathBuf,>,
    /// Explicit destination override for the top languages card.
    pub top_langs_output:  Option<PathBuf,>,
    /// Raw passthrough query for the stats card.
    pub stats_query:       Option<QueryInput,>,
    /// Raw passthrough query for the top languages card.
    pub top_langs_query:   Option<QueryInput,>,
    /// JSON option overrides for the stats card.
    pub stats_options:     Option<String,>,
    /// JSON option overrides for the top languages card.
    pub top_langs_options: Option<String,>,
    /// Enables sample mode: placeholder data, no network, no credential.
    pub sample:            bool,
    /// Primary credential slot value.
    pub token:             Option<String,>,
    /// Secondary credential slot value.
    pub fallback_token:    Option<String,>,
}

impl Default for GenerateRequest
{
    fn default() -> Self
    {
        Self {
            username:          None,
            output_dir:        PathBuf::from(DEFAULT_OUTPUT_DIR,),
            stats_output:      None,
            top_langs_output:  None,
            stats_query:       None,
            top_langs_query:   None,
            stats_options:     None,
            top_langs_options: None,
            sample:            false,
            token:             None,
            fallback_token:    None,
        }
    }
}

/// External collaborators a run is wired to.
#[derive(Debug, Clone,)]
pub struct Collaborators<D, R, H,>
{
    /// Data-fetching collaborator for direct-fetch mode.
    pub source:   D,
    /// Rendering collaborator for sample and direct-fetch modes.
    pub renderer: R,
    /// Request-handling collaborator for passthrough mode.
    pub handler:  H,
}

/// Builds the production collaborator set.
pub fn default_collaborators()
-> Collaborators<GithubDataSource, SvgRenderer, LocalRequestHandler<GithubDataSource, SvgRenderer,>,>
{
    Collaborators {
        source:   GithubDataSource::new(),
        renderer: SvgRenderer::new(),
        handler:  LocalRequestHandler::new(GithubDataSource::new(), SvgRenderer::new(),),
    }
}

/// Paths of the two generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct GeneratedCards
{
    /// Destination of the stats card.
    pub stats_path:     PathBuf,
    /// Destination of the top languages card.
    pub top_langs_path: PathBuf,
}

/// Generates both cards and persists them to disk.
///
/// # Errors
///
/// Returns the first fatal configuration error (identity, combination,
/// credential, options, path collision, directory creation) before any
/// artifact is written, or a propagated collaborator/write failure after
/// the pipelines start. A failure writing the second artifact leaves the
/// first one on disk.
pub async fn generate<D, R, H,>(
    request: &GenerateRequest,
    collaborators: &Collaborators<D, R, H,>,
) -> Result<GeneratedCards, Error,>
where
    D: DataSource,
    R: CardRenderer,
    H: RequestHandler,
{
    let stats_query = query::resolve_query(request.stats_query.as_ref(),);
    let top_langs_query = query::resolve_query(request.top_langs_query.as_ref(),);

    let identity = resolve_identity(
        request.username.as_deref(),
        stats_query.as_ref(),
        top_langs_query.as_ref(),
    )?;
    debug!("generating cards for {}", identity);

    ensure_mode_compatibility(request.sample, stats_query.as_ref(), top_langs_query.as_ref(),)?;

    let credentials = credentials::ensure(
        request.sample,
        request.token.as_deref(),
        request.fallback_token.as_deref(),
    )?;

    let stats_options =
        options::normalize_text(CardKind::Stats, request.stats_options.as_deref(),)?;
    let top_langs_options =
        options::normalize_text(CardKind::TopLanguages, request.top_langs_options.as_deref(),)?;

    let resolved = paths::resolve_output_paths(
        &request.output_dir,
        &identity,
        request.stats_output.as_deref(),
        request.top_langs_output.as_deref(),
    )?;
    paths::ensure_parent_dirs(&resolved,)?;

    let stats_mode = pipeline::select_mode(stats_query.as_ref(), request.sample, || {
        StatsFetchOptions::from_options(&stats_options,)
    },);
    let top_langs_mode = pipeline::select_mode(top_langs_query.as_ref(), request.sample, || {
        LanguagesFetchOptions::from_options(&top_langs_options,)
    },);
    debug!("stats mode: {}", mode_name(&stats_mode,));
    debug!("top languages mode: {}", mode_name(&top_langs_mode,));

    let (stats_body, top_langs_body,) = tokio::join!(
        pipeline::run_stats(
            stats_mode,
            &identity,
            &stats_options,
            credentials.as_ref(),
            &collaborators.source,
            &collaborators.renderer,
            &collaborators.handler,
        ),
        pipeline::run_top_languages(
            top_langs_mode,
            &identity,
            &top_langs_options,
            credentials.as_ref(),
            &collaborators.source,
            &collaborators.renderer,
            &collaborators.handler,
        ),
    );
    let stats_body = stats_body?;
    let top_langs_body = top_langs_body?;

    paths::persist_document(&resolved.stats, &stats_body,)?;
    paths::persist_document(&resolved.top_languages, &top_langs_body,)?;

    info!(
        "wrote {} and {}",
        resolved.stats.display(),
        resolved.top_languages.display()
    );

    Ok(GeneratedCards {
        stats_path:     resolved.stats,
        top_langs_path: resolved.top_languages,
    },)
}

fn mode_name<O,>(mode: &pipeline::PipelineMode<O,>,) -> &'static str
{
    match mode {
        pipeline::PipelineMode::Passthrough(_,) => "passthrough",
        pipeline::PipelineMode::Sample => "sample",
        pipeline::PipelineMode::DirectFetch(_,) => "direct-fetch",
    }
}

/// Resolves the account identity with explicit-first precedence.
fn resolve_identity(
    explicit: Option<&str,>,
    stats_query: Option<&QueryMap,>,
    top_langs_query: Option<&QueryMap,>,
) -> Result<String, Error,>
{
    if let Some(name,) = explicit.map(str::trim,).filter(|value| !value.is_empty(),) {
        return Ok(name.to_owned(),);
    }

    for query in [stats_query, top_langs_query,].into_iter().flatten() {
        if let Some(name,) = query
            .get(IDENTITY_KEY,)
            .map(String::as_str,)
            .map(str::trim,)
            .filter(|value| !value.is_empty(),)
        {
            return Ok(name.to_owned(),);
        }
    }

    Err(Error::MissingIdentity,)
}

/// Rejects sample runs that also carry a passthrough query.
fn ensure_mode_compatibility(
    sample: bool,
    stats_query: Option<&QueryMap,>,
    top_langs_query: Option<&QueryMap,>,
) -> Result<(), Error,>
{
    if !sample {
        return Ok((),);
    }
    if stats_query.is_some_and(|query| !query.is_empty(),) {
        return Err(Error::InvalidCombination {
            card: CardKind::Stats,
        },);
    }
    if top_langs_query.is_some_and(|query| !query.is_empty(),) {
        return Err(Error::InvalidCombination {
            card: CardKind::TopLanguages,
        },);
    }
    Ok((),)
}
