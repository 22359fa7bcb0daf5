//! Orchestration library for generating GitHub account cards.
//!
//! The library resolves heterogeneous configuration inputs (explicit
//! parameters, environment fallbacks, JSON option blobs, query strings and
//! URLs) into two fully-determined per-card execution plans, selects a
//! data-acquisition mode per card, and sequences fetch, render, and write
//! with fail-fast validation. External collaborators (data sources,
//! renderers, request handlers) sit behind narrow traits so callers can
//! swap the shipped GitHub-backed defaults for their own.

mod credentials;
mod error;
mod fetch;
mod handler;
mod options;
mod orchestrator;
mod paths;
mod pipeline;
mod query;
mod rank;
mod render;
mod retry;
mod sample;

pub use credentials::Credentials;
pub use error::{Error, io_error};
pub use fetch::{DataSource, GithubDataSource, LanguageShare, LanguagesPayload, StatsPayload};
pub use handler::{LocalRequestHandler, RequestHandler};
pub use options::{
    CardKind, CardOptions, LanguagesFetchOptions, StatsFetchOptions, defaults, normalize,
    normalize_query, normalize_text, parse_overrides,
};
pub use orchestrator::{
    Collaborators, DEFAULT_OUTPUT_DIR, GenerateRequest, GeneratedCards, default_collaborators,
    generate,
};
pub use paths::{OutputPaths, resolve_output_paths};
pub use pipeline::{PipelineMode, select_mode};
pub use query::{IDENTITY_KEY, QueryInput, QueryMap, resolve_query};
pub use rank::{Rank, RankInput, compute_rank};
pub use render::{CardRenderer, SvgRenderer};
