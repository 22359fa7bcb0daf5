//! Command-line interface for the stat-cards binary.
//!
//! The CLI is a thin wrapper: it maps flags and environment fallbacks onto
//! a [`GenerateRequest`], wires the production collaborators, and turns a
//! propagated failure into a non-zero exit with a readable message.

use std::{env, path::PathBuf, process};

use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use stat_cards::{
    DEFAULT_OUTPUT_DIR, Error, GenerateRequest, QueryInput, default_collaborators, generate,
};
use tracing_subscriber::EnvFilter;

/// Command line options for generating both account cards.
#[derive(Debug, Parser,)]
#[command(name = "stat-cards", version, about = "Render GitHub stats and top language cards")]
struct Cli
{
    /// GitHub account the cards are generated for.
    #[arg(long, env = "GITHUB_USERNAME", value_name = "LOGIN")]
    username: Option<String,>,

    /// Directory receiving derived output files.
    #[arg(
        long = "output-dir",
        env = "OUTPUT_DIR",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR
    )]
    output_dir: PathBuf,

    /// Explicit destination for the stats card.
    #[arg(long = "stats-output", value_name = "PATH")]
    stats_output: Option<PathBuf,>,

    /// Explicit destination for the top languages card.
    #[arg(long = "top-langs-output", value_name = "PATH")]
    top_langs_output: Option<PathBuf,>,

    /// Passthrough query string or URL for the stats card.
    #[arg(long = "stats-query", env = "STATS_QUERY", value_name = "QUERY")]
    stats_query: Option<String,>,

    /// Passthrough query string or URL for the top languages card.
    #[arg(long = "top-langs-query", env = "TOP_LANGS_QUERY", value_name = "QUERY")]
    top_langs_query: Option<String,>,

    /// JSON object of option overrides for the stats card.
    #[arg(long = "stats-options", env = "STATS_OPTIONS", value_name = "JSON")]
    stats_options: Option<String,>,

    /// JSON object of option overrides for the top languages card.
    #[arg(long = "top-langs-options", env = "TOP_LANGS_OPTIONS", value_name = "JSON")]
    top_langs_options: Option<String,>,

    /// Generate sample cards without any network access.
    #[arg(long = "dry-run", env = "DRY_RUN", action = ArgAction::SetTrue)]
    dry_run: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    if let Err(error,) = run().await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates errors originating from input resolution, the card
/// pipelines, and artifact persistence.
async fn run() -> Result<(), Error,>
{
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env(),).init();

    let cli = Cli::parse();
    let request = request_from_cli(cli,);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}",)
            .expect("valid template",),
    );
    spinner.set_message("generating cards...",);

    let result = generate(&request, &default_collaborators(),).await;
    spinner.finish_and_clear();

    let cards = result?;
    println!("{}", cards.stats_path.display());
    println!("{}", cards.top_langs_path.display());

    Ok((),)
}

fn request_from_cli(cli: Cli,) -> GenerateRequest
{
    GenerateRequest {
        username:          cli.username,
        output_dir:        cli.output_dir,
        stats_output:      cli.stats_output,
        top_langs_output:  cli.top_langs_output,
        stats_query:       cli.stats_query.map(QueryInput::Text,),
        top_langs_query:   cli.top_langs_query.map(QueryInput::Text,),
        stats_options:     cli.stats_options,
        top_langs_options: cli.top_langs_options,
        sample:            cli.dry_run,
        token:             env::var("GITHUB_TOKEN",).ok(),
        fallback_token:    env::var("PAT_1",).ok(),
    }
}

#[cfg(test)]
mod tests
{
    use std::path::Path;

    use clap::Parser;

    use super::{Cli, request_from_cli};

    #[test]
    fn cli_defaults_to_the_generated_directory()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"),],).expect("failed to parse CLI",);

        assert!(cli.username.is_none());
        assert_eq!(cli.output_dir, Path::new("generated"));
        assert!(!cli.dry_run);
    }

    #[test]
    fn cli_accepts_all_documented_flags()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--username",
            "octocat",
            "--output-dir",
            "cards",
            "--stats-output",
            "stats.svg",
            "--top-langs-output",
            "langs.svg",
            "--stats-query",
            "username=octocat",
            "--top-langs-query",
            "?username=octocat",
            "--stats-options",
            "{\"theme\":\"dark\"}",
            "--top-langs-options",
            "{\"langs_count\":3}",
            "--dry-run",
        ],)
        .expect("failed to parse CLI",);

        assert_eq!(cli.username.as_deref(), Some("octocat"));
        assert_eq!(cli.output_dir, Path::new("cards"));
        assert_eq!(cli.stats_output.as_deref(), Some(Path::new("stats.svg")));
        assert_eq!(cli.top_langs_output.as_deref(), Some(Path::new("langs.svg")));
        assert!(cli.dry_run);
    }

    #[test]
    fn request_mapping_preserves_query_text()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--stats-query",
            "username=octocat&theme=dark",
            "--dry-run",
        ],)
        .expect("failed to parse CLI",);

        let request = request_from_cli(cli,);
        assert!(request.sample);
        match request.stats_query {
            Some(stat_cards::QueryInput::Text(ref raw,),) => {
                assert_eq!(raw, "username=octocat&theme=dark");
            }
            ref other => panic!("expected text query input, got {other:?}"),
        }
        assert!(request.top_langs_query.is_none());
    }

    #[test]
    fn help_flag_short_circuits_parsing()
    {
        let error = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "--help",],)
            .expect_err("expected help short-circuit",);
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
