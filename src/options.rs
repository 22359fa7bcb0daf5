//! Typed per-card options and the coercion rules that admit loose input.
//!
//! Callers may supply overrides as a JSON object blob or as query-string
//! values; both funnel through the same coercion table so lists may arrive
//! as arrays or comma-separated strings, numbers as numbers or numeric
//! strings, and booleans as booleans or the usual textual spellings. The
//! output is always a fully-determined [`CardOptions`] value: defaults
//! differ per card kind, overrides win key-for-key, and nothing loosely
//! typed survives past this boundary.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{error::Error, query::QueryMap};

/// Theme applied when no override is supplied.
const DEFAULT_THEME: &str = "default";
/// Layout applied to the top languages card when no override is supplied.
const DEFAULT_LAYOUT: &str = "normal";
/// Number of languages shown when no override is supplied.
const DEFAULT_LANGS_COUNT: u32 = 5;
/// Language size weight applied when the key is unset.
pub const DEFAULT_SIZE_WEIGHT: f64 = 1.0;
/// Language count weight applied when the key is unset.
pub const DEFAULT_COUNT_WEIGHT: f64 = 0.0;

const SHOW_MERGED_PRS: &str = "prs_merged";
const SHOW_DISCUSSIONS: &str = "discussions_started";
const SHOW_DISCUSSION_ANSWERS: &str = "discussions_answered";

/// The two card artifacts this tool generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum CardKind
{
    /// Account statistics card.
    Stats,
    /// Top languages card.
    TopLanguages,
}

impl CardKind
{
    /// Suffix used in derived artifact filenames.
    pub fn file_suffix(self,) -> &'static str
    {
        match self {
            Self::Stats => "stats",
            Self::TopLanguages => "top-langs",
        }
    }
}

impl std::fmt::Display for CardKind
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.write_str(self.file_suffix(),)
    }
}

/// Fully-determined options for a single card.
///
/// List fields are always present (possibly empty) and numeric fields are
/// `None` only when the key was genuinely absent, so downstream code never
/// re-parses loose representations.
#[derive(Debug, Clone, PartialEq, Serialize,)]
pub struct CardOptions
{
    /// Stat rows or languages suppressed on the card.
    pub hide:                Vec<String,>,
    /// Additional stat rows enabled on the card.
    pub show:                Vec<String,>,
    /// Repositories excluded from fetched aggregates.
    pub exclude_repo:        Vec<String,>,
    /// Suppresses the card title.
    pub hide_title:          bool,
    /// Suppresses the card border.
    pub hide_border:         bool,
    /// Suppresses the rank ring on the stats card.
    pub hide_rank:           bool,
    /// Draws icon bullets next to stat labels.
    pub show_icons:          bool,
    /// Counts commits across all years instead of the contribution window.
    pub include_all_commits: bool,
    /// Color theme name.
    pub theme:               String,
    /// Layout variant of the top languages card.
    pub layout:              String,
    /// Explicit card width in pixels.
    pub card_width:          Option<u32,>,
    /// Number of languages shown on the top languages card.
    pub langs_count:         Option<u32,>,
    /// Restricts the commit count to a single year.
    pub commits_year:        Option<i32,>,
    /// Weight applied to language byte sizes during ranking.
    pub size_weight:         Option<f64,>,
    /// Weight applied to language repository counts during ranking.
    pub count_weight:        Option<f64,>,
}

/// Returns the default option set for the given card kind.
pub fn defaults(kind: CardKind,) -> CardOptions
{
    let base = CardOptions {
        hide:                Vec::new(),
        show:                Vec::new(),
        exclude_repo:        Vec::new(),
        hide_title:          false,
        hide_border:         false,
        hide_rank:           false,
        show_icons:          false,
        include_all_commits: false,
        theme:               DEFAULT_THEME.to_owned(),
        layout:              DEFAULT_LAYOUT.to_owned(),
        card_width:          None,
        langs_count:         None,
        commits_year:        None,
        size_weight:         None,
        count_weight:        None,
    };

    match kind {
        CardKind::Stats => CardOptions {
            show_icons: true,
            ..base
        },
        CardKind::TopLanguages => CardOptions {
            langs_count: Some(DEFAULT_LANGS_COUNT,),
            ..base
        },
    }
}

/// Decodes a raw JSON options blob into an override object.
///
/// # Errors
///
/// Returns [`Error::OptionParse`](Error::OptionParse) when the text is not
/// valid JSON and [`Error::Validation`](Error::Validation) when the root is
/// not an object.
pub fn parse_overrides(kind: CardKind, raw: &str,) -> Result<Map<String, Value,>, Error,>
{
    let value: Value = serde_json::from_str(raw.trim(),).map_err(|source| Error::OptionParse {
        card: kind,
        source,
    },)?;

    match value {
        Value::Object(map,) => Ok(map,),
        _ => Err(Error::validation(format!("{kind} options must be a JSON object"),),),
    }
}

/// Merges caller overrides onto the defaults for the given card kind.
///
/// Unknown keys are ignored; `null` values leave the default in place.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when a known key holds
/// a value that cannot be coerced to its semantic type.
pub fn normalize(kind: CardKind, overrides: &Map<String, Value,>,) -> Result<CardOptions, Error,>
{
    let mut options = defaults(kind,);
    for (key, value,) in overrides {
        apply_override(&mut options, key, value,)?;
    }
    Ok(options,)
}

/// Normalizes an optional JSON blob, falling back to defaults when absent.
///
/// # Errors
///
/// Propagates [`parse_overrides`] and [`normalize`] failures.
pub fn normalize_text(kind: CardKind, raw: Option<&str,>,) -> Result<CardOptions, Error,>
{
    match raw {
        None => Ok(defaults(kind,),),
        Some(raw,) => normalize(kind, &parse_overrides(kind, raw,)?,),
    }
}

/// Normalizes query-string pairs into card options.
///
/// Every pair except the identity key is treated as a string-valued
/// override and run through the shared coercion table.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) when a known key holds
/// an un-coercible value.
pub fn normalize_query(kind: CardKind, query: &QueryMap,) -> Result<CardOptions, Error,>
{
    let mut overrides = Map::new();
    for (key, value,) in query {
        if key == crate::query::IDENTITY_KEY {
            continue;
        }
        overrides.insert(key.clone(), Value::String(value.clone(),),);
    }
    normalize(kind, &overrides,)
}

fn apply_override(options: &mut CardOptions, key: &str, value: &Value,) -> Result<(), Error,>
{
    if value.is_null() {
        return Ok((),);
    }

    match key {
        "hide" => options.hide = coerce_list(key, value,)?,
        "show" => options.show = coerce_list(key, value,)?,
        "exclude_repo" => options.exclude_repo = coerce_list(key, value,)?,
        "hide_title" => options.hide_title = coerce_bool(key, value,)?,
        "hide_border" => options.hide_border = coerce_bool(key, value,)?,
        "hide_rank" => options.hide_rank = coerce_bool(key, value,)?,
        "show_icons" => options.show_icons = coerce_bool(key, value,)?,
        "include_all_commits" => options.include_all_commits = coerce_bool(key, value,)?,
        "theme" => options.theme = coerce_string(key, value,)?,
        "layout" => options.layout = coerce_string(key, value,)?,
        "card_width" => options.card_width = Some(coerce_u32(key, value,)?,),
        "langs_count" => options.langs_count = Some(coerce_u32(key, value,)?,),
        "commits_year" => options.commits_year = Some(coerce_i32(key, value,)?,),
        "size_weight" => options.size_weight = Some(coerce_f64(key, value,)?,),
        "count_weight" => options.count_weight = Some(coerce_f64(key, value,)?,),
        unknown => debug!("ignoring unsupported option key '{unknown}'"),
    }

    Ok((),)
}

fn coerce_list(key: &str, value: &Value,) -> Result<Vec<String,>, Error,>
{
    match value {
        Value::String(raw,) => Ok(split_list(raw,),),
        Value::Array(items,) => {
            let mut list = Vec::with_capacity(items.len(),);
            for item in items {
                match item {
                    Value::String(entry,) => {
                        let trimmed = entry.trim();
                        if !trimmed.is_empty() {
                            list.push(trimmed.to_owned(),);
                        }
                    }
                    other => {
                        return Err(Error::validation(format!(
                            "{key} entries must be strings, got {other}"
                        ),),);
                    }
                }
            }
            Ok(list,)
        }
        other => Err(Error::validation(format!(
            "{key} must be a list or comma-separated string, got {other}"
        ),),),
    }
}

fn split_list(raw: &str,) -> Vec<String,>
{
    raw.split(',',).map(str::trim,).filter(|entry| !entry.is_empty(),).map(str::to_owned,).collect()
}

fn coerce_bool(key: &str, value: &Value,) -> Result<bool, Error,>
{
    match value {
        Value::Bool(flag,) => Ok(*flag,),
        Value::String(raw,) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true,),
            "" | "false" | "0" | "no" => Ok(false,),
            _ => Err(Error::validation(format!("{key} must be a boolean value"),),),
        },
        other => Err(Error::validation(format!("{key} must be a boolean value, got {other}"),),),
    }
}

fn coerce_string(key: &str, value: &Value,) -> Result<String, Error,>
{
    match value {
        Value::String(raw,) => Ok(raw.trim().to_owned(),),
        other => Err(Error::validation(format!("{key} must be a string, got {other}"),),),
    }
}

fn coerce_u32(key: &str, value: &Value,) -> Result<u32, Error,>
{
    match value {
        Value::Number(number,) => number
            .as_u64()
            .and_then(|wide| u32::try_from(wide,).ok(),)
            .ok_or_else(|| Error::validation(format!("{key} is out of range"),),),
        Value::String(raw,) => raw
            .trim()
            .parse::<u32,>()
            .map_err(|_| Error::validation(format!("{key} must be a number"),),),
        other => Err(Error::validation(format!("{key} must be a number, got {other}"),),),
    }
}

fn coerce_i32(key: &str, value: &Value,) -> Result<i32, Error,>
{
    match value {
        Value::Number(number,) => number
            .as_i64()
            .and_then(|wide| i32::try_from(wide,).ok(),)
            .ok_or_else(|| Error::validation(format!("{key} is out of range"),),),
        Value::String(raw,) => raw
            .trim()
            .parse::<i32,>()
            .map_err(|_| Error::validation(format!("{key} must be a number"),),),
        other => Err(Error::validation(format!("{key} must be a number, got {other}"),),),
    }
}

fn coerce_f64(key: &str, value: &Value,) -> Result<f64, Error,>
{
    match value {
        Value::Number(number,) => number
            .as_f64()
            .ok_or_else(|| Error::validation(format!("{key} is out of range"),),),
        Value::String(raw,) => raw
            .trim()
            .parse::<f64,>()
            .map_err(|_| Error::validation(format!("{key} must be a number"),),),
        other => Err(Error::validation(format!("{key} must be a number, got {other}"),),),
    }
}

fn listed(list: &[String], flag: &str,) -> bool
{
    list.iter().any(|entry| entry.as_str() == flag,)
}

/// Derived fetch parameters for the stats pipeline.
///
/// Never accepted from the caller directly; computed from the normalized
/// option set once the direct-fetch mode has been selected.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct StatsFetchOptions
{
    /// Counts commits across all years via the commit search total.
    pub include_all_commits:          bool,
    /// Repositories excluded from the star aggregate.
    pub exclude_repo:                 Vec<String,>,
    /// Fetches the merged pull request total.
    pub include_merged_pull_requests: bool,
    /// Fetches the started discussions total.
    pub include_discussions:          bool,
    /// Fetches the answered discussions total.
    pub include_discussions_answers:  bool,
    /// Restricts commit contributions to a single year.
    pub commits_year:                 Option<i32,>,
}

impl StatsFetchOptions
{
    /// Derives stats fetch parameters from a normalized option set.
    pub fn from_options(options: &CardOptions,) -> Self
    {
        Self {
            include_all_commits:          options.include_all_commits,
            exclude_repo:                 options.exclude_repo.clone(),
            include_merged_pull_requests: listed(&options.show, SHOW_MERGED_PRS,),
            include_discussions:          listed(&options.show, SHOW_DISCUSSIONS,),
            include_discussions_answers:  listed(&options.show, SHOW_DISCUSSION_ANSWERS,),
            commits_year:                 options.commits_year,
        }
    }
}

/// Derived fetch parameters for the top languages pipeline.
#[derive(Debug, Clone, PartialEq,)]
pub struct LanguagesFetchOptions
{
    /// Repositories excluded from language aggregation.
    pub exclude_repo: Vec<String,>,
    /// Weight applied to language byte sizes.
    pub size_weight:  f64,
    /// Weight applied to language repository counts.
    pub count_weight: f64,
}

impl LanguagesFetchOptions
{
    /// Derives language fetch parameters from a normalized option set.
    ///
    /// Unset weights fall back to size-only ranking.
    pub fn from_options(options: &CardOptions,) -> Self
    {
        Self {
            exclude_repo: options.exclude_repo.clone(),
            size_weight:  options.size_weight.unwrap_or(DEFAULT_SIZE_WEIGHT,),
            count_weight: options.count_weight.unwrap_or(DEFAULT_COUNT_WEIGHT,),
        }
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::{Map, Value, json};

    use super::{
        CardKind, LanguagesFetchOptions, StatsFetchOptions, defaults, normalize, normalize_query,
        normalize_text, parse_overrides,
    };
    use crate::{error::Error, query::QueryMap};

    fn overrides(value: Value,) -> Map<String, Value,>
    {
        match value {
            Value::Object(map,) => map,
            other => panic!("expected object literal, got {other}"),
        }
    }

    #[test]
    fn stats_defaults_enable_icons()
    {
        let options = defaults(CardKind::Stats,);
        assert!(options.show_icons);
        assert!(options.hide.is_empty());
        assert_eq!(options.theme, "default");
        assert_eq!(options.langs_count, None);
    }

    #[test]
    fn top_languages_defaults_cap_the_language_count()
    {
        let options = defaults(CardKind::TopLanguages,);
        assert!(!options.show_icons);
        assert_eq!(options.langs_count, Some(5));
        assert_eq!(options.layout, "normal");
    }

    #[test]
    fn empty_overrides_reproduce_defaults()
    {
        let normalized =
            normalize(CardKind::Stats, &Map::new(),).expect("expected normalization success",);
        assert_eq!(normalized, defaults(CardKind::Stats));
    }

    #[test]
    fn overrides_win_key_for_key()
    {
        let normalized = normalize(
            CardKind::Stats,
            &overrides(json!({"theme": "dark", "hide_border": true}),),
        )
        .expect("expected normalization success",);

        assert_eq!(normalized.theme, "dark");
        assert!(normalized.hide_border);
        assert!(normalized.show_icons);
    }

    #[test]
    fn comma_separated_lists_are_split_and_trimmed()
    {
        let normalized = normalize(
            CardKind::Stats,
            &overrides(json!({"hide": " stars, issues ,,  "}),),
        )
        .expect("expected normalization success",);

        assert_eq!(normalized.hide, ["stars", "issues"]);
    }

    #[test]
    fn array_lists_are_accepted()
    {
        let normalized = normalize(
            CardKind::TopLanguages,
            &overrides(json!({"exclude_repo": ["dotfiles", " sandbox "]}),),
        )
        .expect("expected normalization success",);

        assert_eq!(normalized.exclude_repo, ["dotfiles", "sandbox"]);
    }

    #[test]
    fn lists_reject_non_string_entries()
    {
        let error = normalize(CardKind::Stats, &overrides(json!({"hide": [1, 2]}),),)
            .expect_err("expected validation failure",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn booleans_accept_textual_spellings()
    {
        let normalized = normalize(
            CardKind::Stats,
            &overrides(json!({"hide_rank": "yes", "show_icons": "0"}),),
        )
        .expect("expected normalization success",);

        assert!(normalized.hide_rank);
        assert!(!normalized.show_icons);
    }

    #[test]
    fn booleans_reject_garbage()
    {
        let error = normalize(CardKind::Stats, &overrides(json!({"hide_rank": "maybe"}),),)
            .expect_err("expected validation failure",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn numbers_accept_numeric_strings()
    {
        let normalized = normalize(
            CardKind::TopLanguages,
            &overrides(json!({"langs_count": "8", "size_weight": "0.5"}),),
        )
        .expect("expected normalization success",);

        assert_eq!(normalized.langs_count, Some(8));
        assert_eq!(normalized.size_weight, Some(0.5));
    }

    #[test]
    fn numbers_reject_non_numeric_strings()
    {
        let error = normalize(CardKind::Stats, &overrides(json!({"commits_year": "soon"}),),)
            .expect_err("expected validation failure",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn null_values_leave_defaults_in_place()
    {
        let normalized = normalize(CardKind::Stats, &overrides(json!({"theme": null}),),)
            .expect("expected normalization success",);
        assert_eq!(normalized.theme, "default");
    }

    #[test]
    fn unknown_keys_are_ignored()
    {
        let normalized = normalize(CardKind::Stats, &overrides(json!({"ring_color": "ff0000"}),),)
            .expect("expected normalization success",);
        assert_eq!(normalized, defaults(CardKind::Stats));
    }

    #[test]
    fn normalization_is_idempotent_under_value_round_trips()
    {
        let first = normalize(
            CardKind::TopLanguages,
            &overrides(json!({"hide": "html,css", "size_weight": 0.5, "layout": "compact"}),),
        )
        .expect("expected normalization success",);

        let round_tripped = match serde_json::to_value(&first,).expect("expected serialization",) {
            Value::Object(map,) => map,
            other => panic!("expected object, got {other}"),
        };

        let second = normalize(CardKind::TopLanguages, &round_tripped,)
            .expect("expected normalization success",);
        assert_eq!(first, second);
    }

    #[test]
    fn parse_overrides_rejects_malformed_json()
    {
        let error =
            parse_overrides(CardKind::Stats, "{not json",).expect_err("expected parse failure",);
        assert!(matches!(error, Error::OptionParse { card: CardKind::Stats, .. }));
    }

    #[test]
    fn parse_overrides_rejects_non_object_roots()
    {
        let error =
            parse_overrides(CardKind::Stats, "[1, 2]",).expect_err("expected validation failure",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn normalize_text_falls_back_to_defaults()
    {
        let normalized = normalize_text(CardKind::Stats, None,).expect("expected defaults",);
        assert_eq!(normalized, defaults(CardKind::Stats));
    }

    #[test]
    fn query_pairs_become_string_overrides()
    {
        let mut query = QueryMap::new();
        query.insert("username".to_owned(), "octocat".to_owned(),);
        query.insert("theme".to_owned(), "dark".to_owned(),);
        query.insert("langs_count".to_owned(), "3".to_owned(),);

        let normalized =
            normalize_query(CardKind::TopLanguages, &query,).expect("expected normalization",);
        assert_eq!(normalized.theme, "dark");
        assert_eq!(normalized.langs_count, Some(3));
    }

    #[test]
    fn show_membership_drives_stats_fetch_flags()
    {
        let normalized = normalize(
            CardKind::Stats,
            &overrides(json!({"show": "prs_merged,discussions_started"}),),
        )
        .expect("expected normalization success",);

        let fetch = StatsFetchOptions::from_options(&normalized,);
        assert!(fetch.include_merged_pull_requests);
        assert!(fetch.include_discussions);
        assert!(!fetch.include_discussions_answers);
    }

    #[test]
    fn unset_weights_default_to_size_only_ranking()
    {
        let normalized =
            normalize(CardKind::TopLanguages, &Map::new(),).expect("expected defaults",);
        let fetch = LanguagesFetchOptions::from_options(&normalized,);
        assert_eq!(fetch.size_weight, 1.0);
        assert_eq!(fetch.count_weight, 0.0);
    }

    #[test]
    fn commits_year_flows_into_fetch_options()
    {
        let normalized = normalize(CardKind::Stats, &overrides(json!({"commits_year": 2024}),),)
            .expect("expected normalization success",);
        let fetch = StatsFetchOptions::from_options(&normalized,);
        assert_eq!(fetch.commits_year, Some(2024));
    }
}
