// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Account statistics and language data acquisition.
///
/// Defines the data payloads consumed by the renderers, the `DataSource`
/// seam the pipelines call through, and the GitHub-backed default
/// implementation. Profile statistics and per-repository language sizes
/// each come from a single GraphQL query; the all-time commit total uses
/// the commit search endpoint. Transient failures are retried inside this
/// module only.
use std::{collections::HashSet, future::Future};

use masterror::AppError;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    credentials::Credentials,
    options::{LanguagesFetchOptions, StatsFetchOptions},
    rank::{Rank, RankInput, compute_rank},
    retry::Backoff,
};

/// Repository page size requested from the API; star and language
/// aggregates consider at most this many owned repositories.
const REPOSITORY_PAGE_SIZE: u32 = 100;
/// Languages considered per repository.
const LANGUAGES_PER_REPOSITORY: u32 = 10;

/// Aggregated account statistics consumed by the stats renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct StatsPayload
{
    pub login:                      String,
    pub name:                       String,
    pub total_stars:                u64,
    pub total_commits:              u64,
    pub total_prs:                  u64,
    pub total_prs_merged:           u64,
    pub total_issues:               u64,
    pub total_discussions_started:  u64,
    pub total_discussions_answered: u64,
    pub contributed_to:             u64,
    pub total_reviews:              u64,
    pub followers:                  u64,
    pub rank:                       Rank,
}

/// A single language aggregated across repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct LanguageShare
{
    /// Language name as reported by the API.
    pub name:  String,
    /// Weighted size used for ordering and percentages.
    pub size:  f64,
    /// Number of repositories the language appears in.
    pub count: u32,
    /// Display color associated with the language, when known.
    pub color: Option<String,>,
}

/// Ordered language aggregate consumed by the top languages renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct LanguagesPayload
{
    /// Languages ordered by descending weighted size.
    pub languages: Vec<LanguageShare,>,
}

/// Data-acquisition seam used by the direct-fetch pipeline mode.
pub trait DataSource
{
    /// Fetches aggregated account statistics.
    fn fetch_stats(
        &self,
        credentials: &Credentials,
        username: &str,
        options: &StatsFetchOptions,
    ) -> impl Future<Output = Result<StatsPayload, AppError,>,>;

    /// Fetches the weighted language aggregate.
    fn fetch_top_languages(
        &self,
        credentials: &Credentials,
        username: &str,
        options: &LanguagesFetchOptions,
    ) -> impl Future<Output = Result<LanguagesPayload, AppError,>,>;
}

/// GitHub-backed [`DataSource`] implementation.
#[derive(Debug, Clone, Default,)]
pub struct GithubDataSource
{
    backoff: Backoff,
}

impl GithubDataSource
{
    /// Creates a data source with the default retry schedule.
    pub fn new() -> Self
    {
        Self::default()
    }

    fn client(&self, credentials: &Credentials,) -> Result<Octocrab, AppError,>
    {
        Octocrab::builder()
            .personal_token(credentials.token().to_owned(),)
            .build()
            .map_err(|e| AppError::service(format!("failed to build API client: {e}"),),)
    }

    async fn run_graphql<T,>(
        &self,
        client: &Octocrab,
        label: &str,
        payload: &serde_json::Value,
    ) -> Result<T, AppError,>
    where
        T: DeserializeOwned,
    {
        let client_clone = client.clone();
        let payload_clone = payload.clone();

        let envelope: GraphQlEnvelope<T,> = self
            .backoff
            .run(label, move || {
                let client = client_clone.clone();
                let payload = payload_clone.clone();
                async move {
                    client
                        .graphql(&payload,)
                        .await
                        .map_err(|e| AppError::service(format!("{label} query failed: {e}"),),)
                }
            },)
            .await?;

        if let Some(data,) = envelope.data {
            return Ok(data,);
        }

        let messages: Vec<String,> =
            envelope.errors.into_iter().map(|issue| issue.message,).collect();
        Err(AppError::service(format!("{label} query was rejected: {}", messages.join("; ")),),)
    }

    async fn fetch_commit_search_total(
        &self,
        client: &Octocrab,
        username: &str,
        commits_year: Option<i32,>,
    ) -> Result<u64, AppError,>
    {
        let route = match commits_year {
            Some(year,) => format!(
                "/search/commits?q=author:{username}+author-date:{year}-01-01..{year}-12-31"
            ),
            None => format!("/search/commits?q=author:{username}"),
        };

        let client_clone = client.clone();
        let total: SearchTotal = self
            .backoff
            .run(&format!("commit search for {username}"), move || {
                let client = client_clone.clone();
                let route = route.clone();
                async move {
                    client.get(route, None::<&(),>,).await.map_err(|e| {
                        AppError::service(format!("commit search failed: {e}"),)
                    },)
                }
            },)
            .await?;

        Ok(total.total_count,)
    }
}

impl DataSource for GithubDataSource
{
    async fn fetch_stats(
        &self,
        credentials: &Credentials,
        username: &str,
        options: &StatsFetchOptions,
    ) -> Result<StatsPayload, AppError,>
    {
        debug!("fetching stats for {}", username);

        let client = self.client(credentials,)?;
        let payload = json!({
            "query": build_stats_query(options),
            "variables": { "login": username },
        });

        let data: StatsData =
            self.run_graphql(&client, &format!("stats for {username}"), &payload,).await?;
        let user = data
            .user
            .ok_or_else(|| AppError::validation(format!("account '{username}' was not found"),),)?;

        if user.repositories.page_info.has_next_page {
            debug!(
                "star total for {} limited to the {} most starred repositories",
                username, REPOSITORY_PAGE_SIZE
            );
        }

        let total_stars = star_total(&user.repositories.nodes, &options.exclude_repo,);
        let total_commits = if options.include_all_commits {
            self.fetch_commit_search_total(&client, username, options.commits_year,).await?
        } else {
            user.contributions.total_commits
        };

        let total_prs = user.pull_requests.total_count;
        let total_issues = user.open_issues.total_count + user.closed_issues.total_count;
        let rank = compute_rank(&RankInput {
            all_commits: options.include_all_commits,
            commits:     total_commits,
            prs:         total_prs,
            issues:      total_issues,
            reviews:     user.contributions.total_reviews,
            stars:       total_stars,
            followers:   user.followers.total_count,
        },);

        info!("fetched stats for {} ({} stars)", username, total_stars);

        Ok(StatsPayload {
            login: user.login,
            name: user.name.filter(|value| !value.trim().is_empty(),).unwrap_or_else(
                || username.to_owned(),
            ),
            total_stars,
            total_commits,
            total_prs,
            total_prs_merged: user
                .merged_pull_requests
                .map_or(0, |node| node.total_count,),
            total_issues,
            total_discussions_started: user.discussions.map_or(0, |node| node.total_count,),
            total_discussions_answered: user
                .discussion_answers
                .map_or(0, |node| node.total_count,),
            contributed_to: user.contributed_to.total_count,
            total_reviews: user.contributions.total_reviews,
            followers: user.followers.total_count,
            rank,
        },)
    }

    async fn fetch_top_languages(
        &self,
        credentials: &Credentials,
        username: &str,
        options: &LanguagesFetchOptions,
    ) -> Result<LanguagesPayload, AppError,>
    {
        debug!("fetching top languages for {}", username);

        let client = self.client(credentials,)?;
        let payload = json!({
            "query": build_languages_query(),
            "variables": { "login": username },
        });

        let data: LanguagesData = self
            .run_graphql(&client, &format!("top languages for {username}"), &payload,)
            .await?;
        let user = data
            .user
            .ok_or_else(|| AppError::validation(format!("account '{username}' was not found"),),)?;

        if user.repositories.page_info.has_next_page {
            debug!(
                "language aggregate for {} limited to the first {} repositories",
                username, REPOSITORY_PAGE_SIZE
            );
        }

        let languages = aggregate_languages(user.repositories.nodes, options,);
        info!("aggregated {} languages for {}", languages.len(), username);

        Ok(LanguagesPayload {
            languages,
        },)
    }
}

fn build_stats_query(options: &StatsFetchOptions,) -> String
{
    let contributions = match options.commits_year {
        Some(year,) => format!(
            "contributionsCollection(from: \"{year}-01-01T00:00:00Z\", to: \
             \"{year}-12-31T23:59:59Z\")"
        ),
        None => "contributionsCollection".to_owned(),
    };

    let mut fields = format!(
        "name login followers {{ totalCount }} {contributions} {{ totalCommitContributions \
         totalPullRequestReviewContributions }} repositoriesContributedTo(contributionTypes: \
         [COMMIT, ISSUE, PULL_REQUEST, REPOSITORY]) {{ totalCount }} pullRequests {{ totalCount \
         }} openIssues: issues(states: OPEN) {{ totalCount }} closedIssues: issues(states: \
         CLOSED) {{ totalCount }}"
    );

    if options.include_merged_pull_requests {
        fields.push_str(" mergedPullRequests: pullRequests(states: MERGED) { totalCount }",);
    }
    if options.include_discussions {
        fields.push_str(" repositoryDiscussions { totalCount }",);
    }
    if options.include_discussions_answers {
        fields.push_str(
            " repositoryDiscussionComments(onlyAnswers: true) { totalCount }",
        );
    }

    fields.push_str(&format!(
        " repositories(first: {REPOSITORY_PAGE_SIZE}, ownerAffiliations: OWNER, orderBy: \
         {{field: STARGAZERS, direction: DESC}}) {{ nodes {{ name stargazers {{ totalCount }} \
         }} pageInfo {{ hasNextPage }} }}"
    ),);

    format!("query ($login: String!) {{ user(login: $login) {{ {fields} }} }}")
}

fn build_languages_query() -> String
{
    format!(
        "query ($login: String!) {{ user(login: $login) {{ repositories(first: \
         {REPOSITORY_PAGE_SIZE}, ownerAffiliations: OWNER, isFork: false) {{ nodes {{ name \
         languages(first: {LANGUAGES_PER_REPOSITORY}, orderBy: {{field: SIZE, direction: \
         DESC}}) {{ edges {{ size node {{ name color }} }} }} }} pageInfo {{ hasNextPage }} }} \
         }} }}"
    )
}

fn star_total(repositories: &[StarredRepository], exclude_repo: &[String],) -> u64
{
    let excluded: HashSet<&str,> = exclude_repo.iter().map(String::as_str,).collect();
    repositories
        .iter()
        .filter(|repository| !excluded.contains(repository.name.as_str(),),)
        .map(|repository| repository.stargazers.total_count,)
        .sum()
}

fn aggregate_languages(
    repositories: Vec<LanguageRepository,>,
    options: &LanguagesFetchOptions,
) -> Vec<LanguageShare,>
{
    let excluded: HashSet<&str,> = options.exclude_repo.iter().map(String::as_str,).collect();
    let mut totals: std::collections::BTreeMap<String, (u64, u32, Option<String,>,),> =
        std::collections::BTreeMap::new();

    for repository in repositories {
        if excluded.contains(repository.name.as_str(),) {
            continue;
        }
        for edge in repository.languages.edges {
            let entry = totals.entry(edge.node.name,).or_insert((0, 0, edge.node.color,),);
            entry.0 += edge.size;
            entry.1 += 1;
        }
    }

    let mut shares: Vec<LanguageShare,> = totals
        .into_iter()
        .filter(|(_, (bytes, _, _,),)| *bytes > 0,)
        .map(|(name, (bytes, count, color,),)| LanguageShare {
            name,
            size: (bytes as f64).powf(options.size_weight,)
                * f64::from(count,).powf(options.count_weight,),
            count,
            color,
        },)
        .collect();

    shares.sort_by(|a, b| {
        b.size.partial_cmp(&a.size,).unwrap_or(std::cmp::Ordering::Equal,)
    },);

    shares
}

#[derive(Debug, Deserialize,)]
struct GraphQlEnvelope<T,>
{
    data:   Option<T,>,
    #[serde(default)]
    errors: Vec<GraphQlIssue,>,
}

#[derive(Debug, Deserialize,)]
struct GraphQlIssue
{
    message: String,
}

#[derive(Debug, Deserialize,)]
struct SearchTotal
{
    total_count: u64,
}

#[derive(Debug, Deserialize,)]
struct StatsData
{
    user: Option<StatsUser,>,
}

#[derive(Debug, Deserialize,)]
struct StatsUser
{
    name: Option<String,>,
    login: String,
    followers: CountNode,
    #[serde(rename = "contributionsCollection")]
    contributions: ContributionTotals,
    #[serde(rename = "repositoriesContributedTo")]
    contributed_to: CountNode,
    #[serde(rename = "pullRequests")]
    pull_requests: CountNode,
    #[serde(rename = "mergedPullRequests", default)]
    merged_pull_requests: Option<CountNode,>,
    #[serde(rename = "openIssues")]
    open_issues: CountNode,
    #[serde(rename = "closedIssues")]
    closed_issues: CountNode,
    #[serde(rename = "repositoryDiscussions", default)]
    discussions: Option<CountNode,>,
    #[serde(rename = "repositoryDiscussionComments", default)]
    discussion_answers: Option<CountNode,>,
    repositories: RepositoryPage,
}

#[derive(Debug, Deserialize,)]
struct ContributionTotals
{
    #[serde(rename = "totalCommitContributions")]
    total_commits: u64,
    #[serde(rename = "totalPullRequestReviewContributions")]
    total_reviews: u64,
}

#[derive(Debug, Deserialize,)]
struct CountNode
{
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize,)]
struct PageInfo
{
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
}

#[derive(Debug, Deserialize,)]
struct RepositoryPage
{
    nodes:     Vec<StarredRepository,>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize,)]
struct StarredRepository
{
    name:       String,
    stargazers: CountNode,
}

#[derive(Debug, Deserialize,)]
struct LanguagesData
{
    user: Option<LanguagesUser,>,
}

#[derive(Debug, Deserialize,)]
struct LanguagesUser
{
    repositories: LanguageRepositoryPage,
}

#[derive(Debug, Deserialize,)]
struct LanguageRepositoryPage
{
    nodes:     Vec<LanguageRepository,>,
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
}

#[derive(Debug, Deserialize,)]
struct LanguageRepository
{
    name:      String,
    languages: LanguageConnection,
}

#[derive(Debug, Deserialize,)]
struct LanguageConnection
{
    edges: Vec<LanguageEdge,>,
}

#[derive(Debug, Deserialize,)]
struct LanguageEdge
{
    size: u64,
    node: LanguageNode,
}

#[derive(Debug, Deserialize,)]
struct LanguageNode
{
    name:  String,
    color: Option<String,>,
}
