// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Deterministic placeholder payloads for sample runs.
///
/// The payloads are shaped exactly like real fetch results so the
/// renderers cannot tell the difference. They depend only on the identity
/// string, which keeps repeated sample runs byte-identical.
use crate::{
    fetch::{LanguageShare, LanguagesPayload, StatsPayload},
    rank::{RankInput, compute_rank}
};

/// Builds the placeholder statistics payload for the given identity.
pub fn stats_payload(username: &str) -> StatsPayload {
    let rank = compute_rank(&RankInput {
        all_commits: false,
        commits:     1480,
        prs:         86,
        issues:      32,
        reviews:     14,
        stars:       420,
        followers:   64
    });

    StatsPayload {
        login: username.to_owned(),
        name: username.to_owned(),
        total_stars: 420,
        total_commits: 1480,
        total_prs: 86,
        total_prs_merged: 71,
        total_issues: 32,
        total_discussions_started: 12,
        total_discussions_answered: 5,
        contributed_to: 18,
        total_reviews: 14,
        followers: 64,
        rank
    }
}

/// Builds the placeholder language aggregate.
pub fn top_languages_payload() -> LanguagesPayload {
    let languages = vec![
        share("Rust", 128_000.0, 6, "#dea584"),
        share("TypeScript", 96_400.0, 9, "#3178c6"),
        share("Python", 54_200.0, 4, "#3572A5"),
        share("Shell", 18_600.0, 11, "#89e051"),
        share("Dockerfile", 4_300.0, 7, "#384d54"),
        share("Lua", 2_100.0, 1, "#000080"),
    ];

    LanguagesPayload {
        languages
    }
}

fn share(name: &str, size: f64, count: u32, color: &str) -> LanguageShare {
    LanguageShare {
        name: name.to_owned(),
        size,
        count,
        color: Some(color.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{stats_payload, top_languages_payload};

    #[test]
    fn stats_payload_is_deterministic_per_identity() {
        assert_eq!(stats_payload("octocat"), stats_payload("octocat"));
        assert_ne!(stats_payload("octocat").login, stats_payload("hubot").login);
    }

    #[test]
    fn stats_payload_carries_a_computed_rank() {
        let payload = stats_payload("octocat");
        assert!(!payload.rank.level.is_empty());
        assert!(payload.rank.percentile > 0.0 && payload.rank.percentile < 100.0);
    }

    #[test]
    fn languages_are_ordered_by_weighted_size() {
        let payload = top_languages_payload();
        assert!(!payload.languages.is_empty());
        for window in payload.languages.windows(2) {
            assert!(window[0].size >= window[1].size);
        }
    }
}
