// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Percentile rank derived from weighted account activity totals.
//!
//! Each activity dimension is squashed through a cumulative distribution
//! centered on a median value, weighted, and folded into a single
//! percentile where lower means more active. The percentile maps onto
//! letter levels from `S` down to `C`.

use serde::{Deserialize, Serialize};

const COMMITS_MEDIAN: f64 = 250.0;
const COMMITS_MEDIAN_ALL_TIME: f64 = 1000.0;
const COMMITS_WEIGHT: f64 = 2.0;
const PRS_MEDIAN: f64 = 50.0;
const PRS_WEIGHT: f64 = 3.0;
const ISSUES_MEDIAN: f64 = 25.0;
const ISSUES_WEIGHT: f64 = 1.0;
const REVIEWS_MEDIAN: f64 = 2.0;
const REVIEWS_WEIGHT: f64 = 1.0;
const STARS_MEDIAN: f64 = 50.0;
const STARS_WEIGHT: f64 = 4.0;
const FOLLOWERS_MEDIAN: f64 = 10.0;
const FOLLOWERS_WEIGHT: f64 = 1.0;

const LEVEL_THRESHOLDS: [(f64, &str,); 9] = [
    (1.0, "S",),
    (12.5, "A+",),
    (25.0, "A",),
    (37.5, "A-",),
    (50.0, "B+",),
    (62.5, "B",),
    (75.0, "B-",),
    (87.5, "C+",),
    (100.0, "C",),
];

/// Computed rank of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize,)]
pub struct Rank
{
    /// Letter level, `S` through `C`.
    pub level:      String,
    /// Percentile within the population model; lower is better.
    pub percentile: f64,
}

/// Activity totals feeding the rank computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct RankInput
{
    /// Whether the commit total spans all years.
    pub all_commits: bool,
    pub commits:     u64,
    pub prs:         u64,
    pub issues:      u64,
    pub reviews:     u64,
    pub stars:       u64,
    pub followers:   u64,
}

/// Computes the percentile rank for the given activity totals.
pub fn compute_rank(input: &RankInput,) -> Rank
{
    let commits_median =
        if input.all_commits { COMMITS_MEDIAN_ALL_TIME } else { COMMITS_MEDIAN };

    let total_weight = COMMITS_WEIGHT
        + PRS_WEIGHT
        + ISSUES_WEIGHT
        + REVIEWS_WEIGHT
        + STARS_WEIGHT
        + FOLLOWERS_WEIGHT;

    let score = COMMITS_WEIGHT * exponential_cdf(input.commits as f64 / commits_median,)
        + PRS_WEIGHT * exponential_cdf(input.prs as f64 / PRS_MEDIAN,)
        + ISSUES_WEIGHT * exponential_cdf(input.issues as f64 / ISSUES_MEDIAN,)
        + REVIEWS_WEIGHT * exponential_cdf(input.reviews as f64 / REVIEWS_MEDIAN,)
        + STARS_WEIGHT * log_normal_cdf(input.stars as f64 / STARS_MEDIAN,)
        + FOLLOWERS_WEIGHT * log_normal_cdf(input.followers as f64 / FOLLOWERS_MEDIAN,);

    let percentile = (1.0 - score / total_weight) * 100.0;

    Rank {
        level: level_for(percentile,).to_owned(),
        percentile,
    }
}

fn exponential_cdf(x: f64,) -> f64
{
    1.0 - 2f64.powf(-x,)
}

fn log_normal_cdf(x: f64,) -> f64
{
    x / (1.0 + x)
}

fn level_for(percentile: f64,) -> &'static str
{
    LEVEL_THRESHOLDS
        .iter()
        .find(|(threshold, _,)| percentile <= *threshold,)
        .map_or("C", |(_, level,)| *level,)
}
