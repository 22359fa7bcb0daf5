// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Deterministic SVG rendering for both card kinds.
//!
//! The renderer is a pure function of its payload and options: no clocks,
//! no randomness, no network. Stat rows are selected through the `hide`
//! and `show` lists, languages are capped and filtered, and every label is
//! XML-escaped before it reaches the document.

use crate::{
    error::Error,
    fetch::{LanguageShare, LanguagesPayload, StatsPayload},
    options::CardOptions
};

/// Card width applied when no override is supplied.
const DEFAULT_CARD_WIDTH: u32 = 450;
/// Minimum card width accepted from overrides.
const MIN_CARD_WIDTH: u32 = 280;
/// Vertical distance between stat or language rows.
const ROW_HEIGHT: u32 = 25;
/// Vertical space reserved for the title block.
const TITLE_BLOCK_HEIGHT: u32 = 35;
/// Padding applied above and below the card body.
const VERTICAL_PADDING: u32 = 25;
/// Languages shown when no cap is supplied.
const DEFAULT_LANGUAGE_CAP: u32 = 5;

/// Fallback colors cycled when the API reports no language color.
const FALLBACK_LANGUAGE_COLORS: [&str; 6] =
    ["#f34b7d", "#2b7489", "#4f5d95", "#e34c26", "#563d7c", "#b07219"];

/// Rendering seam used by every pipeline mode that holds a data payload.
pub trait CardRenderer {
    /// Renders the statistics card.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the card cannot be produced.
    fn render_stats(&self, payload: &StatsPayload, options: &CardOptions)
    -> Result<String, Error>;

    /// Renders the top languages card.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the card cannot be produced.
    fn render_top_languages(
        &self,
        payload: &LanguagesPayload,
        options: &CardOptions
    ) -> Result<String, Error>;
}

/// Default SVG renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    /// Creates the default renderer.
    pub fn new() -> Self {
        Self
    }
}

struct Theme {
    title:      &'static str,
    text:       &'static str,
    icon:       &'static str,
    background: &'static str,
    border:     &'static str
}

const DEFAULT_THEME: Theme = Theme {
    title:      "#2f80ed",
    text:       "#434d58",
    icon:       "#4c71f2",
    background: "#fffefe",
    border:     "#e4e2e2"
};

fn theme_for(name: &str) -> Theme {
    match name {
        "dark" => Theme {
            title:      "#fff",
            text:       "#9f9f9f",
            icon:       "#79ff97",
            background: "#151515",
            border:     "#e4e2e2"
        },
        "radical" => Theme {
            title:      "#fe428e",
            text:       "#a9fef7",
            icon:       "#f8d847",
            background: "#141321",
            border:     "#e4e2e2"
        },
        "gruvbox" => Theme {
            title:      "#fabd2f",
            text:       "#8ec07c",
            icon:       "#fe8019",
            background: "#282828",
            border:     "#e4e2e2"
        },
        _ => DEFAULT_THEME
    }
}

impl CardRenderer for SvgRenderer {
    fn render_stats(
        &self,
        payload: &StatsPayload,
        options: &CardOptions
    ) -> Result<String, Error> {
        let theme = theme_for(&options.theme);
        let width = card_width(options);
        let rows = stat_rows(payload, options);
        let title_height = if options.hide_title { 0 } else { TITLE_BLOCK_HEIGHT };
        let body_height = (rows.len() as u32).max(1) * ROW_HEIGHT;
        let rank_height = if options.hide_rank { 0 } else { 100 };
        let height = (title_height + body_height + VERTICAL_PADDING * 2).max(rank_height + 40);

        let mut svg = open_svg(width, height, &theme, options.hide_border);

        if !options.hide_title {
            svg.push_str(&format!(
                "  <text x=\"25\" y=\"33\" font-family=\"'Segoe UI', Ubuntu, sans-serif\" \
                 font-size=\"18\" font-weight=\"600\" fill=\"{}\">{}'s GitHub Stats</text>\n",
                theme.title,
                escape_xml(&payload.name)
            ));
        }

        let value_x = if options.hide_rank { width - 50 } else { width - 130 };
        let mut y = title_height + VERTICAL_PADDING + 10;
        for (label, value) in &rows {
            svg.push_str(&format!("  <g transform=\"translate(25, {y})\">\n"));
            if options.show_icons {
                svg.push_str(&format!(
                    "    <circle cx=\"4\" cy=\"-4\" r=\"3\" fill=\"{}\"/>\n",
                    theme.icon
                ));
            }
            let label_x = if options.show_icons { 16 } else { 0 };
            svg.push_str(&format!(
                "    <text x=\"{label_x}\" y=\"0\" font-family=\"'Segoe UI', Ubuntu, \
                 sans-serif\" font-size=\"14\" fill=\"{}\">{}</text>\n",
                theme.text,
                escape_xml(label)
            ));
            svg.push_str(&format!(
                "    <text x=\"{}\" y=\"0\" font-family=\"'Segoe UI', Ubuntu, sans-serif\" \
                 font-size=\"14\" font-weight=\"600\" fill=\"{}\">{}</text>\n",
                value_x - 25,
                theme.text,
                escape_xml(value)
            ));
            svg.push_str("  </g>\n");
            y += ROW_HEIGHT;
        }

        if !options.hide_rank {
            let ring_x = width - 70;
            let ring_y = height / 2;
            svg.push_str(&format!(
                "  <g transform=\"translate({ring_x}, {ring_y})\">\n    <circle r=\"40\" \
                 fill=\"none\" stroke=\"{}\" stroke-width=\"6\" opacity=\"0.2\"/>\n    <circle \
                 r=\"40\" fill=\"none\" stroke=\"{}\" stroke-width=\"6\" \
                 stroke-dasharray=\"{:.2} 251.33\" transform=\"rotate(-90)\"/>\n    <text \
                 text-anchor=\"middle\" dominant-baseline=\"central\" \
                 font-family=\"'Segoe UI', Ubuntu, sans-serif\" font-size=\"22\" \
                 font-weight=\"700\" fill=\"{}\">{}</text>\n  </g>\n",
                theme.title,
                theme.title,
                251.33 * (100.0 - payload.rank.percentile) / 100.0,
                theme.title,
                escape_xml(&payload.rank.level)
            ));
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }

    fn render_top_languages(
        &self,
        payload: &LanguagesPayload,
        options: &CardOptions
    ) -> Result<String, Error> {
        let theme = theme_for(&options.theme);
        let width = card_width(options);
        let languages = visible_languages(payload, options);
        let title_height = if options.hide_title { 0 } else { TITLE_BLOCK_HEIGHT };

        if languages.is_empty() {
            let height = title_height + VERTICAL_PADDING * 2 + ROW_HEIGHT;
            let mut svg = open_svg(width, height, &theme, options.hide_border);
            if !options.hide_title {
                svg.push_str(&title_text(&theme));
            }
            svg.push_str(&format!(
                "  <text x=\"25\" y=\"{}\" font-family=\"'Segoe UI', Ubuntu, sans-serif\" \
                 font-size=\"14\" fill=\"{}\">No language data available</text>\n",
                title_height + VERTICAL_PADDING + 10,
                theme.text
            ));
            svg.push_str("</svg>\n");
            return Ok(svg);
        }

        let total: f64 = languages.iter().map(|language| language.size).sum();
        let compact = options.layout == "compact";
        let bar_block = if compact { 20 } else { 0 };
        let body_height = languages.len() as u32 * ROW_HEIGHT;
        let height = title_height + bar_block + body_height + VERTICAL_PADDING * 2;

        let mut svg = open_svg(width, height, &theme, options.hide_border);
        if !options.hide_title {
            svg.push_str(&title_text(&theme));
        }

        let inner_width = width - 50;
        let mut y = title_height + VERTICAL_PADDING;

        if compact {
            let mut x = 25.0;
            for (index, language) in languages.iter().enumerate() {
                let segment = f64::from(inner_width) * language.size / total;
                svg.push_str(&format!(
                    "  <rect x=\"{x:.2}\" y=\"{y}\" width=\"{segment:.2}\" height=\"8\" \
                     rx=\"4\" fill=\"{}\"/>\n",
                    language_color(language, index)
                ));
                x += segment;
            }
            y += bar_block;
        }

        for (index, language) in languages.iter().enumerate() {
            let percent = 100.0 * language.size / total;
            let row_y = y + 12;
            svg.push_str(&format!("  <g transform=\"translate(25, {row_y})\">\n"));
            svg.push_str(&format!(
                "    <circle cx=\"4\" cy=\"-4\" r=\"5\" fill=\"{}\"/>\n",
                language_color(language, index)
            ));
            svg.push_str(&format!(
                "    <text x=\"16\" y=\"0\" font-family=\"'Segoe UI', Ubuntu, sans-serif\" \
                 font-size=\"13\" fill=\"{}\">{} {percent:.2}%</text>\n",
                theme.text,
                escape_xml(&language.name)
            ));
            if !compact {
                let bar_x = inner_width / 2;
                let bar_width = f64::from(inner_width / 2) * percent / 100.0;
                svg.push_str(&format!(
                    "    <rect x=\"{bar_x}\" y=\"-10\" width=\"{}\" height=\"10\" rx=\"5\" \
                     fill=\"{}\" opacity=\"0.2\"/>\n",
                    inner_width / 2,
                    theme.text
                ));
                svg.push_str(&format!(
                    "    <rect x=\"{bar_x}\" y=\"-10\" width=\"{bar_width:.2}\" height=\"10\" \
                     rx=\"5\" fill=\"{}\"/>\n",
                    language_color(language, index)
                ));
            }
            svg.push_str("  </g>\n");
            y += ROW_HEIGHT;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

fn open_svg(width: u32, height: u32, theme: &Theme, hide_border: bool) -> String {
    let stroke = if hide_border { "none".to_owned() } else { theme.border.to_owned() };
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\" role=\"img\">\n  <rect x=\"0.5\" y=\"0.5\" \
         width=\"{}\" height=\"{}\" rx=\"4.5\" fill=\"{}\" stroke=\"{stroke}\"/>\n",
        width - 1,
        height - 1,
        theme.background
    )
}

fn title_text(theme: &Theme) -> String {
    format!(
        "  <text x=\"25\" y=\"33\" font-family=\"'Segoe UI', Ubuntu, sans-serif\" \
         font-size=\"18\" font-weight=\"600\" fill=\"{}\">Most Used Languages</text>\n",
        theme.title
    )
}

fn card_width(options: &CardOptions) -> u32 {
    options.card_width.unwrap_or(DEFAULT_CARD_WIDTH).max(MIN_CARD_WIDTH)
}

fn visible_languages<'payload>(
    payload: &'payload LanguagesPayload,
    options: &CardOptions
) -> Vec<&'payload LanguageShare> {
    let hidden: Vec<String> = options.hide.iter().map(|name| name.to_lowercase()).collect();
    let cap = options.langs_count.unwrap_or(DEFAULT_LANGUAGE_CAP).max(1) as usize;

    payload
        .languages
        .iter()
        .filter(|language| !hidden.contains(&language.name.to_lowercase()))
        .take(cap)
        .collect()
}

fn language_color(language: &LanguageShare, index: usize) -> String {
    language
        .color
        .clone()
        .unwrap_or_else(|| FALLBACK_LANGUAGE_COLORS[index % FALLBACK_LANGUAGE_COLORS.len()].to_owned())
}

fn stat_rows(payload: &StatsPayload, options: &CardOptions) -> Vec<(String, String)> {
    let hidden: Vec<&str> = options.hide.iter().map(String::as_str).collect();
    let shown = |token: &str| options.show.iter().any(|entry| entry == token);
    let mut rows = Vec::new();

    if !hidden.contains(&"stars") {
        rows.push(("Total Stars Earned".to_owned(), format_count(payload.total_stars)));
    }
    if !hidden.contains(&"commits") {
        let label = match options.commits_year {
            Some(year) => format!("Total Commits ({year})"),
            None => "Total Commits".to_owned()
        };
        rows.push((label, format_count(payload.total_commits)));
    }
    if !hidden.contains(&"prs") {
        rows.push(("Total PRs".to_owned(), format_count(payload.total_prs)));
    }
    if shown("prs_merged") {
        rows.push(("Total PRs Merged".to_owned(), format_count(payload.total_prs_merged)));
    }
    if !hidden.contains(&"issues") {
        rows.push(("Total Issues".to_owned(), format_count(payload.total_issues)));
    }
    if shown("discussions_started") {
        rows.push((
            "Discussions Started".to_owned(),
            format_count(payload.total_discussions_started)
        ));
    }
    if shown("discussions_answered") {
        rows.push((
            "Discussions Answered".to_owned(),
            format_count(payload.total_discussions_answered)
        ));
    }
    if shown("reviews") {
        rows.push(("Total Reviews".to_owned(), format_count(payload.total_reviews)));
    }
    if !hidden.contains(&"contribs") {
        rows.push(("Contributed to".to_owned(), format_count(payload.contributed_to)));
    }

    rows
}

fn format_count(value: u64) -> String {
    if value < 1000 {
        return value.to_string();
    }
    format!("{:.1}k", value as f64 / 1000.0)
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for character in raw.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other)
        }
    }
    escaped
}
