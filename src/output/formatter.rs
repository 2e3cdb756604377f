use anyhow::{Context, Result};
use clap::ValueEnum;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::notify::format_thousands;
use crate::scoring::{MatchResponse, ScoreBreakdown, ScoredListing};

/// How ranked listings are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact aligned table, colored on a terminal
    #[default]
    Table,
    /// Tab-separated values for scripting
    Tsv,
    /// The full response with breakdowns
    Json,
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Scores are 0-100; one decimal is plenty.
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

pub fn format_price(price: Option<u32>) -> String {
    price
        .map(|p| format!("${}", format_thousands(u64::from(p))))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_miles(miles: Option<u32>) -> String {
    miles
        .map(|m| format!("{} mi", format_thousands(u64::from(m))))
        .unwrap_or_else(|| "-".to_string())
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate title to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked listings as a table: Index, Score, Title, Price, Miles.
/// No headers. Index is 1-based, which is what `open` and `lead` take.
pub fn format_ranked_table(results: &[ScoredListing], use_colors: bool) -> String {
    format_ranked_table_with_width(results, use_colors, get_terminal_width())
}

fn format_ranked_table_with_width(
    results: &[ScoredListing],
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if results.is_empty() {
        return "No listings matched.".to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(idx, scored)| format_row(idx, scored, use_colors, term_width))
        .collect::<Vec<_>>()
        .join("\n")
}

const INDEX_WIDTH: usize = 3;
const SCORE_WIDTH: usize = 5;
const PRICE_WIDTH: usize = 9;
const MILES_WIDTH: usize = 11;
const SEPARATOR: &str = "  ";

/// One table row, always a single line: whitespace in the title
/// (newlines included) collapses to single spaces.
fn format_row(idx: usize, scored: &ScoredListing, use_colors: bool, term_width: Option<usize>) -> String {
    let fixed_width =
        INDEX_WIDTH + 1 + SCORE_WIDTH + PRICE_WIDTH + MILES_WIDTH + SEPARATOR.len() * 3;

    let index_str = format!("{:>2}.", idx + 1);
    let score_str = format!("{:>width$}", format_score(scored.score), width = SCORE_WIDTH);
    let price_str = format!("{:>width$}", format_price(scored.listing.price), width = PRICE_WIDTH);
    let miles_str = format!("{:>width$}", format_miles(scored.listing.miles), width = MILES_WIDTH);

    let full_title = scored
        .listing
        .title()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let title = match term_width {
        Some(width) if width > fixed_width + 10 => truncate_title(&full_title, width - fixed_width),
        Some(_) => truncate_title(&full_title, 20),
        None => full_title,
    };

    if use_colors {
        format!(
            "{} {}{}{}{}{}{}{}",
            index_str.dimmed(),
            score_str.bold(),
            SEPARATOR,
            title,
            SEPARATOR,
            price_str.green(),
            SEPARATOR,
            miles_str.cyan()
        )
    } else {
        format!(
            "{} {}{}{}{}{}{}{}",
            index_str, score_str, SEPARATOR, title, SEPARATOR, price_str, SEPARATOR, miles_str
        )
    }
}

/// Format ranked listings as tab-separated values for scripting
/// Columns: score, id, title, price, miles, url (no headers, no colors)
pub fn format_tsv(results: &[ScoredListing]) -> String {
    results
        .iter()
        .map(|scored| {
            let listing = &scored.listing;
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                format_score(scored.score),
                listing.id,
                listing.title(),
                listing.price.map(|p| p.to_string()).unwrap_or_default(),
                listing.miles.map(|m| m.to_string()).unwrap_or_default(),
                listing.url.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_json(response: &MatchResponse) -> Result<String> {
    serde_json::to_string_pretty(response).context("Failed to serialize ranked listings")
}

/// Multi-line breakdown of one result (for verbose mode): group
/// contributions, then each criterion's utility and global weight.
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let mut lines = Vec::new();

    for (group, contribution) in &breakdown.group_scores {
        let weight = breakdown.weights_groups.get(group).copied().unwrap_or(0.0);
        let line = format!("    {:<10} {:>5.1}  (weight {:.2})", group, contribution, weight);
        lines.push(if use_colors { line.bold().to_string() } else { line });
    }

    for (criterion, utility) in &breakdown.sub_scores {
        let weight = breakdown.weights_sub.get(criterion).copied().unwrap_or(0.0);
        let line = format!("      {:<24} {:.2}  x {:.3}", criterion, utility, weight);
        lines.push(if use_colors { line.dimmed().to_string() } else { line });
    }

    if let Some(raw) = breakdown.raw_score {
        lines.push(format!("    raw score {:.4}", raw));
    }

    lines.join("\n")
}

/// Table rows each followed by their breakdown.
pub fn format_verbose_table(results: &[ScoredListing], use_colors: bool) -> String {
    if results.is_empty() {
        return format_ranked_table(results, use_colors);
    }
    let term_width = get_terminal_width();
    results
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            format!(
                "{}\n{}",
                format_row(idx, scored, use_colors, term_width),
                format_breakdown(&scored.breakdown, use_colors)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
