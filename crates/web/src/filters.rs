//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a 1-5 star value as filled and empty stars.
///
/// Usage in templates: `{{ rating.value|stars }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn stars(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(star_string(&value.to_string()))
}

fn star_string(value: &str) -> String {
    let filled = value.trim().parse::<usize>().unwrap_or(0).min(5);
    let mut out = "\u{2605}".repeat(filled);
    out.push_str(&"\u{2606}".repeat(5 - filled));
    out
}
