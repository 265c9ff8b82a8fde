//! Display formatting for upstream strings.
//!
//! Upstream locations look like `los_angeles-usa` and dates like `*23-08-2019`.

use chrono::NaiveDate;
use indexmap::IndexMap;

/// `"los_angeles-usa"` becomes `"Los Angeles, Usa"`.
///
/// Anything after the second dash is dropped; a string without a dash is
/// title-cased as a whole.
pub fn format_location(raw: &str) -> String {
    let mut parts = raw.split('-').map(title_case);
    match (parts.next(), parts.next()) {
        (Some(place), Some(country)) => format!("{place}, {country}"),
        (Some(place), None) => place,
        _ => String::new(),
    }
}

fn title_case(segment: &str) -> String {
    segment
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"*23-08-2019"` becomes `"August 23, 2019"`. Unparseable input is returned
/// unchanged.
pub fn format_date(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('*');
    match NaiveDate::parse_from_str(trimmed, "%d-%m-%Y") {
        Ok(date) => date.format("%B %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Formats both the keys and the date lists of a relation map, preserving
/// upstream order. Keys that collide after formatting are merged.
pub fn format_relation(raw: &IndexMap<String, Vec<String>>) -> IndexMap<String, Vec<String>> {
    let mut formatted: IndexMap<String, Vec<String>> = IndexMap::with_capacity(raw.len());
    for (location, dates) in raw {
        formatted
            .entry(format_location(location))
            .or_default()
            .extend(dates.iter().map(|d| format_date(d)));
    }
    formatted
}

/// Year component of a `DD-MM-YYYY` string.
pub fn extract_year(date: &str) -> Option<i32> {
    let parts: Vec<&str> = date.trim().split('-').collect();
    let [_, _, year] = parts.as_slice() else {
        return None;
    };
    year.parse::<i32>().ok().filter(|year| *year > 0)
}
