use std::sync::OnceLock;

use regex::Regex;

pub(crate) fn normalize_column_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .collect()
}

/// Position of the first header matching any alias, tried in alias order.
pub(crate) fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|header| normalize_column_name(header))
        .collect();

    aliases.iter().find_map(|alias| {
        let target = normalize_column_name(alias);
        normalized.iter().position(|header| *header == target)
    })
}

pub(crate) fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value))
}
