use tracing::warn;

use super::metadata::{parse_authors, parse_feeds};

/// Sentinel labels of the backing admin UI. The product ships in Spanish;
/// these strings are part of its observable behavior.
pub const NO_PUBLICATION_DATE: &str = "Sin Fecha de Publicación";
pub const NO_FEEDS: &str = "Sin Feeds";
pub const NO_AUTHORS: &str = "Sin Autores";
pub const INVALID_FEEDS: &str = "Invalid feeds format";
pub const INVALID_AUTHORS: &str = "Invalid authors format";

const FEED_LINK_MAX: usize = 30;
const AUTHORS_MAX: usize = 18;

pub fn truncate_title(title: &str, max_length: usize) -> String {
    clip(title, max_length)
}

/// Renders the JSON-text `feeds` field as one display line per link.
pub fn display_feeds(feeds: &str) -> Vec<String> {
    if feeds.trim().is_empty() || feeds == "[]" {
        return vec![NO_FEEDS.to_string()];
    }
    match parse_feeds(feeds) {
        Ok(entries) => entries
            .iter()
            .map(|entry| clip(&entry.link, FEED_LINK_MAX))
            .collect(),
        Err(error) => {
            warn!(%error, "feeds field is not valid JSON");
            vec![INVALID_FEEDS.to_string()]
        }
    }
}

/// Renders the JSON-text `authors` field as one comma-joined display string.
pub fn display_authors(authors: &str) -> String {
    if authors.trim().is_empty() || authors == "[]" {
        return NO_AUTHORS.to_string();
    }
    match parse_authors(authors) {
        Ok(entries) => {
            let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            clip(&names.join(", "), AUTHORS_MAX)
        }
        Err(error) => {
            warn!(%error, "authors field is not valid JSON");
            INVALID_AUTHORS.to_string()
        }
    }
}

/// Date half of a combined `YYYY-MM-DDTHH:MM[:SS]` string; sentinel label
/// when there is no publication date at all.
pub fn format_date(date_time: &str) -> String {
    if date_time.is_empty() {
        return NO_PUBLICATION_DATE.to_string();
    }
    date_time
        .split('T')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Time half, clipped to `HH:MM`; empty when the string carries no time.
pub fn format_time(date_time: &str) -> String {
    match date_time.split_once('T') {
        Some((_, time)) => time.chars().take(5).collect(),
        None => String::new(),
    }
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let prefix: String = text.chars().take(max).collect();
        format!("{prefix}...")
    } else {
        text.to_string()
    }
}
