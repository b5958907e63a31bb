//! Turning a model's free-text reply into validated, ordered paper records.

mod coerce;
mod extract;

use serde_json::Value;
use tracing::{debug, info};

use crate::paper::{IdGenerator, PaperRecord};

use extract::extract_array;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const DEFAULT_PUBLISHER: &str = "Web";
pub const PLACEHOLDER_URL: &str = "#";

/// Parses `raw` into records whose year lies in `[year_start, year_end]`, newest first.
///
/// Never fails: a reply with no recoverable JSON array yields an empty vector, and
/// malformed elements are filled with defaults.
pub fn normalize(raw: &str, year_start: i32, year_end: i32) -> Vec<PaperRecord> {
    let Some(items) = extract_array(raw) else {
        let preview: String = raw.chars().take(200).collect();
        info!(content_preview = %preview, "no JSON array in response, treating as no results");
        return Vec::new();
    };

    let mut ids = IdGenerator::new();
    let total = items.len();
    let mut papers: Vec<PaperRecord> = items
        .iter()
        .filter_map(|item| coerce_record(item, year_start, year_end, &mut ids))
        .collect();

    // Stable, so equal years keep response order.
    papers.sort_by(|a, b| b.year.cmp(&a.year));

    debug!(
        total,
        kept = papers.len(),
        year_start,
        year_end,
        "normalized response"
    );
    papers
}

/// Builds a record from one array element, or `None` when its year is outside
/// `[year_start, year_end]`. Non-object elements get every default.
fn coerce_record(
    item: &Value,
    year_start: i32,
    year_end: i32,
    ids: &mut IdGenerator,
) -> Option<PaperRecord> {
    let year = coerce::year_or(item.get("year"), year_end);
    if !(f64::from(year_start)..=f64::from(year_end)).contains(&year) {
        return None;
    }

    Some(PaperRecord {
        id: ids.next_id(),
        title: coerce::text_or(item.get("title"), UNKNOWN_TITLE),
        authors: coerce::names_or(item.get("authors"), UNKNOWN_AUTHOR),
        // In range, so truncation stays within the bounds.
        year: year.trunc() as i32,
        citations: coerce::count_or_zero(item.get("citations")),
        publisher: coerce::text_or(item.get("publisher"), DEFAULT_PUBLISHER),
        url: coerce::text_or(item.get("url"), PLACEHOLDER_URL),
        selected: true,
    })
}
