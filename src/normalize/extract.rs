//! Locating a JSON array inside free-form model output.

use serde_json::Value;
use tracing::{debug, warn};

const FENCE: &str = "```";

type Extractor = fn(&str) -> Option<&str>;

/// Tried in order; the first candidate that parses as a JSON array wins.
const EXTRACTORS: [(&str, Extractor); 3] = [
    ("json_fence", json_fence),
    ("any_fence", any_fence),
    ("bracket_span", bracket_span),
];

/// Returns the elements of the first JSON array found in `text`, or `None` when no
/// strategy produces one.
pub fn extract_array(text: &str) -> Option<Vec<Value>> {
    for (strategy, extract) in EXTRACTORS {
        let Some(candidate) = extract(text) else {
            continue;
        };
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Array(items)) => {
                debug!(strategy, count = items.len(), "extracted JSON array");
                return Some(items);
            }
            Ok(_) => debug!(strategy, "candidate is valid JSON but not an array"),
            Err(e) => warn!(strategy, error = %e, "failed to parse JSON candidate"),
        }
    }
    None
}

/// Body of the first fenced block whose info string is `json`.
fn json_fence(text: &str) -> Option<&str> {
    fenced_blocks(text)
        .into_iter()
        .find(|block| block.info.eq_ignore_ascii_case("json"))
        .map(|block| block.body)
}

fn any_fence(text: &str) -> Option<&str> {
    fenced_blocks(text).first().map(|block| block.body)
}

/// From the first `[` through the last `]`.
fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

struct FencedBlock<'a> {
    info: &'a str,
    body: &'a str,
}

fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        let inner = &after_open[..close];
        // A block written on one line has no info string.
        let block = match inner.split_once('\n') {
            Some((info, body)) => FencedBlock {
                info: info.trim(),
                body,
            },
            None => FencedBlock {
                info: "",
                body: inner,
            },
        };
        blocks.push(block);
        rest = &after_open[close + FENCE.len()..];
    }
    blocks
}
