use tracing::warn;

use super::types::{Completion, GenerateContentResponse, Source};

/// Joins the text parts of the first candidate and collects its grounding sources.
pub fn extract_completion(response: &GenerateContentResponse) -> Completion {
    let candidate = response.candidates.as_ref().and_then(|c| c.first());

    let text: String = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        warn!("Gemini returned empty text (safety filter or empty response)");
    }

    let metadata = candidate.and_then(|c| c.grounding_metadata.as_ref());

    let sources = metadata
        .and_then(|m| m.grounding_chunks.as_ref())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| {
                    let web = chunk.web.as_ref()?;
                    let url = web.uri.as_ref().filter(|u| !u.is_empty())?.clone();
                    Some(Source {
                        url,
                        title: web.title.clone().unwrap_or_default(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Completion { text, sources }
}
