use tracing::{debug, info};

use crate::gemini::{CompletionClient, GeminiError};
use crate::search::filters::SearchFilters;
use crate::search::prompt::build_paper_search_prompt;

/// Sends one grounded paper-search request and returns the model's raw reply.
///
/// Exactly one call is made. Failures are returned as-is.
pub async fn dispatch(
    client: &impl CompletionClient,
    filters: &SearchFilters,
) -> Result<String, GeminiError> {
    let prompt = build_paper_search_prompt(
        &filters.query,
        filters.year_start,
        filters.year_end,
        filters.max_results,
    );

    info!(
        query = %filters.query,
        year_start = filters.year_start,
        year_end = filters.year_end,
        max_results = filters.max_results,
        "dispatching paper search"
    );
    debug!(
        min_citations = filters.min_citations,
        "min_citations is recorded but not applied"
    );

    let completion = client.complete(&prompt, true).await?;

    debug!(
        chars = completion.text.len(),
        sources = completion.sources.len(),
        "paper search reply received"
    );
    for source in &completion.sources {
        debug!(url = %source.url, title = %source.title, "grounding source");
    }
    Ok(completion.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::MockCompletion;

    fn filters(query: &str) -> SearchFilters {
        SearchFilters {
            query: query.into(),
            year_start: 2016,
            year_end: 2022,
            ..SearchFilters::default()
        }
    }

    #[tokio::test]
    async fn sends_grounded_prompt_and_returns_text() {
        let mock = MockCompletion::replying(&["[]"]);

        let text = dispatch(&mock, &filters("sepsis prediction")).await.unwrap();

        assert_eq!(text, "[]");
        let calls = mock.captured_calls();
        assert_eq!(calls.len(), 1);
        let (prompt, web_search) = &calls[0];
        assert!(*web_search);
        assert!(prompt.contains("sepsis prediction"));
        assert!(prompt.contains("2016 to 2022"));
    }

    #[tokio::test]
    async fn transport_error_is_propagated_without_retry() {
        let mock = MockCompletion::failing(GeminiError::RateLimited);

        let err = dispatch(&mock, &filters("x")).await.unwrap_err();

        assert!(matches!(err, GeminiError::RateLimited));
        assert_eq!(mock.captured_calls().len(), 1);
    }
}
