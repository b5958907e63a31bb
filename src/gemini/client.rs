use std::env;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::grounding::extract_completion;
use super::types::{
    ApiError, Completion, Content, GenerateContentRequest, GenerateContentResponse, GoogleSearch,
    Part, Tool,
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Longest slice of an unstructured error body carried into the error message.
const ERROR_SNIPPET_CHARS: usize = 200;

/// Why a completion call produced no text. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is missing or blank (create a key at https://aistudio.google.com/apikey)")]
    ApiKeyNotSet,

    #[error("completion service is rate limiting requests")]
    RateLimited,

    #[error("completion quota used up: {0}")]
    QuotaExhausted(String),

    #[error("completion service returned {code}: {message}")]
    Api { code: u16, message: String },

    #[error("could not reach completion service: {0}")]
    Network(#[from] reqwest::Error),
}

/// One-shot text generation, optionally grounded on web search.
///
/// The model is chosen when the client is built (see [`GeminiClient::from_env`]),
/// so a call only carries the prompt and the grounding switch.
pub trait CompletionClient {
    async fn complete(&self, prompt: &str, web_search: bool) -> Result<Completion, GeminiError>;
}

/// Keeps the key out of `{:?}` output and logs.
#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// `generateContent` over HTTPS, bound to one model.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

/// Trimmed value of `name`, or `None` when unset or blank.
fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GeminiClient {
    /// Reads `GEMINI_API_KEY` (required) and `GEMINI_MODEL` (defaults to
    /// [`DEFAULT_MODEL`]).
    pub fn from_env(http: Client) -> Result<Self, GeminiError> {
        let api_key = non_blank_var("GEMINI_API_KEY").ok_or(GeminiError::ApiKeyNotSet)?;
        let model = non_blank_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key),
            model,
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_for(prompt: &str, web_search: bool) -> GenerateContentRequest {
        let tools = if web_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
                role: None,
            }],
            tools,
        }
    }

    async fn generate_content(
        &self,
        prompt: &str,
        web_search: bool,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "the key header must not travel over plain HTTP"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&Self::request_for(prompt, web_search))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(model = %self.model, "completion request throttled");
            return Err(GeminiError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = rejection(status, &text);
            warn!(model = %self.model, %status, error = %err, "completion request rejected");
            return Err(err);
        }

        let body: GenerateContentResponse = response.json().await?;
        // The service occasionally reports failures inside a 200.
        if let Some(api_error) = &body.error {
            let err = classify_api_error(api_error);
            warn!(model = %self.model, error = %err, "completion succeeded at HTTP level but carried an error");
            return Err(err);
        }

        debug!(model = %self.model, web_search, "completion received");
        Ok(body)
    }
}

impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str, web_search: bool) -> Result<Completion, GeminiError> {
        let response = self.generate_content(prompt, web_search).await?;
        Ok(extract_completion(&response))
    }
}

/// Error for a non-2xx reply. A structured `error` object wins; otherwise the
/// start of the raw body is quoted.
fn rejection(status: StatusCode, body: &str) -> GeminiError {
    let structured = serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(|parsed| parsed.error);
    if let Some(api_error) = structured {
        return classify_api_error(&api_error);
    }

    let snippet: String = body.chars().take(ERROR_SNIPPET_CHARS).collect();
    GeminiError::Api {
        code: status.as_u16(),
        message: format!("HTTP {status}: {snippet}"),
    }
}

/// 429 is throttling and 403 is quota; any other code is passed through.
fn classify_api_error(err: &ApiError) -> GeminiError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "no message".to_string());

    match err.code {
        Some(429) => GeminiError::RateLimited,
        Some(403) => GeminiError::QuotaExhausted(message),
        Some(code) => GeminiError::Api { code, message },
        None => GeminiError::Api {
            code: 0,
            message: format!("no status code: {message}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_429_as_rate_limited() {
        let err = ApiError {
            code: Some(429),
            message: Some("Resource exhausted".into()),
        };
        assert!(matches!(classify_api_error(&err), GeminiError::RateLimited));
    }

    #[test]
    fn classify_403_as_quota_exhausted() {
        let err = ApiError {
            code: Some(403),
            message: Some("Quota exceeded".into()),
        };
        assert!(matches!(
            classify_api_error(&err),
            GeminiError::QuotaExhausted(_)
        ));
    }

    #[test]
    fn classify_missing_code_keeps_message() {
        let err = ApiError {
            code: None,
            message: Some("mystery".into()),
        };
        match classify_api_error(&err) {
            GeminiError::Api { code, message } => {
                assert_eq!(code, 0);
                assert!(message.contains("mystery"));
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn rejection_quotes_start_of_unstructured_body() {
        let body = "x".repeat(500);
        match rejection(StatusCode::BAD_GATEWAY, &body) {
            GeminiError::Api { code, message } => {
                assert_eq!(code, 502);
                assert!(message.starts_with("HTTP 502 Bad Gateway: "));
                assert_eq!(message.matches('x').count(), ERROR_SNIPPET_CHARS);
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn rejection_prefers_structured_error() {
        let body = r#"{"error": {"code": 403, "message": "billing disabled"}}"#;
        match rejection(StatusCode::FORBIDDEN, body) {
            GeminiError::QuotaExhausted(message) => assert_eq!(message, "billing disabled"),
            other => panic!("expected QuotaExhausted, got: {other:?}"),
        }
    }

    #[test]
    fn request_omits_search_tool_when_ungrounded() {
        let request = GeminiClient::request_for("hi", false);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let client = GeminiClient::with_base_url(Client::new(), "http://localhost");
        let debug = format!("{client:?}");
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
