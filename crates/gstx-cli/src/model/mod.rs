//! Generative model seam used by the extraction service.

mod gemini;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use gstx_core::PreparedImage;

pub use gemini::GeminiClient;

/// Errors raised while talking to a model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No API key was found in the configured environment variable.
    #[error("API key not set: export {0}")]
    MissingApiKey(String),

    /// The request could not be sent or the response could not be read.
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The model produced no text.
    #[error("empty response from model")]
    EmptyResponse,
}

/// A single generation request.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub prompt: String,
    pub image: Option<PreparedImage>,
}

impl ModelRequest {
    /// Text-only request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    /// Request carrying an image alongside the prompt.
    pub fn with_image(prompt: impl Into<String>, image: PreparedImage) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// A model that turns a prompt (and optional image) into raw text.
#[async_trait]
pub trait InvoiceModel: Send + Sync {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Generate a response for the request.
    async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

/// Call the model up to `max_attempts` times.
///
/// Attempts that fail or return blank text are retried. After the last attempt
/// the last error is returned, or [`ModelError::EmptyResponse`] if every
/// attempt came back blank.
pub async fn generate_with_retry(
    model: &dyn InvoiceModel,
    request: &ModelRequest,
    max_attempts: u32,
) -> Result<String, ModelError> {
    let max_attempts = max_attempts.max(1);
    let mut last_error = ModelError::EmptyResponse;

    for attempt in 1..=max_attempts {
        debug!("Model attempt {}/{} ({})", attempt, max_attempts, model.name());

        match model.generate(request).await {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => {
                warn!("Empty response from {} on attempt {}", model.name(), attempt);
                last_error = ModelError::EmptyResponse;
            }
            Err(e) => {
                warn!("Attempt {} failed: {}", attempt, e);
                last_error = e;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Model returning canned responses in order, then blank text.
    pub struct ScriptedModel {
        responses: Mutex<VecDeque<Result<String, ModelError>>>,
        pub calls: Mutex<Vec<ModelRequest>>,
    }

    impl ScriptedModel {
        pub fn new(responses: Vec<Result<String, ModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InvoiceModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &ModelRequest) -> Result<String, ModelError> {
            self.calls.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    #[tokio::test]
    async fn test_retry_until_text() {
        let model = ScriptedModel::new(vec![
            Ok("   ".to_string()),
            Err(ModelError::Api {
                status: 500,
                message: "internal".to_string(),
            }),
            Ok("{}".to_string()),
        ]);

        let text = generate_with_retry(&model, &ModelRequest::text("p"), 3)
            .await
            .unwrap();
        assert_eq!(text, "{}");
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_returns_last_error() {
        let model = ScriptedModel::new(vec![
            Ok(String::new()),
            Err(ModelError::Api {
                status: 429,
                message: "quota".to_string(),
            }),
        ]);

        let err = generate_with_retry(&model, &ModelRequest::text("p"), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_all_blank_is_empty_response() {
        let model = ScriptedModel::new(vec![]);
        let err = generate_with_retry(&model, &ModelRequest::text("p"), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyResponse));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let model = ScriptedModel::replying("ok");
        let text = generate_with_retry(&model, &ModelRequest::text("p"), 0)
            .await
            .unwrap();
        assert_eq!(text, "ok");
    }
}
