/*!
 * Translation backends.
 *
 * This module contains client implementations for the services that can
 * translate subtitle text:
 * - Google: the public Google Translate web endpoint
 * - Ollama: a local LLM server
 * - Mock: deterministic in-process backend for tests
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// A backend is constructed once per run and handed to the translator, so
/// implementations should keep their HTTP client and settings inside.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Translate `text` from `source_language` to `target_language`
    ///
    /// # Arguments
    /// * `text` - Text to translate; may contain blank-line separated segments
    /// * `source_language` - ISO code of the input text
    /// * `target_language` - ISO code to translate into
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the backend
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Build the configured backend
pub fn from_config(config: &TranslationConfig) -> Result<Box<dyn Provider>> {
    let provider: Box<dyn Provider> = match config.provider {
        TranslationProvider::Google => Box::new(google::GoogleTranslate::new(&config.google)?),
        TranslationProvider::Ollama => Box::new(ollama::Ollama::new(&config.ollama)?),
    };
    Ok(provider)
}

/// Map a transport-level reqwest error onto a provider error
pub(crate) fn map_request_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Turn a non-success HTTP response into a provider error
pub(crate) async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimitExceeded(message)
    } else {
        ProviderError::ApiError {
            status_code: status.as_u16(),
            message,
        }
    }
}

pub mod google;
pub mod mock;
pub mod ollama;
