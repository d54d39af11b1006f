/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock backend that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds, tagging every segment
 * - `MockProvider::failing()` - Always fails with a non-retryable error
 * - `MockProvider::failing_on_call(n)` - Fails only on the n-th request
 * - `MockProvider::rate_limited(n)` - Rate-limits the first n requests
 * - `MockProvider::merging()` - Merges the last two segments of each request
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::subtitle_processor::BLOCK_SEPARATOR;

/// A request as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tagged translation
    Working,
    /// Always fails with an error
    Failing,
    /// Fails on the given 1-based request number only
    FailOnCall { call: usize },
    /// Returns a rate-limit error for the first `times` requests
    RateLimited { times: usize },
    /// Joins the last two segments, returning one segment fewer
    MergeSegments,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a provider that fails on the given 1-based request
    pub fn failing_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall { call })
    }

    /// Create a provider that rate-limits its first `times` requests
    pub fn rate_limited(times: usize) -> Self {
        Self::new(MockBehavior::RateLimited { times })
    }

    /// Create a provider that drops a segment from every response
    pub fn merging() -> Self {
        Self::new(MockBehavior::MergeSegments)
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Tag every blank-line separated segment with the target language
    pub fn tag_segments(text: &str, target_language: &str) -> String {
        text.split(BLOCK_SEPARATOR)
            .map(|segment| format!("[{}] {}", target_language, segment))
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    fn respond(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::tag_segments(&request.text, &request.target_language),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(&request)),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 400,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::FailOnCall { call: failing_call } => {
                if call == failing_call {
                    Err(ProviderError::RequestFailed(format!(
                        "Simulated failure on request #{}",
                        call
                    )))
                } else {
                    Ok(self.respond(&request))
                }
            }

            MockBehavior::RateLimited { times } => {
                if call <= times {
                    Err(ProviderError::RateLimitExceeded(format!(
                        "Simulated rate limit on request #{}",
                        call
                    )))
                } else {
                    Ok(self.respond(&request))
                }
            }

            MockBehavior::MergeSegments => {
                let translated = self.respond(&request);
                let mut segments: Vec<&str> = translated.split(BLOCK_SEPARATOR).collect();
                if segments.len() >= 2 {
                    let last = segments.pop().unwrap_or_default();
                    let merged = format!("{} {}", segments.pop().unwrap_or_default(), last);
                    let mut out = segments.join(BLOCK_SEPARATOR);
                    if !out.is_empty() {
                        out.push_str(BLOCK_SEPARATOR);
                    }
                    out.push_str(&merged);
                    Ok(out)
                } else {
                    Ok(translated)
                }
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated outage".to_string())),
            _ => Ok(()),
        }
    }
}
