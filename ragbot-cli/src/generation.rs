//! Answer generation through Ollama's `/api/generate` endpoint.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors from the generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The Ollama server could not be reached at all.
    #[error("Cannot reach Ollama at {url}. Start it with `ollama serve`, then run: ollama pull {model}")]
    Unreachable {
        /// Endpoint that was tried.
        url: String,
        /// Model that was requested.
        model: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The model did not answer in time.
    #[error("Ollama did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    /// Ollama answered with an error status.
    #[error("Ollama returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// The response body was not the expected JSON.
    #[error("Failed to decode Ollama response: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Sampling options forwarded to Ollama.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GenerationOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub num_predict: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.3, num_predict: 512 }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// A generated answer and how long it took.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The trimmed completion.
    pub answer: String,
    /// Wall-clock time of the call.
    pub elapsed: Duration,
}

/// Client for a single Ollama model.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    options: GenerationOptions,
    timeout: Duration,
}

impl OllamaGenerator {
    /// Create a client for `model` on the server at `base_url`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        options: GenerationOptions,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client =
            reqwest::Client::builder().timeout(timeout).build().map_err(GenerationError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            options,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest { model: &self.model, prompt, stream: false, options: self.options }
    }

    /// Send `prompt` and wait for the full completion.
    pub async fn generate(&self, prompt: &str) -> Result<Generation, GenerationError> {
        let started = Instant::now();
        let url = self.endpoint();
        debug!(model = %self.model, prompt_chars = prompt.len(), "calling ollama");

        let response =
            self.client.post(&url).json(&self.request(prompt)).send().await.map_err(|e| {
                error!(url = %url, error = %e, "generation request failed");
                self.transport_error(&url, e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);
            error!(%status, "ollama API error");
            return Err(GenerationError::Api { status: status.as_u16(), message });
        }

        let body = response.text().await.map_err(|e| self.transport_error(&url, e))?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))?;

        let elapsed = started.elapsed();
        info!(model = %self.model, elapsed_ms = elapsed.as_millis() as u64, "generated answer");
        Ok(Generation { answer: parsed.response.trim().to_string(), elapsed })
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Unreachable {
                url: url.to_string(),
                model: self.model.clone(),
                source: err,
            }
        }
    }
}
