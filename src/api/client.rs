//! OpenRouter completion client.
//!
//! One call is one blocking round trip: resolve the model's budget, size the
//! prompts, trim if they cannot fit, decide on server-side compression, then
//! dispatch and classify the result. No retries; the caller decides what to
//! do with a failure.

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::limits::ModelLimits;
use crate::api::response::interpret_response;
use crate::error::ApiError;
use crate::tokens::{MESSAGE_OVERHEAD_TOKENS, estimate_tokens, trim_to_budget};

/// Production OpenRouter API base.
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Fraction of the context budget above which the middle-out transform is
/// attached, asking the provider to compress long content from the middle
/// rather than truncate one end.
const COMPRESSION_THRESHOLD: f64 = 0.9;

/// Fixed leading instruction so providers render the prompts as markdown.
const LEAD_INSTRUCTION: &str = "Parse the following messages as markdown.";

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transforms: Option<Vec<&'static str>>,
}

/// Client for the OpenRouter chat completion API.
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    limits: ModelLimits,
}

impl OpenRouterClient {
    pub fn new(api_token: &str) -> Self {
        Self::with_base_url(api_token, OPENROUTER_API_BASE)
    }

    /// Construct against a custom API base. Used by tests with mock servers.
    pub fn with_base_url(api_token: &str, base_url: &str) -> Self {
        let http = reqwest::Client::new();
        let base_url = base_url.trim_end_matches('/').to_string();
        let limits = ModelLimits::new(http.clone(), base_url.clone(), api_token.to_string());
        Self {
            http,
            base_url,
            api_token: api_token.to_string(),
            limits,
        }
    }

    /// The budget resolver backing this client.
    pub fn model_limits(&self) -> &ModelLimits {
        &self.limits
    }

    /// Generate a completion for the given prompts.
    ///
    /// Oversized input is trimmed to the model's context budget before
    /// dispatch; when that happens a single warning is emitted and the
    /// request proceeds with the reduced prompts.
    pub async fn generate_completion(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        temperature: Option<f64>,
        stream: bool,
    ) -> Result<String, ApiError> {
        let context_length = self.limits.context_length(model).await;

        let total_estimate =
            estimate_tokens(system_prompt) + estimate_tokens(user_prompt) + MESSAGE_OVERHEAD_TOKENS;
        debug!(
            "Model {model}: context budget {context_length} tokens, estimated input {total_estimate} tokens"
        );

        let (system_prompt, user_prompt, trimmed) = if total_estimate as u64 > context_length {
            let outcome = trim_to_budget(system_prompt, user_prompt, context_length as usize);
            if outcome.trimmed {
                warn!("Input content was trimmed to fit within the model's context length.");
            }
            (outcome.system_prompt, outcome.user_prompt, outcome.trimmed)
        } else {
            (system_prompt.to_string(), user_prompt.to_string(), false)
        };

        // The transform is attached when the estimate crossed the threshold
        // either before or after trimming, so trimmed requests always carry it.
        let estimate_after =
            estimate_tokens(&system_prompt) + estimate_tokens(&user_prompt) + MESSAGE_OVERHEAD_TOKENS;
        let threshold = context_length as f64 * COMPRESSION_THRESHOLD;
        let compressed =
            total_estimate as f64 > threshold || estimate_after as f64 > threshold;

        let payload = CompletionRequest {
            model: model.to_string(),
            messages: vec![
                Message {
                    role: "system",
                    content: LEAD_INSTRUCTION.to_string(),
                },
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_prompt,
                },
            ],
            stream,
            temperature,
            transforms: compressed.then(|| vec!["middle-out"]),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(ApiError::Connectivity)?;

        let ok = response.status().is_success();
        let body = response.text().await.map_err(ApiError::Connectivity)?;

        interpret_response(model, ok, &body, compressed, trimmed)
    }
}
