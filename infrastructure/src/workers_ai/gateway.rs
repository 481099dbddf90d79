//! Reqwest-based [`ModelGateway`] adapter for Cloudflare Workers AI.
//!
//! Owns transport, authentication and response decoding. Retry/backoff is
//! deliberately absent: the conversation loop treats any round failure as
//! terminal for the turn, so the adapter reports and steps aside.

use super::protocol;
use crate::config::WorkersAiConfig;
use async_trait::async_trait;
use hearth_application::ports::model_gateway::{GatewayError, ModelGateway, ModelReply};
use hearth_domain::session::entities::Message;
use hearth_domain::tool::entities::ToolDefinition;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4/accounts";

/// Models known to honor the `tools` payload. Others get plain
/// conversation — advertising tools to them produces hallucinated calls.
pub const FUNCTION_CALLING_MODELS: [&str; 5] = [
    "@hf/nousresearch/hermes-2-pro-mistral-7b",
    "@cf/nousresearch/hermes-2-pro-mistral-7b",
    "@cf/meta/llama-3.3-70b-instruct-fp8-fast",
    "@cf/meta/llama-4-scout-17b-16e-instruct",
    "@cf/mistralai/mistral-small-3.1-24b-instruct",
];

/// Workers AI model gateway.
pub struct WorkersAiGateway {
    client: reqwest::Client,
    run_url: String,
    api_token: String,
    model: String,
    max_tokens: u32,
    /// Monotonic round counter feeding unique call ids.
    round: AtomicU32,
}

impl WorkersAiGateway {
    pub fn new(config: &WorkersAiConfig) -> Self {
        Self::with_api_base(config, DEFAULT_API_BASE)
    }

    /// Point the adapter at a different API base (tests, proxies).
    pub fn with_api_base(config: &WorkersAiConfig, api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            run_url: format!(
                "{}/{}/ai/run/{}",
                api_base.trim_end_matches('/'),
                config.account_id,
                config.model
            ),
            api_token: config.api_token.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            round: AtomicU32::new(0),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the configured model is on the function-calling allow-list.
    pub fn supports_function_calling(&self) -> bool {
        FUNCTION_CALLING_MODELS.contains(&self.model.as_str())
    }
}

#[async_trait]
impl ModelGateway for WorkersAiGateway {
    async fn converse(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, GatewayError> {
        let round = self.round.fetch_add(1, Ordering::SeqCst);

        let mut payload = serde_json::json!({
            "messages": protocol::messages_payload(transcript),
            "max_tokens": self.max_tokens,
        });
        if !tools.is_empty() && self.supports_function_calling() {
            payload["tools"] = serde_json::json!(
                tools.iter().map(protocol::tool_to_schema).collect::<Vec<_>>()
            );
        } else if !tools.is_empty() {
            warn!(model = %self.model, "model does not support function calling; tools not advertised");
        }

        debug!(
            model = %self.model,
            messages = transcript.len(),
            tools = tools.len(),
            "sending model round"
        );

        let response = self
            .client
            .post(&self.run_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        protocol::parse_reply(&body, round)
    }
}
