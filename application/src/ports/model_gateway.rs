//! Model gateway port
//!
//! Defines the interface for one request/response exchange (a "round") with
//! the hosted model. The adapter owns transport, authentication and
//! rate-limit concerns; the conversation loop only sees the decoded reply.

use async_trait::async_trait;
use hearth_domain::session::entities::Message;
use hearth_domain::tool::entities::{ToolCallRequest, ToolDefinition};
use thiserror::Error;

/// Errors that can occur talking to the hosted model.
///
/// None of these are recoverable within the turn; the loop fails the turn
/// and surfaces a generic message to the user.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("model returned an unusable response: {0}")]
    InvalidResponse(String),

    #[error("model '{0}' is not available")]
    ModelNotAvailable(String),

    #[error("authentication rejected")]
    Unauthorized,

    #[error("round timed out")]
    Timeout,
}

/// What the model produced for one round.
#[derive(Debug, Clone)]
pub enum ModelReply {
    /// A final natural-language answer — the turn is done.
    Answer(String),
    /// One or more tool invocations to dispatch before the next round.
    ToolCalls {
        /// Any assistant text accompanying the calls (may be empty);
        /// appended to the transcript before the tool results.
        assistant_text: String,
        /// Decoded calls, in the order the model issued them.
        calls: Vec<ToolCallRequest>,
    },
}

impl ModelReply {
    pub fn is_final(&self) -> bool {
        matches!(self, ModelReply::Answer(_))
    }
}

/// Gateway for hosted-model conversation with function calling.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Run one round: send the running transcript plus the advertised tool
    /// catalog, receive either a final answer or a batch of tool calls.
    async fn converse(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, GatewayError>;
}
