//! Tool domain value objects — the structured results fed back to the model.
//!
//! Every [`ToolCallRequest`](super::entities::ToolCallRequest) produces
//! exactly one [`ToolCallResult`], success or not; the conversation loop
//! never drops a call silently. Recoverable failures (no match, ambiguity,
//! bad arguments, device errors) are carried in [`ToolOutcome`] so the model
//! can react — they are results, not exceptions.

use serde::{Deserialize, Serialize};

/// Outcome category of a dispatched tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Every resolved target was acted on successfully.
    Success,
    /// The target description matched nothing in the registry.
    EntityNotFound,
    /// The target description matched more than the tool can act on;
    /// the message enumerates the candidates.
    Ambiguous,
    /// The call failed schema validation (or used an unknown tool / an
    /// unrecognized color).
    ValidationError,
    /// The device collaborator failed for at least one target.
    ExecutionError,
}

impl ToolOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolOutcome::Success => "success",
            ToolOutcome::EntityNotFound => "entity_not_found",
            ToolOutcome::Ambiguous => "ambiguous",
            ToolOutcome::ValidationError => "validation_error",
            ToolOutcome::ExecutionError => "execution_error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success)
    }
}

impl std::fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of dispatching one tool call.
///
/// The `message` is written for the model: on ambiguity it lists candidate
/// names, on partial failure it names what failed, so the model can ask the
/// user or retry with a narrower query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Call id this result answers
    pub call_id: String,
    /// Outcome category
    pub outcome: ToolOutcome,
    /// Structured payload (e.g. acted-on targets, partial-failure detail)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Human-readable summary for the model
    pub message: String,
}

impl ToolCallResult {
    pub fn success(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::Success,
            payload: None,
            message: message.into(),
        }
    }

    pub fn entity_not_found(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::EntityNotFound,
            payload: None,
            message: message.into(),
        }
    }

    pub fn ambiguous(call_id: impl Into<String>, candidates: &[String]) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::Ambiguous,
            payload: Some(serde_json::json!({ "candidates": candidates })),
            message: format!(
                "More than one device matches: {}. Ask the user which one, or narrow the query with an area or domain.",
                candidates.join(", ")
            ),
        }
    }

    pub fn validation_error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::ValidationError,
            payload: None,
            message: message.into(),
        }
    }

    pub fn execution_error(call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome: ToolOutcome::ExecutionError,
            payload: None,
            message: message.into(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Serialize for a transcript Tool message (what the model reads next
    /// round).
    pub fn to_transcript_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"call_id\":\"{}\",\"outcome\":\"{}\"}}",
                self.call_id, self.outcome
            )
        })
    }
}
