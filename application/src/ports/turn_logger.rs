//! Port for structured turn logging.
//!
//! Separate from `tracing`-based operation logs: tracing carries
//! human-readable diagnostics, while this port captures the machine-readable
//! record of each turn for audit. Events are typed — an adapter decides how
//! to persist them, not what they contain.

use hearth_domain::tool::value_objects::ToolOutcome;

/// A notable moment in a turn's lifecycle.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// A turn began processing an utterance.
    Started {
        utterance: String,
        /// Number of tools advertised to the model.
        tools: usize,
    },
    /// One tool call was dispatched and produced a result.
    ToolResult {
        call_id: String,
        outcome: ToolOutcome,
        message: String,
    },
    /// The turn ended with a final answer.
    Completed { rounds: u32, answer: String },
    /// The turn failed; `error` is the internal detail the user never hears.
    Failed { rounds: u32, error: String },
}

impl TurnEvent {
    /// Stable identifier for the event variant.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnEvent::Started { .. } => "turn_started",
            TurnEvent::ToolResult { .. } => "tool_result",
            TurnEvent::Completed { .. } => "turn_completed",
            TurnEvent::Failed { .. } => "turn_failed",
        }
    }
}

/// Port for recording turn events.
///
/// `log` is intentionally synchronous and non-fallible so logging can never
/// disrupt a turn; failures are dropped by the adapter.
pub trait TurnLogger: Send + Sync {
    fn log(&self, event: TurnEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTurnLogger;

impl TurnLogger for NoTurnLogger {
    fn log(&self, _event: TurnEvent) {}
}
