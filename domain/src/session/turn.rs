//! Per-utterance turn state.
//!
//! A [`TurnState`] exists for exactly one user utterance and is owned by the
//! conversation loop driving it; it is never shared across concurrent
//! utterances. The round counter is only ever advanced through
//! [`TurnState::begin_round`], which is what bounds the loop.

use super::entities::{Message, Role};
use serde::{Deserialize, Serialize};

/// Lifecycle of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    InProgress,
    Completed,
    Failed,
}

impl TurnStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TurnStatus::InProgress)
    }
}

/// Transcript plus round accounting for one utterance.
#[derive(Debug, Clone)]
pub struct TurnState {
    transcript: Vec<Message>,
    rounds: u32,
    status: TurnStatus,
}

impl TurnState {
    /// Start a turn: system context followed by the user utterance.
    pub fn new(system_prompt: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            transcript: vec![Message::system(system_prompt), Message::user(utterance)],
            rounds: 0,
            status: TurnStatus::InProgress,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    pub fn push(&mut self, message: Message) {
        debug_assert!(!self.status.is_terminal(), "pushing into a finished turn");
        self.transcript.push(message);
    }

    /// Account for one model round. Returns false when the configured
    /// maximum is already spent, leaving the counter untouched.
    pub fn begin_round(&mut self, max_rounds: u32) -> bool {
        if self.rounds >= max_rounds {
            return false;
        }
        self.rounds += 1;
        true
    }

    pub fn complete(&mut self) {
        self.status = TurnStatus::Completed;
    }

    pub fn fail(&mut self) {
        self.status = TurnStatus::Failed;
    }

    /// Content of the last assistant message, if any.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}
