//! Conversation session domain: transcript messages and per-utterance turn
//! state.

pub mod entities;
pub mod turn;
