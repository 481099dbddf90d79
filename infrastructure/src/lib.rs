//! Infrastructure layer for hearth
//!
//! Adapters behind the application-layer ports: the Cloudflare Workers AI
//! model gateway, the in-memory home (registry + device control), the
//! figment-based configuration loader and the JSONL turn logger.

pub mod config;
pub mod home;
pub mod logging;
pub mod workers_ai;

pub use config::{ConfigLoader, FileConfig};
pub use home::{HomeFile, InMemoryHome};
pub use logging::JsonlTurnLogger;
pub use workers_ai::WorkersAiGateway;
