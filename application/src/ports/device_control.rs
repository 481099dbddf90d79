//! Device control port
//!
//! One `invoke` per resolved target per dispatched tool call. The adapter
//! talks to the actual home platform; this layer never mutates registry
//! state directly — state changes are the effect of invocations.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// A device invocation failed.
#[derive(Error, Debug, Clone)]
#[error("device invocation failed for '{entity_id}': {reason}")]
pub struct DeviceError {
    pub entity_id: String,
    pub reason: String,
}

impl DeviceError {
    pub fn new(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }
}

/// Port for executing a validated action against one entity.
#[async_trait]
pub trait DeviceControl: Send + Sync {
    /// Apply `tool_name` to `entity_id` with already-validated service
    /// arguments (normalized colors, bounded brightness, ...).
    async fn invoke(
        &self,
        entity_id: &str,
        tool_name: &str,
        arguments: &HashMap<String, serde_json::Value>,
    ) -> Result<(), DeviceError>;
}
