//! Configuration file schema.
//!
//! Everything is optional with sensible defaults except the Workers AI
//! credentials, which have no default by design.

use hearth_domain::prompt::DEFAULT_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub workers_ai: WorkersAiConfig,
    pub conversation: ConversationConfig,
    pub tools: ToolsConfig,
    pub logging: LoggingConfig,
}

/// `[workers_ai]` — hosted model account and model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersAiConfig {
    /// Cloudflare account id.
    pub account_id: String,
    /// API token with Workers AI access.
    pub api_token: String,
    /// Model identifier (e.g. "@hf/nousresearch/hermes-2-pro-mistral-7b").
    pub model: String,
    /// Completion token budget per round.
    pub max_tokens: u32,
}

impl Default for WorkersAiConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            api_token: String::new(),
            model: "@hf/nousresearch/hermes-2-pro-mistral-7b".to_string(),
            max_tokens: 512,
        }
    }
}

/// `[conversation]` — loop bounds and prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Maximum model rounds per turn.
    pub max_rounds: u32,
    /// Per-round deadline in seconds.
    pub round_timeout_secs: u64,
    /// Base system prompt.
    pub system_prompt: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_timeout_secs: 30,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// `[tools]` — catalog filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// When set, only these tools are advertised to the model.
    pub enabled: Option<Vec<String>>,
}

/// `[logging]` — machine-readable turn log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path for the JSONL turn log; unset disables it.
    pub transcript_path: Option<String>,
}

impl FileConfig {
    /// Credentials present and non-blank.
    pub fn has_credentials(&self) -> bool {
        !self.workers_ai.account_id.trim().is_empty()
            && !self.workers_ai.api_token.trim().is_empty()
    }
}
