//! Configuration: file schema and multi-source loader.

mod file_config;
mod loader;

pub use file_config::{
    ConversationConfig, FileConfig, LoggingConfig, ToolsConfig, WorkersAiConfig,
};
pub use loader::ConfigLoader;
