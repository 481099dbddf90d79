//! System prompt assembly.
//!
//! Small hosted models need the targeting rules spelled out or they invent
//! tool names and parameters; the guidance addendum is generated from the
//! live catalog so prompt and schema can never drift apart.

use crate::tool::builtin::SUPPORTED_DOMAINS;
use crate::tool::entities::ToolCatalog;

/// Base instruction used when the configuration does not override it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a voice assistant for a smart home.\n\
Your job is to help users control their devices and answer questions.\n\
Be concise and helpful.";

/// Builder for the per-turn system prompt.
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    base: String,
}

impl SystemPrompt {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// Render the prompt. With a non-empty catalog, the tool-guidance
    /// addendum lists the exact tool names and the targeting rules.
    pub fn render(&self, catalog: &ToolCatalog) -> String {
        if catalog.is_empty() {
            return self.base.clone();
        }

        let tool_names: Vec<&str> = catalog.names().collect();
        format!(
            "{base}\n\n\
             IMPORTANT: You have access to these exact tools: {tools}. \
             You MUST use these exact tool names - do not invent new tool names.\n\n\
             TOOL TARGETING RULES:\n\
             - Use the 'name' parameter with the EXACT device name as the user says it\n\
             - When the user says 'table', use name 'table', NOT 'table light' or 'table lamp'\n\
             - When the user says 'all lights in [area]', use area '[area]' with domain 'light'\n\
             - Use 'floor' to target every device on a floor (e.g. floor 'upstairs' with domain 'light')\n\
             - NEVER pass an 'entity_id' parameter - it is not supported\n\
             - For color changes use 'name' plus 'color' (e.g. name 'kitchen', color 'red')\n\
             - Available domains: {domains}",
            base = self.base,
            tools = tool_names.join(", "),
            domains = SUPPORTED_DOMAINS.join(", "),
        )
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::builtin::builtin_catalog;

    #[test]
    fn test_empty_catalog_renders_base_only() {
        let prompt = SystemPrompt::new("base prompt");
        assert_eq!(prompt.render(&ToolCatalog::new()), "base prompt");
    }

    #[test]
    fn test_addendum_names_every_tool() {
        let catalog = builtin_catalog();
        let rendered = SystemPrompt::default().render(&catalog);
        for name in catalog.names() {
            assert!(rendered.contains(name), "prompt must mention '{}'", name);
        }
        assert!(rendered.contains("Available domains: light"));
        assert!(rendered.starts_with(DEFAULT_SYSTEM_PROMPT));
    }
}
