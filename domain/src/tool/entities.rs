//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a tool selects the entities it acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Targeting {
    /// The tool acts on exactly one entity; a multi-entity resolution
    /// is reported as ambiguous.
    Single,
    /// The tool acts on every resolved entity (e.g. "turn off all lights
    /// in the living room").
    Multi,
}

impl Targeting {
    pub fn accepts_multiple(&self) -> bool {
        matches!(self, Targeting::Multi)
    }
}

/// Primitive parameter type with optional constraints.
///
/// This is the whole constraint language the dispatcher validates against;
/// the model never sees anything the catalog cannot check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Number,
    Boolean,
    Enum {
        values: Vec<String>,
    },
}

impl ParamKind {
    pub fn integer() -> Self {
        ParamKind::Integer {
            min: None,
            max: None,
        }
    }

    pub fn integer_range(min: i64, max: i64) -> Self {
        ParamKind::Integer {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn one_of(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ParamKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// JSON Schema type name for this kind.
    pub fn schema_type(&self) -> &'static str {
        match self {
            ParamKind::String | ParamKind::Enum { .. } => "string",
            ParamKind::Integer { .. } => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description (shown to the model)
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Type and constraints
    pub kind: ParamKind,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            kind: ParamKind::String,
        }
    }

    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Definition of a tool the model can call.
///
/// Identity is the name; definitions are immutable once the catalog is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g. "turn_off")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// How the tool targets entities
    pub targeting: Targeting,
    /// Implied entity-domain filter (e.g. "light" for light_set),
    /// intersected with any domain the model passes explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_scope: Option<String>,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        targeting: Targeting,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            targeting,
            domain_scope: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_domain_scope(mut self, domain: impl Into<String>) -> Self {
        self.domain_scope = Some(domain.into());
        self
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Whether the schema declares a color parameter (routed through the
    /// color interpreter by the dispatcher).
    pub fn has_color_parameter(&self) -> bool {
        self.parameter("color").is_some()
    }
}

/// The fixed, ordered catalog of tools advertised to the model.
///
/// Iteration order is the registration order and is stable across a process
/// lifetime, so the model sees the same catalog every round.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition (builder pattern). A duplicate name
    /// replaces the earlier definition in place, keeping its position.
    pub fn register(mut self, tool: ToolDefinition) -> Self {
        match self.index.get(&tool.name) {
            Some(&i) => self.tools[i] = tool,
            None => {
                self.index.insert(tool.name.clone(), self.tools.len());
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// All definitions in stable registration order.
    pub fn list_definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// A catalog restricted to the named tools, preserving order.
    /// Unknown names in `enabled` are ignored.
    pub fn filtered(&self, enabled: &[String]) -> ToolCatalog {
        self.tools
            .iter()
            .filter(|t| enabled.iter().any(|e| e == &t.name))
            .cloned()
            .fold(ToolCatalog::new(), |cat, t| cat.register(t))
    }
}

/// A tool invocation decoded from the model's reply.
///
/// Untrusted until validated against its [`ToolDefinition`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call id, unique within one turn (assigned by the gateway adapter)
    pub call_id: String,
    /// Name of the tool the model asked for
    pub tool_name: String,
    /// Raw, unvalidated arguments
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCallRequest {
    pub fn new(call_id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get an i64 argument
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.arguments.get(key).and_then(|v| v.as_i64())
    }

    /// Get an f64 argument
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(|v| v.as_f64())
    }
}
