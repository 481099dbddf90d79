//! Schema validation of untrusted tool-call arguments.
//!
//! The model's output is external input: every call is checked against its
//! [`ToolDefinition`] before anything else happens. Violations are reported
//! as messages naming the offending field, never as panics.

use super::entities::{ParamKind, ToolCallRequest, ToolDefinition};
use std::collections::HashSet;

/// Validate a call's raw arguments against the tool's parameter schema.
///
/// Checks, in order: required parameters present, no unknown parameters,
/// each value matches its declared [`ParamKind`] (type, enum membership,
/// integer bounds).
pub fn validate_arguments(call: &ToolCallRequest, def: &ToolDefinition) -> Result<(), String> {
    for param in &def.parameters {
        if param.required && !call.arguments.contains_key(&param.name) {
            return Err(format!(
                "Missing required parameter '{}' for tool '{}'",
                param.name, def.name
            ));
        }
    }

    let known: HashSet<&str> = def.parameters.iter().map(|p| p.name.as_str()).collect();
    for arg_name in call.arguments.keys() {
        if !known.contains(arg_name.as_str()) {
            return Err(format!(
                "Unknown parameter '{}' for tool '{}'",
                arg_name, def.name
            ));
        }
    }

    for param in &def.parameters {
        let Some(value) = call.arguments.get(&param.name) else {
            continue;
        };
        check_kind(&param.name, value, &param.kind)?;
    }

    Ok(())
}

fn check_kind(name: &str, value: &serde_json::Value, kind: &ParamKind) -> Result<(), String> {
    match kind {
        ParamKind::String => {
            if !value.is_string() {
                return Err(format!("Parameter '{}' must be a string", name));
            }
        }
        ParamKind::Integer { min, max } => {
            let Some(n) = value.as_i64() else {
                return Err(format!("Parameter '{}' must be an integer", name));
            };
            if let Some(min) = min
                && n < *min
            {
                return Err(format!("Parameter '{}' must be at least {}", name, min));
            }
            if let Some(max) = max
                && n > *max
            {
                return Err(format!("Parameter '{}' must be at most {}", name, max));
            }
        }
        ParamKind::Number => {
            if value.as_f64().is_none() {
                return Err(format!("Parameter '{}' must be a number", name));
            }
        }
        ParamKind::Boolean => {
            if !value.is_boolean() {
                return Err(format!("Parameter '{}' must be a boolean", name));
            }
        }
        ParamKind::Enum { values } => {
            let Some(s) = value.as_str() else {
                return Err(format!("Parameter '{}' must be a string", name));
            };
            if !values.iter().any(|a| a == s) {
                return Err(format!(
                    "Parameter '{}' must be one of: {}",
                    name,
                    values.join(", ")
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{Targeting, ToolParameter};

    fn light_set_def() -> ToolDefinition {
        ToolDefinition::new("light_set", "Set light state", Targeting::Multi)
            .with_parameter(ToolParameter::new("name", "Device name", true))
            .with_parameter(
                ToolParameter::new("brightness", "Percent", false)
                    .with_kind(ParamKind::integer_range(0, 100)),
            )
            .with_parameter(
                ToolParameter::new("domain", "Entity domain", false)
                    .with_kind(ParamKind::one_of(["light", "switch"])),
            )
    }

    #[test]
    fn test_missing_required_parameter_is_rejected() {
        let call = ToolCallRequest::new("c1", "light_set").with_arg("brightness", 50);
        let err = validate_arguments(&call, &light_set_def()).unwrap_err();
        assert!(err.contains("Missing required parameter 'name'"));
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let call = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "lamp")
            .with_arg("entity_id", "light.lamp");
        let err = validate_arguments(&call, &light_set_def()).unwrap_err();
        assert!(err.contains("Unknown parameter 'entity_id'"));
    }

    #[test]
    fn test_type_mismatch_names_the_field() {
        let call = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "lamp")
            .with_arg("brightness", "bright");
        let err = validate_arguments(&call, &light_set_def()).unwrap_err();
        assert!(err.contains("'brightness'"));
        assert!(err.contains("integer"));
    }

    #[test]
    fn test_integer_bounds_are_enforced() {
        let call = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "lamp")
            .with_arg("brightness", 150);
        let err = validate_arguments(&call, &light_set_def()).unwrap_err();
        assert!(err.contains("at most 100"));
    }

    #[test]
    fn test_enum_membership_is_enforced() {
        let call = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "lamp")
            .with_arg("domain", "spaceship");
        let err = validate_arguments(&call, &light_set_def()).unwrap_err();
        assert!(err.contains("must be one of"));
    }

    #[test]
    fn test_valid_call_passes() {
        let call = ToolCallRequest::new("c1", "light_set")
            .with_arg("name", "lamp")
            .with_arg("brightness", 40)
            .with_arg("domain", "light");
        assert!(validate_arguments(&call, &light_set_def()).is_ok());
    }
}
