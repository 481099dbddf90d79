//! Workers AI wire format.
//!
//! The run endpoint wraps payloads in a `{result, success, errors}` envelope
//! and models differ in how they return the final text, so decoding is
//! deliberately lenient: try `response`, then the OpenAI-style
//! `choices[0].message.content`, then `content`. Tool calls arrive as
//! `tool_calls: [{name, arguments}]` with no ids — ids are assigned here,
//! unique within the turn.

use hearth_application::ports::model_gateway::{GatewayError, ModelReply};
use hearth_domain::session::entities::Message;
use hearth_domain::tool::entities::{ParamKind, ToolCallRequest, ToolDefinition};
use std::collections::HashMap;

/// Fallback when a response carries neither text nor tool calls.
const FALLBACK_TEXT: &str = "I processed your request.";

/// Convert one definition to the function-calling schema the API expects.
pub fn tool_to_schema(def: &ToolDefinition) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in &def.parameters {
        let mut prop = serde_json::Map::new();
        prop.insert(
            "type".to_string(),
            serde_json::json!(param.kind.schema_type()),
        );
        prop.insert(
            "description".to_string(),
            serde_json::json!(param.description),
        );
        match &param.kind {
            ParamKind::Enum { values } => {
                prop.insert("enum".to_string(), serde_json::json!(values));
            }
            ParamKind::Integer { min, max } => {
                if let Some(min) = min {
                    prop.insert("minimum".to_string(), serde_json::json!(min));
                }
                if let Some(max) = max {
                    prop.insert("maximum".to_string(), serde_json::json!(max));
                }
            }
            _ => {}
        }
        properties.insert(param.name.clone(), serde_json::Value::Object(prop));

        if param.required {
            required.push(serde_json::json!(param.name));
        }
    }

    serde_json::json!({
        "name": def.name,
        "description": def.description,
        "parameters": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

/// Transcript messages in wire form.
pub fn messages_payload(transcript: &[Message]) -> serde_json::Value {
    serde_json::json!(
        transcript
            .iter()
            .map(|m| serde_json::json!({ "role": m.role.as_str(), "content": m.content }))
            .collect::<Vec<_>>()
    )
}

/// Decode one API response body into a [`ModelReply`].
///
/// `round` feeds the assigned call ids (`call_<round>_<index>`).
pub fn parse_reply(body: &serde_json::Value, round: u32) -> Result<ModelReply, GatewayError> {
    // Unwrap the {result, success, errors} envelope when present.
    let result = match body.get("result") {
        Some(result) => result,
        None => body,
    };

    if let Some(calls) = result.get("tool_calls").and_then(|v| v.as_array())
        && !calls.is_empty()
    {
        let assistant_text = result
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let calls = decode_tool_calls(calls, round)?;
        return Ok(ModelReply::ToolCalls {
            assistant_text,
            calls,
        });
    }

    Ok(ModelReply::Answer(extract_text(result)))
}

fn decode_tool_calls(
    calls: &[serde_json::Value],
    round: u32,
) -> Result<Vec<ToolCallRequest>, GatewayError> {
    calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            let name = call.get("name").and_then(|v| v.as_str()).ok_or_else(|| {
                GatewayError::InvalidResponse("tool call without a name".to_string())
            })?;

            let arguments: HashMap<String, serde_json::Value> = match call.get("arguments") {
                Some(serde_json::Value::Object(map)) => {
                    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
                }
                // Some models return arguments as a JSON-encoded string.
                Some(serde_json::Value::String(s)) => serde_json::from_str(s).map_err(|e| {
                    GatewayError::InvalidResponse(format!(
                        "tool call arguments are not valid JSON: {}",
                        e
                    ))
                })?,
                Some(serde_json::Value::Null) | None => HashMap::new(),
                Some(other) => {
                    return Err(GatewayError::InvalidResponse(format!(
                        "unexpected tool call arguments: {}",
                        other
                    )));
                }
            };

            Ok(ToolCallRequest {
                call_id: format!("call_{}_{}", round, index),
                tool_name: name.to_string(),
                arguments,
            })
        })
        .collect()
}

/// Lenient final-text extraction across known response shapes.
fn extract_text(result: &serde_json::Value) -> String {
    if let Some(text) = result.as_str() {
        return text.to_string();
    }
    if let Some(text) = result.get("response").and_then(|v| v.as_str()) {
        return text.to_string();
    }
    if let Some(text) = result
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|v| v.as_str())
    {
        return text.to_string();
    }
    if let Some(text) = result.get("content").and_then(|v| v.as_str()) {
        return text.to_string();
    }
    FALLBACK_TEXT.to_string()
}
