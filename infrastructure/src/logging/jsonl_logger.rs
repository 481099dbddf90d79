//! JSONL file adapter for the turn-log port.
//!
//! Each [`TurnEvent`] becomes one JSON object per line, its fields laid out
//! per variant plus a `type` tag and an RFC3339 `timestamp`. Lines are
//! flushed as they are written, so a crashed host still leaves a complete
//! prefix of the turn.

use hearth_application::ports::turn_logger::{TurnEvent, TurnLogger};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Turn logger writing one JSON object per line.
pub struct JsonlTurnLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTurnLogger {
    /// Open (creating parent directories as needed) the log file at `path`.
    ///
    /// Returns `None` when the file cannot be created; the caller falls
    /// back to no logging rather than failing the turn.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let opened = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| File::create(path));

        match opened {
            Ok(file) => Some(Self {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
            Err(e) => {
                warn!("Turn log disabled, cannot open {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: &TurnEvent, timestamp: &str) -> serde_json::Value {
        let mut record = match event {
            TurnEvent::Started { utterance, tools } => serde_json::json!({
                "utterance": utterance,
                "tools": tools,
            }),
            TurnEvent::ToolResult {
                call_id,
                outcome,
                message,
            } => serde_json::json!({
                "call_id": call_id,
                "outcome": outcome,
                "message": message,
            }),
            TurnEvent::Completed { rounds, answer } => serde_json::json!({
                "rounds": rounds,
                "answer": answer,
            }),
            TurnEvent::Failed { rounds, error } => serde_json::json!({
                "rounds": rounds,
                "error": error,
            }),
        };
        record["type"] = serde_json::json!(event.kind());
        record["timestamp"] = serde_json::json!(timestamp);
        record
    }
}

impl TurnLogger for JsonlTurnLogger {
    fn log(&self, event: TurnEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let line = Self::record(&event, &timestamp).to_string();

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_domain::tool::value_objects::ToolOutcome;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .trim()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_one_line_per_event_with_type_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turns.jsonl");
        let logger = JsonlTurnLogger::new(&path).unwrap();

        logger.log(TurnEvent::Started {
            utterance: "turn off the lights".to_string(),
            tools: 10,
        });
        logger.log(TurnEvent::ToolResult {
            call_id: "call_0_0".to_string(),
            outcome: ToolOutcome::Success,
            message: "turn_off succeeded for: Kitchen Light".to_string(),
        });
        logger.log(TurnEvent::Completed {
            rounds: 2,
            answer: "Done.".to_string(),
        });
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert!(line.get("type").is_some());
            assert!(line.get("timestamp").is_some());
        }

        assert_eq!(lines[0]["type"], "turn_started");
        assert_eq!(lines[0]["utterance"], "turn off the lights");
        assert_eq!(lines[0]["tools"], 10);

        assert_eq!(lines[1]["type"], "tool_result");
        assert_eq!(lines[1]["call_id"], "call_0_0");
        assert_eq!(lines[1]["outcome"], "success");

        assert_eq!(lines[2]["type"], "turn_completed");
        assert_eq!(lines[2]["rounds"], 2);
    }

    #[test]
    fn test_failed_turns_carry_the_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failed.jsonl");
        let logger = JsonlTurnLogger::new(&path).unwrap();

        logger.log(TurnEvent::Failed {
            rounds: 10,
            error: "round limit reached without a final answer".to_string(),
        });
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "turn_failed");
        assert!(lines[0]["error"].as_str().unwrap().contains("round limit"));
    }

    #[test]
    fn test_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("turns.jsonl");

        let logger = JsonlTurnLogger::new(&path).unwrap();
        assert_eq!(logger.path(), path);
        assert!(path.parent().unwrap().exists());
    }
}
