//! Conversation loop use case.
//!
//! Drives one user utterance through the multi-round exchange with the
//! hosted model:
//!
//! | State             | Transition                                          |
//! |-------------------|-----------------------------------------------------|
//! | AWAITING_MODEL    | final text → COMPLETED                              |
//! | AWAITING_MODEL    | tool calls → DISPATCHING_TOOLS                      |
//! | DISPATCHING_TOOLS | results appended in call order → AWAITING_MODEL     |
//! | AWAITING_MODEL    | round limit spent → FAILED                          |
//! | any await point   | transport error / timeout / cancellation → FAILED   |
//!
//! FAILED turns speak one generic sentence; the actual error goes to
//! `tracing` and the turn log, never to the user.

use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelReply};
use crate::ports::turn_logger::{NoTurnLogger, TurnEvent, TurnLogger};
use crate::use_cases::dispatch_tool::ToolDispatcher;
use crate::use_cases::shared::{check_cancelled, converse_round};
use hearth_domain::prompt::SystemPrompt;
use hearth_domain::session::entities::Message;
use hearth_domain::session::turn::{TurnState, TurnStatus};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Spoken when the model or device collaborators fail mid-turn.
pub const TRANSPORT_FAILURE_SPEECH: &str =
    "Sorry, I encountered an error processing your request.";
/// Spoken when the round limit is hit.
pub const LOOP_LIMIT_SPEECH: &str =
    "I tried to help but encountered too many steps. Please try again.";
/// Spoken when the turn is cancelled (user barge-in).
pub const CANCELLED_SPEECH: &str = "Sorry, I had to stop before finishing.";

/// Bounds for one turn.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum model rounds per turn; the only loop bound in the engine.
    pub max_rounds: u32,
    /// Deadline for a single model round.
    pub round_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            round_timeout: Duration::from_secs(30),
        }
    }
}

/// Why a turn failed, internally. Users only ever hear the generic speech.
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("round limit reached without a final answer")]
    BoundedLoopExceeded,

    #[error("turn cancelled")]
    Cancelled,
}

impl TurnError {
    fn speech(&self) -> &'static str {
        match self {
            TurnError::Gateway(_) => TRANSPORT_FAILURE_SPEECH,
            TurnError::BoundedLoopExceeded => LOOP_LIMIT_SPEECH,
            TurnError::Cancelled => CANCELLED_SPEECH,
        }
    }
}

/// What a finished turn hands back to the caller.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text to speak/show to the user.
    pub speech: String,
    /// Terminal status of the turn.
    pub status: TurnStatus,
    /// Model rounds consumed.
    pub rounds: u32,
}

/// Use case driving one utterance to completion.
pub struct ConversationLoop<G: ModelGateway> {
    gateway: Arc<G>,
    dispatcher: Arc<ToolDispatcher>,
    config: LoopConfig,
    system_prompt: SystemPrompt,
    cancellation_token: Option<CancellationToken>,
    logger: Arc<dyn TurnLogger>,
}

impl<G: ModelGateway> ConversationLoop<G> {
    pub fn new(gateway: Arc<G>, dispatcher: Arc<ToolDispatcher>) -> Self {
        Self {
            gateway,
            dispatcher,
            config: LoopConfig::default(),
            system_prompt: SystemPrompt::default(),
            cancellation_token: None,
            logger: Arc::new(NoTurnLogger),
        }
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_system_prompt(mut self, prompt: SystemPrompt) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Set a cancellation token for user barge-in.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn TurnLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Run one turn. The state is created here, owned here, and dropped
    /// here — concurrent turns never share it.
    pub async fn run(&self, utterance: &str) -> TurnOutcome {
        let catalog = self.dispatcher.catalog();
        let mut state = TurnState::new(self.system_prompt.render(catalog), utterance);

        self.logger.log(TurnEvent::Started {
            utterance: utterance.to_string(),
            tools: catalog.len(),
        });

        match self.drive(&mut state).await {
            Ok(answer) => {
                state.complete();
                info!(rounds = state.rounds(), "turn completed");
                self.logger.log(TurnEvent::Completed {
                    rounds: state.rounds(),
                    answer: answer.clone(),
                });
                TurnOutcome {
                    speech: answer,
                    status: TurnStatus::Completed,
                    rounds: state.rounds(),
                }
            }
            Err(error) => {
                state.fail();
                warn!(rounds = state.rounds(), %error, "turn failed");
                self.logger.log(TurnEvent::Failed {
                    rounds: state.rounds(),
                    error: error.to_string(),
                });
                TurnOutcome {
                    speech: error.speech().to_string(),
                    status: TurnStatus::Failed,
                    rounds: state.rounds(),
                }
            }
        }
    }

    async fn drive(&self, state: &mut TurnState) -> Result<String, TurnError> {
        let tools = self.dispatcher.catalog().list_definitions();

        loop {
            // Sole place the round counter moves; guarantees termination.
            if !state.begin_round(self.config.max_rounds) {
                return Err(TurnError::BoundedLoopExceeded);
            }
            debug!(round = state.rounds(), "awaiting model");

            let reply = converse_round(
                self.gateway.as_ref(),
                state.transcript(),
                tools,
                self.config.round_timeout,
                &self.cancellation_token,
            )
            .await?;

            match reply {
                ModelReply::Answer(text) => {
                    state.push(Message::assistant(text.clone()));
                    return Ok(text);
                }
                ModelReply::ToolCalls {
                    assistant_text,
                    calls,
                } => {
                    // A cancellation during the model round must not start
                    // dispatching this round's calls.
                    check_cancelled(&self.cancellation_token)?;

                    info!(round = state.rounds(), count = calls.len(), "dispatching tool calls");
                    state.push(Message::assistant(assistant_text));

                    let results = self.dispatcher.dispatch_batch(&calls).await;
                    debug_assert_eq!(results.len(), calls.len());

                    for result in &results {
                        self.logger.log(TurnEvent::ToolResult {
                            call_id: result.call_id.clone(),
                            outcome: result.outcome,
                            message: result.message.clone(),
                        });
                        state.push(Message::tool(result.to_transcript_json()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::device_control::{DeviceControl, DeviceError};
    use crate::ports::entity_registry::EntityRegistry;
    use async_trait::async_trait;
    use hearth_domain::entity::records::{Area, EntityRecord, Floor};
    use hearth_domain::session::entities::Role;
    use hearth_domain::tool::builtin::builtin_catalog;
    use hearth_domain::tool::entities::{ToolCallRequest, ToolDefinition};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TinyHome;

    #[async_trait]
    impl EntityRegistry for TinyHome {
        async fn list_entities(&self) -> Vec<EntityRecord> {
            vec![
                EntityRecord::new("light.sofa", "Sofa Light", "light").in_area("living_room"),
                EntityRecord::new("light.ceiling", "Ceiling Light", "light")
                    .in_area("living_room"),
            ]
        }

        async fn list_areas(&self) -> Vec<Area> {
            vec![Area::new("living_room", "Living Room")]
        }

        async fn list_floors(&self) -> Vec<Floor> {
            Vec::new()
        }

        async fn aliases_for(&self, _entity_id: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[derive(Default)]
    struct CountingDevices {
        invocations: Mutex<Vec<String>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl DeviceControl for CountingDevices {
        async fn invoke(
            &self,
            entity_id: &str,
            _tool_name: &str,
            _arguments: &HashMap<String, serde_json::Value>,
        ) -> Result<(), DeviceError> {
            self.invocations.lock().unwrap().push(entity_id.to_string());
            if self.fail_for.as_deref() == Some(entity_id) {
                return Err(DeviceError::new(entity_id, "bulb offline"));
            }
            Ok(())
        }
    }

    /// Gateway returning scripted replies in order; counts rounds.
    struct ScriptedGateway {
        replies: Mutex<Vec<Result<ModelReply, GatewayError>>>,
        rounds: AtomicUsize,
        /// Captured transcript lengths per round, to assert growth/order.
        transcript_roles: Mutex<Vec<Vec<Role>>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<ModelReply, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                rounds: AtomicUsize::new(0),
                transcript_roles: Mutex::new(Vec::new()),
            }
        }

        fn rounds_seen(&self) -> usize {
            self.rounds.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn converse(
            &self,
            transcript: &[Message],
            _tools: &[ToolDefinition],
        ) -> Result<ModelReply, GatewayError> {
            self.rounds.fetch_add(1, Ordering::SeqCst);
            self.transcript_roles
                .lock()
                .unwrap()
                .push(transcript.iter().map(|m| m.role).collect());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                // Keep asking for tool calls — simulates a looping model.
                return Ok(ModelReply::ToolCalls {
                    assistant_text: String::new(),
                    calls: vec![
                        ToolCallRequest::new("loop", "turn_on").with_arg("name", "sofa light"),
                    ],
                });
            }
            replies.remove(0)
        }
    }

    fn dispatcher(devices: CountingDevices) -> Arc<ToolDispatcher> {
        Arc::new(ToolDispatcher::new(
            builtin_catalog(),
            Arc::new(TinyHome),
            Arc::new(devices),
        ))
    }

    fn tool_calls(calls: Vec<ToolCallRequest>) -> Result<ModelReply, GatewayError> {
        Ok(ModelReply::ToolCalls {
            assistant_text: String::new(),
            calls,
        })
    }

    #[tokio::test]
    async fn test_plain_answer_completes_in_one_round() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(ModelReply::Answer(
            "All quiet at home.".to_string(),
        ))]));
        let outcome = ConversationLoop::new(gateway.clone(), dispatcher(CountingDevices::default()))
            .run("how is the house?")
            .await;

        assert_eq!(outcome.status, TurnStatus::Completed);
        assert_eq!(outcome.speech, "All quiet at home.");
        assert_eq!(outcome.rounds, 1);
        assert_eq!(gateway.rounds_seen(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_calls(vec![
                ToolCallRequest::new("c1", "turn_off")
                    .with_arg("area", "living room")
                    .with_arg("domain", "light"),
            ]),
            Ok(ModelReply::Answer("Turned off both lights.".to_string())),
        ]));
        let devices = CountingDevices::default();
        let loop_ = ConversationLoop::new(gateway.clone(), dispatcher(devices));

        let outcome = loop_.run("turn off all lights in the living room").await;

        assert_eq!(outcome.status, TurnStatus::Completed);
        assert_eq!(outcome.rounds, 2);

        // Second round saw: system, user, assistant (tool-call text), tool.
        let roles = gateway.transcript_roles.lock().unwrap();
        assert_eq!(
            roles[1],
            vec![Role::System, Role::User, Role::Assistant, Role::Tool]
        );
    }

    #[tokio::test]
    async fn test_batch_results_are_appended_in_call_order() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_calls(vec![
                ToolCallRequest::new("first", "turn_on").with_arg("name", "sofa light"),
                ToolCallRequest::new("second", "bad_tool"),
                ToolCallRequest::new("third", "turn_on").with_arg("name", "ceiling light"),
            ]),
            Ok(ModelReply::Answer("done".to_string())),
        ]));
        let loop_ = ConversationLoop::new(gateway.clone(), dispatcher(CountingDevices::default()));

        let outcome = loop_.run("lights please").await;
        assert_eq!(outcome.status, TurnStatus::Completed);

        // One tool message per call, in call order — pull the ids back out
        // of the transcript the model saw in round two.
        let roles = gateway.transcript_roles.lock().unwrap();
        let tool_messages = roles[1].iter().filter(|r| **r == Role::Tool).count();
        assert_eq!(tool_messages, 3);
    }

    #[tokio::test]
    async fn test_looping_model_fails_at_exactly_the_round_limit() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new()));
        let devices = CountingDevices::default();
        let loop_ = ConversationLoop::new(gateway.clone(), dispatcher(devices)).with_config(
            LoopConfig {
                max_rounds: 3,
                round_timeout: Duration::from_secs(5),
            },
        );

        let outcome = loop_.run("never finishes").await;

        assert_eq!(outcome.status, TurnStatus::Failed);
        assert_eq!(outcome.speech, LOOP_LIMIT_SPEECH);
        assert_eq!(outcome.rounds, 3);
        assert_eq!(gateway.rounds_seen(), 3);
    }

    #[tokio::test]
    async fn test_gateway_error_fails_with_generic_speech() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Err(GatewayError::RequestFailed(
            "boom".to_string(),
        ))]));
        let loop_ = ConversationLoop::new(gateway, dispatcher(CountingDevices::default()));

        let outcome = loop_.run("hello").await;

        assert_eq!(outcome.status, TurnStatus::Failed);
        assert_eq!(outcome.speech, TRANSPORT_FAILURE_SPEECH);
        // Internal detail never reaches the user.
        assert!(!outcome.speech.contains("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_round_times_out() {
        struct StalledGateway;

        #[async_trait]
        impl ModelGateway for StalledGateway {
            async fn converse(
                &self,
                _transcript: &[Message],
                _tools: &[ToolDefinition],
            ) -> Result<ModelReply, GatewayError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ModelReply::Answer("too late".to_string()))
            }
        }

        let loop_ = ConversationLoop::new(
            Arc::new(StalledGateway),
            dispatcher(CountingDevices::default()),
        )
        .with_config(LoopConfig {
            max_rounds: 3,
            round_timeout: Duration::from_secs(30),
        });

        let outcome = loop_.run("hello").await;
        assert_eq!(outcome.status, TurnStatus::Failed);
        assert_eq!(outcome.speech, TRANSPORT_FAILURE_SPEECH);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_without_dispatching() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new()));
        let devices = CountingDevices::default();
        let dispatcher = Arc::new(ToolDispatcher::new(
            builtin_catalog(),
            Arc::new(TinyHome),
            Arc::new(devices),
        ));

        let token = CancellationToken::new();
        token.cancel();
        let loop_ = ConversationLoop::new(gateway.clone(), dispatcher)
            .with_cancellation(token);

        let outcome = loop_.run("turn everything off").await;

        assert_eq!(outcome.status, TurnStatus::Failed);
        assert_eq!(outcome.speech, CANCELLED_SPEECH);
        // Cancelled before the first model round; nothing was dispatched.
        assert_eq!(gateway.rounds_seen(), 0);
    }
}
