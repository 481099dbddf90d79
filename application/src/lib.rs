//! Application layer for hearth
//!
//! Use cases (the tool dispatcher and the conversation loop) and the ports
//! they drive. Ports are the only way this layer reaches the outside world:
//! the hosted model, the device-control service and the entity registry all
//! live behind async traits whose adapters sit in the infrastructure layer.

pub mod ports;
pub mod use_cases;

pub use ports::{
    device_control::{DeviceControl, DeviceError},
    entity_registry::EntityRegistry,
    model_gateway::{GatewayError, ModelGateway, ModelReply},
    turn_logger::{NoTurnLogger, TurnEvent, TurnLogger},
};
pub use use_cases::{
    dispatch_tool::ToolDispatcher,
    run_turn::{ConversationLoop, LoopConfig, TurnOutcome},
};
