//! Cloudflare Workers AI adapter for the model gateway port.

mod gateway;
pub mod protocol;

pub use gateway::{FUNCTION_CALLING_MODELS, WorkersAiGateway};
