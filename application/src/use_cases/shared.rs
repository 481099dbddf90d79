//! Shared helpers for use cases: cancellation checking and the
//! timeout-bounded, cancellable model round.

use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelReply};
use crate::use_cases::run_turn::TurnError;
use hearth_domain::session::entities::Message;
use hearth_domain::tool::entities::ToolDefinition;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(TurnError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), TurnError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(TurnError::Cancelled);
    }
    Ok(())
}

/// Run one model round with the per-round timeout, aborting the in-flight
/// await as soon as the token fires. A timeout is a gateway failure, never
/// a retry.
pub(crate) async fn converse_round<G: ModelGateway>(
    gateway: &G,
    transcript: &[Message],
    tools: &[ToolDefinition],
    round_timeout: Duration,
    token: &Option<CancellationToken>,
) -> Result<ModelReply, TurnError> {
    check_cancelled(token)?;

    let bounded = tokio::time::timeout(round_timeout, gateway.converse(transcript, tools));
    let result = match token {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => return Err(TurnError::Cancelled),
                result = bounded => result,
            }
        }
        None => bounded.await,
    };

    match result {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(error)) => Err(TurnError::Gateway(error)),
        Err(_elapsed) => Err(TurnError::Gateway(GatewayError::Timeout)),
    }
}
