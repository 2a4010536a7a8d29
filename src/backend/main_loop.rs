//! Backend worker loop: one query at a time, results reported as events.

use crossbeam_channel::{Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::api::ChatApi;
use crate::error::{ClientError, Result};
use crate::protocol::{BackendAction, ClientEvent, QueryRequest, QueryResponse};

/// Run the backend event loop on a tokio runtime.
///
/// Returns once `Shutdown` arrives, the action sender is dropped, or the UI
/// stops listening for events. `Stopped` is always the last event sent.
pub fn run_backend<A: ChatApi>(
    api: A,
    request_timeout: Duration,
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<ClientEvent>,
) {
    // Create a Tokio runtime for this thread
    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = event_tx.send(ClientEvent::Error {
                id: None,
                message: format!("Failed to create Tokio runtime: {}", e),
            });
            let _ = event_tx.send(ClientEvent::Stopped);
            return;
        }
    };
    info!("backend worker started");

    while let Ok(action) = action_rx.recv() {
        match action {
            BackendAction::SendQuery(request) => {
                debug!(id = request.id, mode = ?request.mode, chars = request.message.chars().count(), "sending query");
                let event = match rt.block_on(send_query(&api, &request, request_timeout)) {
                    Ok(response) => {
                        info!(id = request.id, papers = response.papers.len(), "query answered");
                        ClientEvent::Reply {
                            id: request.id,
                            response,
                        }
                    }
                    Err(e) => {
                        warn!(id = request.id, error = %e, "query failed");
                        ClientEvent::Error {
                            id: Some(request.id),
                            message: e.to_string(),
                        }
                    }
                };
                if event_tx.send(event).is_err() {
                    debug!("event receiver dropped");
                    break;
                }
            }
            BackendAction::Shutdown => break,
        }
    }

    let _ = event_tx.send(ClientEvent::Stopped);
    info!("backend worker stopped");
}

async fn send_query<A: ChatApi>(
    api: &A,
    request: &QueryRequest,
    limit: Duration,
) -> Result<QueryResponse> {
    match timeout(limit, api.query(request)).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(limit.as_secs())),
    }
}
