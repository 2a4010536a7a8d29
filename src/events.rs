//! Backend event processing: folds worker events into the client state.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::protocol::ClientEvent;
use crate::state::{Action, ClientState};

/// Map a backend event onto the state transition it causes
pub fn event_action(event: ClientEvent) -> Action {
    match event {
        ClientEvent::Reply { id, response } => Action::ReplyReceived { id, response },
        ClientEvent::Error { id, message } => Action::RequestFailed {
            id,
            reason: message,
        },
        ClientEvent::Stopped => Action::RequestFailed {
            id: None,
            reason: "Backend worker stopped".to_string(),
        },
    }
}

/// Process all pending events from the backend without blocking.
pub fn process_events(event_rx: &Receiver<ClientEvent>, mut state: ClientState) -> ClientState {
    while let Ok(event) = event_rx.try_recv() {
        debug!(?event, "backend event");
        state = state.update(event_action(event)).0;
    }
    state
}

/// Block until the in-flight query settles or `timeout` passes.
///
/// Returns the state unchanged when nothing is in flight. Events for
/// earlier queries are applied (and ignored) without ending the wait. A
/// disconnected channel counts as a stopped worker.
pub fn wait_for_reply(
    event_rx: &Receiver<ClientEvent>,
    mut state: ClientState,
    timeout: Duration,
) -> ClientState {
    let deadline = Instant::now() + timeout;
    while state.is_loading() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match event_rx.recv_timeout(remaining) {
            Ok(event) => {
                debug!(?event, "backend event");
                state = state.update(event_action(event)).0;
            }
            Err(RecvTimeoutError::Timeout) => {
                state = state
                    .update(Action::RequestFailed {
                        id: None,
                        reason: format!("No answer after {}s", timeout.as_secs()),
                    })
                    .0;
            }
            Err(RecvTimeoutError::Disconnected) => {
                state = state.update(event_action(ClientEvent::Stopped)).0;
            }
        }
    }
    // Anything that arrived alongside the answer
    process_events(event_rx, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::QueryResponse;
    use crossbeam_channel::unbounded;

    fn loading_state() -> ClientState {
        ClientState::new()
            .update(Action::EditInput("q".into()))
            .0
            .update(Action::Submit)
            .0
    }

    fn reply(id: u64, answer: &str) -> ClientEvent {
        ClientEvent::Reply {
            id,
            response: QueryResponse {
                answer: answer.into(),
                papers: vec![],
            },
        }
    }

    #[test]
    fn test_process_events_drains_queue() {
        let (tx, rx) = unbounded();
        let state = loading_state();
        let id = state.pending_request.unwrap();
        tx.send(reply(id, "a")).unwrap();
        tx.send(ClientEvent::Error {
            id: None,
            message: "worker failure".into(),
        })
        .unwrap();

        let state = process_events(&rx, state);
        assert_eq!(state.log.len(), 2);
        assert!(!state.is_loading());
        assert_eq!(state.last_error.as_deref(), Some("worker failure"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_wait_skips_reply_to_abandoned_query() {
        let (tx, rx) = unbounded();
        let state = loading_state();
        let abandoned = state.pending_request.unwrap();
        let state = wait_for_reply(&rx, state, Duration::from_millis(20));
        assert!(state.last_error.is_some());

        let state = state
            .update(Action::DismissError)
            .0
            .update(Action::EditInput("next".into()))
            .0
            .update(Action::Submit)
            .0;
        let current = state.pending_request.unwrap();
        assert_ne!(current, abandoned);

        tx.send(reply(abandoned, "stale")).unwrap();
        tx.send(reply(current, "fresh")).unwrap();
        let state = wait_for_reply(&rx, state, Duration::from_secs(5));
        assert!(!state.is_loading());
        assert!(state.last_error.is_none());
        assert_eq!(state.log.last().unwrap().text(), "fresh");
        assert_eq!(state.log.len(), 3);
    }

    #[test]
    fn test_wait_for_reply_not_loading() {
        let (_tx, rx) = unbounded::<ClientEvent>();
        let state = wait_for_reply(&rx, ClientState::new(), Duration::from_secs(5));
        assert_eq!(state, ClientState::new());
    }

    #[test]
    fn test_wait_for_reply_timeout() {
        let (_tx, rx) = unbounded::<ClientEvent>();
        let state = wait_for_reply(&rx, loading_state(), Duration::from_millis(20));
        assert!(!state.is_loading());
        assert!(state.last_error.unwrap().contains("No answer"));
    }

    #[test]
    fn test_wait_for_reply_disconnected() {
        let (tx, rx) = unbounded::<ClientEvent>();
        drop(tx);
        let state = wait_for_reply(&rx, loading_state(), Duration::from_secs(5));
        assert!(!state.is_loading());
        assert_eq!(state.last_error.as_deref(), Some("Backend worker stopped"));
    }
}
