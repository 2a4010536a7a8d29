//! Backend worker thread and the remote API it talks to.
//!
//! The UI never awaits anything: it pushes `BackendAction`s into a channel
//! and drains `ClientEvent`s whenever it redraws.

pub mod api;
pub mod main_loop;

pub use api::{ChatApi, HttpApi};
pub use main_loop::run_backend;

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::protocol::{BackendAction, ClientEvent};

/// UI side of a running backend worker
pub struct BackendHandle {
    action_tx: Sender<BackendAction>,
    event_rx: Receiver<ClientEvent>,
    thread: JoinHandle<()>,
}

/// Start the worker thread for `api`.
pub fn spawn_backend<A>(api: A, request_timeout: Duration) -> Result<BackendHandle>
where
    A: ChatApi + Send + 'static,
{
    let (action_tx, action_rx) = unbounded::<BackendAction>();
    let (event_tx, event_rx) = unbounded::<ClientEvent>();

    let thread = thread::Builder::new()
        .name("backend".into())
        .spawn(move || run_backend(api, request_timeout, action_rx, event_tx))?;

    Ok(BackendHandle {
        action_tx,
        event_rx,
        thread,
    })
}

impl BackendHandle {
    pub fn send(&self, action: BackendAction) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|_| ClientError::BackendUnavailable)
    }

    pub fn events(&self) -> &Receiver<ClientEvent> {
        &self.event_rx
    }

    /// Ask the worker to stop and wait for it.
    pub fn shutdown(self) {
        let _ = self.action_tx.send(BackendAction::Shutdown);
        let _ = self.thread.join();
    }
}
