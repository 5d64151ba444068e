//! Single-use local HTTP listener for the OAuth redirect.
//!
//! The listener accepts any number of HTTP requests but only the first one
//! decides the outcome: an atomic guard flips on the first request, which is
//! answered with a self-closing page and resolves a one-shot channel. Every
//! later request gets an "already answered" reply. After answering, the socket
//! is closed once a short grace period has passed so the page reaches the
//! browser. Dropping or cancelling the listener closes the socket right away.

use std::{
    future::Future,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::Router;
use tokio::{
    net::TcpListener,
    sync::{Notify, oneshot},
    task::JoinHandle,
};

use crate::{api, error::Error, warning};

/// How long [`CallbackListener::close`] lets open connections drain.
pub const CLOSE_DEADLINE: Duration = Duration::from_secs(1);

/// Code or failure reason delivered by the first redirect.
pub type AuthorizationResult = Result<String, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Listening,
    Captured,
    Failed,
    Cancelled,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub addr: SocketAddr,
    /// When set, a first request carrying a different `state` is a failure.
    pub expected_state: Option<String>,
    pub shutdown_grace: Duration,
}

/// State shared between the listener handle and the request handler.
#[derive(Clone)]
pub struct CallbackState {
    pub(crate) answered: Arc<AtomicBool>,
    pub(crate) sender: Arc<Mutex<Option<oneshot::Sender<AuthorizationResult>>>>,
    pub(crate) expected_state: Option<Arc<str>>,
    pub(crate) shutdown: Arc<Notify>,
    pub(crate) shutdown_grace: Duration,
    pub(crate) phase: Arc<Mutex<ListenerState>>,
}

impl CallbackState {
    /// Flips the "already answered" guard. Only the first caller gets `true`.
    pub(crate) fn claim(&self) -> bool {
        self.answered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Hands the outcome to the waiting caller. Called at most once, by the
    /// request that won [`claim`](Self::claim).
    pub(crate) fn resolve(&self, result: AuthorizationResult) {
        set_phase(
            &self.phase,
            if result.is_ok() {
                ListenerState::Captured
            } else {
                ListenerState::Failed
            },
        );

        let sender = self.sender.lock().ok().and_then(|mut s| s.take());
        if let Some(sender) = sender {
            // the caller may already be gone
            let _ = sender.send(result);
        }
    }

    /// Stops the listener after the grace period. No-op if it already stopped.
    pub(crate) fn schedule_shutdown(&self) {
        let shutdown = Arc::clone(&self.shutdown);
        let grace = self.shutdown_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            shutdown.notify_one();
        });
    }
}

pub struct CallbackListener {
    local_addr: SocketAddr,
    outcome: oneshot::Receiver<AuthorizationResult>,
    state: CallbackState,
    server: Option<JoinHandle<()>>,
}

enum Wake {
    Resolved(AuthorizationResult),
    Dropped,
    TimedOut,
    Cancelled,
}

impl CallbackListener {
    /// Binds the redirect endpoint and starts serving it on a separate task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthorizationFailed`] if the address cannot be bound,
    /// typically because another process already uses the port.
    pub async fn bind(config: ListenerConfig) -> Result<Self, Error> {
        let phase = Arc::new(Mutex::new(ListenerState::Idle));

        let listener = TcpListener::bind(config.addr).await.map_err(|e| {
            Error::AuthorizationFailed(format!(
                "could not listen for the redirect on {}: {}",
                config.addr, e
            ))
        })?;
        let local_addr = listener.local_addr().map_err(|e| {
            Error::AuthorizationFailed(format!("callback listener has no local address: {}", e))
        })?;

        let (tx, rx) = oneshot::channel();
        let state = CallbackState {
            answered: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(Mutex::new(Some(tx))),
            expected_state: config.expected_state.map(Arc::from),
            shutdown: Arc::new(Notify::new()),
            shutdown_grace: config.shutdown_grace,
            phase: Arc::clone(&phase),
        };

        // every path is the redirect target, favicon fetches included
        let app = Router::new()
            .fallback(api::callback)
            .with_state(state.clone());

        let shutdown = Arc::clone(&state.shutdown);
        let server_phase = Arc::clone(&phase);
        set_phase(&phase, ListenerState::Listening);
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.notified().await });
            if let Err(e) = serve.await {
                warning!("Callback listener stopped with an error: {}", e);
            }
            set_phase(&server_phase, ListenerState::Stopped);
        });

        Ok(Self {
            local_addr,
            outcome: rx,
            state,
            server: Some(server),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        self.state
            .phase
            .lock()
            .map(|p| *p)
            .unwrap_or(ListenerState::Stopped)
    }

    /// Waits for the single resolution of this listener.
    ///
    /// Resolves with the authorization code of the first redirect. Fails with
    /// [`Error::AuthorizationFailed`] if the first redirect carried no code,
    /// if `timeout` elapses, or if `cancel` completes first. In the last two
    /// cases the socket is closed before returning.
    pub async fn wait<F>(mut self, timeout: Duration, cancel: F) -> Result<String, Error>
    where
        F: Future<Output = ()>,
    {
        let wake = tokio::select! {
            received = &mut self.outcome => match received {
                Ok(result) => Wake::Resolved(result),
                Err(_) => Wake::Dropped,
            },
            _ = tokio::time::sleep(timeout) => Wake::TimedOut,
            _ = cancel => Wake::Cancelled,
        };

        match wake {
            Wake::Resolved(result) => result,
            Wake::Dropped => {
                self.close().await;
                Err(Error::AuthorizationFailed(
                    "callback listener stopped before a redirect arrived".to_string(),
                ))
            }
            Wake::TimedOut => {
                self.close().await;
                Err(Error::AuthorizationFailed(format!(
                    "no redirect received within {} seconds",
                    timeout.as_secs()
                )))
            }
            Wake::Cancelled => {
                self.close().await;
                Err(Error::AuthorizationFailed(
                    "authorization was cancelled".to_string(),
                ))
            }
        }
    }

    /// Stops serving immediately. Later requests are neither answered nor able
    /// to resolve the listener. Safe to call more than once, and after the
    /// listener already stopped on its own.
    ///
    /// Connections the browser already holds open are served by their own
    /// tasks; until they close they can still get the "already answered" reply,
    /// never a new resolution. [`close`](Self::close) waits for them briefly.
    pub fn cancel(&mut self) {
        self.stop_accepting();
        if let Some(server) = &self.server {
            server.abort();
        }
        set_phase(&self.state.phase, ListenerState::Stopped);
    }

    /// Cancels and waits until the socket is released. Open connections get
    /// [`CLOSE_DEADLINE`] to finish before the server task is aborted.
    pub async fn close(&mut self) {
        self.stop_accepting();
        if let Some(mut server) = self.server.take() {
            if tokio::time::timeout(CLOSE_DEADLINE, &mut server)
                .await
                .is_err()
            {
                server.abort();
                let _ = server.await;
            }
        }
        set_phase(&self.state.phase, ListenerState::Stopped);
    }

    // claims the guard so nothing resolves later, then starts the graceful shutdown
    fn stop_accepting(&mut self) {
        if self.state.claim() {
            set_phase(&self.state.phase, ListenerState::Cancelled);
            if let Ok(mut sender) = self.state.sender.lock() {
                sender.take();
            }
        }
        self.state.shutdown.notify_one();
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        // once answered the grace shutdown is already scheduled
        if !self.state.answered.load(Ordering::Acquire) {
            self.cancel();
        }
    }
}

fn set_phase(phase: &Mutex<ListenerState>, next: ListenerState) {
    if let Ok(mut p) = phase.lock() {
        *p = next;
    }
}
