//! Cloneable handle to a running combat session.
//!
//! [`SessionHandle`] is what the registry stores per gym. It carries the
//! session identity and the shutdown signal every session task listens to.
use std::sync::Arc;

use tokio::sync::watch;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CloseReason {
    /// The gym roster was exhausted.
    Won,
    /// The player roster was exhausted.
    Lost,
    /// The inactivity watchdog fired.
    Inactive,
    /// The transport's inbound or outbound side ended or failed.
    TransportClosed,
    /// Closed from outside through [`SessionHandle::close`].
    Closed,
}

/// Client-facing handle to a combat session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    gym_id: Arc<str>,
    user_id: Arc<str>,
    shutdown: Arc<watch::Sender<Option<CloseReason>>>,
}

impl SessionHandle {
    pub(crate) fn new(gym_id: &str, user_id: &str) -> Self {
        let (shutdown, _) = watch::channel(None);
        Self {
            gym_id: gym_id.into(),
            user_id: user_id.into(),
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn gym_id(&self) -> &str {
        &self.gym_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Forces teardown of the session.
    pub fn close(&self) -> bool {
        self.close_with(CloseReason::Closed)
    }

    /// Tears the session down after the transport failed to deliver.
    pub fn close_transport(&self) -> bool {
        self.close_with(CloseReason::TransportClosed)
    }

    /// Records `reason` and signals every session task to stop.
    ///
    /// The first reason wins; later calls return `false`.
    pub(crate) fn close_with(&self, reason: CloseReason) -> bool {
        self.shutdown.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.borrow().is_some()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        *self.shutdown.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<CloseReason>> {
        self.shutdown.subscribe()
    }

    /// Waits until the session has been asked to close.
    pub async fn closed(&self) -> CloseReason {
        let mut rx = self.subscribe();
        loop {
            if let Some(reason) = *rx.borrow_and_update() {
                return reason;
            }
            if rx.changed().await.is_err() {
                return CloseReason::Closed;
            }
        }
    }
}
