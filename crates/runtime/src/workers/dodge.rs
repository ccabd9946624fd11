//! Rendezvous between the player's dodge input and the gym attack timer.
//!
//! The channel has capacity 1: at most one signal can be pending, pushing
//! never blocks, and the window drains leftovers before each cycle so a
//! late dodge cannot be credited to the next attack.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time;

/// Creates a connected signal/window pair.
pub(crate) fn dodge_channel() -> (DodgeSignal, DodgeWindow) {
    let (tx, rx) = mpsc::channel(1);
    (DodgeSignal { tx }, DodgeWindow { rx })
}

/// Sending half, used by the read loop on `USER_DODGE`.
#[derive(Clone, Debug)]
pub(crate) struct DodgeSignal {
    tx: mpsc::Sender<()>,
}

impl DodgeSignal {
    /// Pushes a dodge without waiting. Returns `false` when a signal is
    /// already pending or the window is gone.
    pub(crate) fn signal(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) | Err(TrySendError::Closed(())) => false,
        }
    }
}

/// Receiving half, owned by the gym attacker.
#[derive(Debug)]
pub(crate) struct DodgeWindow {
    rx: mpsc::Receiver<()>,
}

impl DodgeWindow {
    /// Discards signals left over from earlier cycles.
    pub(crate) fn drain(&mut self) -> usize {
        let mut stale = 0;
        while self.rx.try_recv().is_ok() {
            stale += 1;
        }
        stale
    }

    /// Waits for a dodge for at most `window`. Exactly one outcome is
    /// consumed: the first signal, or the expiry.
    pub(crate) async fn wait(&mut self, window: Duration) -> bool {
        matches!(time::timeout(window, self.rx.recv()).await, Ok(Some(())))
    }
}
