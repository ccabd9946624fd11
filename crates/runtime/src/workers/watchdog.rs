//! Inactivity watchdog.
//!
//! Checks the last-inbound timestamp on a fixed interval and closes the
//! session once the client has been silent for longer than the limit.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use super::state::{SessionState, wait_closed};
use crate::api::CloseReason;

pub(crate) struct InactivityWatchdog {
    state: Arc<SessionState>,
    shutdown: watch::Receiver<Option<CloseReason>>,
}

impl InactivityWatchdog {
    pub(crate) fn new(state: Arc<SessionState>) -> Self {
        let shutdown = state.handle.subscribe();
        Self { state, shutdown }
    }

    pub(crate) async fn run(mut self) {
        let interval = self.state.config.watchdog_interval;
        let limit = self.state.config.inactivity_limit;
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = wait_closed(&mut self.shutdown) => break,
                _ = ticker.tick() => {}
            }

            let idle = self.state.idle_for();
            if idle > limit {
                if self.state.handle.close_with(CloseReason::Inactive) {
                    info!(
                        target: "combat::watchdog",
                        gym_id = self.state.gym_id(),
                        idle_secs = idle.as_secs(),
                        "closing inactive session"
                    );
                }
                break;
            }
        }
    }
}
