use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::debug;
use tracing::warn;

use crate::vesync::VesyncClient;
use crate::SharedEngine;

/// Rate limiter for externally requested refreshes.
///
/// The first request always passes; later requests pass only once the
/// cooldown has elapsed since the last accepted one. Time is an argument so
/// tests control the clock.
pub struct Debouncer {
    cooldown: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(cooldown: Duration) -> Self {
        Debouncer {
            cooldown,
            last: None,
        }
    }

    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.cooldown => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Poll the vendor on the configured cadence, with out-of-band refreshes via
/// `refresh_rx` debounced by `cooldown`.
///
/// A failed poll is logged and skipped; the previously published state stays
/// visible until the next successful cycle.
pub async fn run(
    engine: SharedEngine,
    client: Arc<dyn VesyncClient>,
    poll_interval: Duration,
    cooldown: Duration,
    mut refresh_rx: mpsc::Receiver<()>,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut debouncer = Debouncer::new(cooldown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            request = refresh_rx.recv() => {
                if request.is_none() {
                    // All refresh senders dropped; cadence polling continues.
                    interval.tick().await;
                } else if !debouncer.try_acquire(Instant::now()) {
                    debug!("refresh request debounced");
                    continue;
                } else {
                    debug!("out-of-band refresh accepted");
                }
            }
        }

        // Fetch before locking so API readers never wait on the vendor.
        match client.fetch_devices().await {
            Ok(devices) => engine.write().await.apply_snapshot(&devices),
            Err(err) => {
                warn!(error = %err, "poll cycle failed, keeping last known state");
            }
        }
    }
}
