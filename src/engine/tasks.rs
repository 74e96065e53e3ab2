//! Long-running tasks: the pacing session loop and blink diagnostics.

use std::sync::Arc;
use std::time::Duration;

use smart_leds::{SmartLedsWrite, RGB8};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::block::{BlockStatus, Colour, MacAddress};
use crate::config::units::Seconds;
use crate::mesh::{send_colour, DeliveryResult, DispatchOutcome, FailurePolicy, Radio};

use super::controller::Inner;
use super::notifier::{BlockStore, Notifier};
use super::report::registry_report;

/// Runs the termination sequence when the session task exits, however it
/// exits.
struct FinishGuard<R, W, N, S>
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    inner: Arc<Inner<R, W, N, S>>,
}

impl<R, W, N, S> Drop for FinishGuard<R, W, N, S>
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    fn drop(&mut self) {
        self.inner.finish_session();
    }
}

/// Tick the active run until it finishes or `token` is cancelled.
pub(crate) async fn run_session<R, W, N, S>(inner: Arc<Inner<R, W, N, S>>, token: CancellationToken)
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    let guard = FinishGuard {
        inner: Arc::clone(&inner),
    };

    let mut interval = time::interval(Duration::from_millis(u64::from(
        inner.timing.tick_interval_ms,
    )));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Session cancelled");
                break;
            }
            _ = interval.tick() => {}
        }

        let now = Instant::now();
        let dt = Seconds(now.duration_since(last).as_secs_f32());
        last = now;

        let Some((events, report)) = inner.tick_session(dt) else {
            break;
        };
        if events.laps_decremented > 0 {
            debug!(laps = events.laps_decremented, "Lap counter decremented");
        }
        if events.failed_sends > 0 {
            debug!(failed = events.failed_sends, "Colour sends not acknowledged");
        }
        if let Some(report) = report {
            inner.notifier.session_status(&report);
        }
        if let Some(kind) = events.finished {
            info!(?kind, "Pacing session finished");
            break;
        }
    }

    drop(guard);
    // Let the final broadcast go out before the task is gone
    time::sleep(Duration::from_millis(u64::from(inner.timing.grace_ms))).await;
}

/// Which blocks to flash and how often.
#[derive(Debug, Clone)]
pub(crate) struct BlinkPlan {
    pub(crate) targets: Vec<MacAddress>,
    pub(crate) flashes: u32,
}

impl BlinkPlan {
    /// One block, three flashes.
    pub(crate) fn single(mac: MacAddress) -> Self {
        Self {
            targets: vec![mac],
            flashes: 3,
        }
    }

    /// Every listed block in turn, one flash each.
    pub(crate) fn all(targets: impl Iterator<Item = MacAddress>) -> Self {
        Self {
            targets: targets.collect(),
            flashes: 1,
        }
    }
}

/// Clears the blink flag when the blink task exits.
struct BlinkGuard<R, W, N, S>
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    inner: Arc<Inner<R, W, N, S>>,
}

impl<R, W, N, S> Drop for BlinkGuard<R, W, N, S>
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    fn drop(&mut self) {
        self.inner.core.lock().blinking = false;
    }
}

/// Flash each target blue then off, restoring its status afterwards.
pub(crate) async fn run_blink<R, W, N, S>(inner: Arc<Inner<R, W, N, S>>, plan: BlinkPlan)
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    let guard = BlinkGuard {
        inner: Arc::clone(&inner),
    };
    let phase = Duration::from_millis(u64::from(inner.timing.blink_phase_ms));

    for mac in &plan.targets {
        if !mark_blinking(&inner, mac) {
            continue;
        }
        for _ in 0..plan.flashes {
            blink_colour(&inner, mac, Colour::Blue);
            time::sleep(phase).await;
            blink_colour(&inner, mac, Colour::Off);
            time::sleep(phase).await;
        }
        restore_status(&inner, mac);
    }

    drop(guard);
    info!("Blink finished");
    time::sleep(Duration::from_millis(u64::from(inner.timing.grace_ms))).await;
}

fn mark_blinking<R, W, N, S>(inner: &Inner<R, W, N, S>, mac: &MacAddress) -> bool
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    let entries = {
        let mut core = inner.core.lock();
        if !core.registry.set_status_by_mac(mac, BlockStatus::Blinking) {
            return false;
        }
        registry_report(&core.registry)
    };
    inner.broadcast_registry(&entries);
    true
}

fn blink_colour<R, W, N, S>(inner: &Inner<R, W, N, S>, mac: &MacAddress, colour: Colour)
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    let mut core = inner.core.lock();
    let Some(number) = core.registry.find_by_mac(mac).map(|b| b.number) else {
        return;
    };
    let super::controller::Core {
        registry,
        radio,
        strip,
        ..
    } = &mut *core;
    let outcome = send_colour(registry, radio, strip, number, colour, FailurePolicy::Blink);
    if outcome == DispatchOutcome::Sent(DeliveryResult::Failed) {
        warn!(%mac, number, "Blink colour not acknowledged");
    }
}

fn restore_status<R, W, N, S>(inner: &Inner<R, W, N, S>, mac: &MacAddress)
where
    R: Radio + Send + 'static,
    W: SmartLedsWrite<Color = RGB8> + Send + 'static,
    N: Notifier,
    S: BlockStore,
{
    let entries = {
        let mut core = inner.core.lock();
        let Some(block) = core.registry.find_by_mac(mac).copied() else {
            return;
        };
        let status = match block.status {
            _ if block.is_master() => BlockStatus::Master,
            BlockStatus::Disconnected => BlockStatus::Disconnected,
            _ => BlockStatus::Working,
        };
        core.registry.set_status(block.number, status);
        registry_report(&core.registry)
    };
    inner.broadcast_registry(&entries);
}
