use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::{debug, info, warn};

use crate::metrics::{IterationSample, MetricsSink};
use crate::shutdown::ShutdownSender;

use super::stages::VuSchedule;

/// How often the controller re-evaluates the VU target.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// One unit of VU work, run back to back while the VU is active.
#[async_trait]
pub trait VuIteration: Send + Sync {
    async fn iterate(&self, vu: u64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOptions {
    pub graceful_stop: Duration,
    pub graceful_ramp_down: Duration,
    pub tick: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ramping,
    /// No new iterations; running ones get `grace` to finish.
    Stopping { grace: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VuControl {
    target: u64,
    phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub elapsed: Duration,
    /// VUs actually started.
    pub vus_max: u64,
    /// True when a shutdown signal cut the schedule short.
    pub interrupted: bool,
}

/// Drives the schedule: starts VUs lazily as the target grows, parks those
/// above the target, and winds everything down after the last stage or on
/// shutdown.
pub async fn run_schedule<W>(
    work: Arc<W>,
    schedule: &VuSchedule,
    options: HostOptions,
    metrics: &MetricsSink,
    shutdown_tx: &ShutdownSender,
) -> RunReport
where
    W: VuIteration + ?Sized + 'static,
{
    let mut shutdown_rx = shutdown_tx.subscribe();
    let started = Instant::now();
    let total = schedule.total_duration();
    let (control_tx, control_rx) = watch::channel(VuControl {
        target: 0,
        phase: Phase::Ramping,
    });

    let mut vus: Vec<JoinHandle<()>> = Vec::new();
    let mut spawned: u64 = 0;
    let mut interrupted = false;
    let mut ticker = interval(options.tick.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        "Running {} stages over {}s, up to {} VUs.",
        schedule.stages().len(),
        total.as_secs(),
        schedule.max_vus()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown_rx.recv() => {
                interrupted = true;
                break;
            }
        }
        let elapsed = started.elapsed();
        if elapsed >= total {
            break;
        }

        let target = schedule.target_at(elapsed);
        while spawned < target {
            spawned = spawned.saturating_add(1);
            vus.push(tokio::spawn(vu_loop(
                spawned,
                Arc::clone(&work),
                control_rx.clone(),
                options,
                metrics.clone(),
            )));
        }
        control_tx.send_if_modified(|control| {
            let changed = control.target != target;
            control.target = target;
            changed
        });
    }

    let grace = if interrupted {
        Duration::ZERO
    } else {
        options.graceful_stop
    };
    debug!("Stopping {} VUs with {}ms grace.", spawned, grace.as_millis());
    control_tx.send_replace(VuControl {
        target: 0,
        phase: Phase::Stopping { grace },
    });

    let joined = join_all(vus);
    tokio::pin!(joined);
    let results = if interrupted {
        joined.await
    } else {
        tokio::select! {
            results = &mut joined => results,
            _ = shutdown_rx.recv() => {
                interrupted = true;
                control_tx.send_replace(VuControl {
                    target: 0,
                    phase: Phase::Stopping { grace: Duration::ZERO },
                });
                joined.await
            }
        }
    };
    for result in results {
        if let Err(err) = result {
            warn!("VU task failed: {}", err);
        }
    }

    RunReport {
        elapsed: started.elapsed(),
        vus_max: spawned,
        interrupted,
    }
}

async fn vu_loop<W>(
    vu: u64,
    work: Arc<W>,
    mut control_rx: watch::Receiver<VuControl>,
    options: HostOptions,
    metrics: MetricsSink,
) where
    W: VuIteration + ?Sized,
{
    loop {
        let control = *control_rx.borrow_and_update();
        match control.phase {
            Phase::Stopping { .. } => break,
            Phase::Ramping if vu > control.target => {
                if control_rx.changed().await.is_err() {
                    break;
                }
            }
            Phase::Ramping => {
                let started = Instant::now();
                let interrupted = guarded_iteration(vu, work.as_ref(), &mut control_rx, options).await;
                metrics.iteration(IterationSample {
                    vu,
                    duration: started.elapsed(),
                    interrupted,
                });
            }
        }
    }
}

/// Runs one iteration, cutting it off once its grace period runs out.
/// Returns true when the iteration was interrupted.
async fn guarded_iteration<W>(
    vu: u64,
    work: &W,
    control_rx: &mut watch::Receiver<VuControl>,
    options: HostOptions,
) -> bool
where
    W: VuIteration + ?Sized,
{
    let iteration = work.iterate(vu);
    tokio::pin!(iteration);
    let mut deadline: Option<Instant> = None;
    let mut control_open = true;

    loop {
        let control = *control_rx.borrow_and_update();
        deadline = next_deadline(deadline, control, vu, options);
        tokio::select! {
            () = &mut iteration => return false,
            () = wait_until(deadline) => return true,
            changed = control_rx.changed(), if control_open => {
                control_open = changed.is_ok();
            }
        }
    }
}

fn next_deadline(
    current: Option<Instant>,
    control: VuControl,
    vu: u64,
    options: HostOptions,
) -> Option<Instant> {
    let now = Instant::now();
    match control.phase {
        Phase::Stopping { grace } => {
            let stop_at = now.checked_add(grace).unwrap_or(now);
            Some(current.map_or(stop_at, |existing| existing.min(stop_at)))
        }
        Phase::Ramping if vu > control.target => {
            current.or_else(|| now.checked_add(options.graceful_ramp_down))
        }
        Phase::Ramping => None,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
