use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::accounts::SetupContext;
use crate::args::LoadArgs;
use crate::config::{RunConfig, load_config, resolve_run_config};
use crate::error::{AppError, AppResult, SetupError};
use crate::host::{DEFAULT_TICK, HostOptions, VuSchedule, run_schedule};
use crate::http::build_client;
use crate::metrics::{
    MetricsSink, RunMetrics, RunSummary, export_summary_json, setup_metrics_collector,
};
use crate::session::{SessionPool, establish_sessions};
use crate::shutdown::{ShutdownReceiver, ShutdownSender};
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};
use crate::system::{print_summary, selection_lines};
use crate::traffic::TrafficDriver;

pub(super) async fn run_async(args: &LoadArgs) -> AppResult<()> {
    let file = load_config(args.config.as_deref())?;
    let config = resolve_run_config(args, file)?;
    for line in selection_lines(&config) {
        debug!("{}", line);
    }
    let schedule = VuSchedule::new(config.stages.clone()).map_err(AppError::validation)?;
    let client = build_client(config.request_timeout)?;

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let (metrics, samples_rx) = MetricsSink::channel();
    let collector = setup_metrics_collector(samples_rx, RunMetrics::new()?);

    let pool = match run_setup(&config, &client, &metrics, &shutdown_tx).await? {
        SetupOutcome::Ready(pool) => pool,
        SetupOutcome::Interrupted => {
            info!("Interrupted during setup, nothing was run.");
            return Ok(());
        }
    };
    let sessions = pool.as_deref().map_or(0, SessionPool::len);

    let driver = Arc::new(TrafficDriver::new(
        client,
        config.base_url.clone(),
        pool,
        config.scenario,
        config.pacing,
        config.traffic,
        metrics.clone(),
    ));
    let options = HostOptions {
        graceful_stop: config.graceful_stop,
        graceful_ramp_down: config.graceful_ramp_down,
        tick: DEFAULT_TICK,
    };
    let report = run_schedule(driver, &schedule, options, &metrics, &shutdown_tx).await;
    if report.interrupted {
        warn!("Run interrupted after {}s.", report.elapsed.as_secs());
    }

    drop(shutdown_tx.send(()));
    if let Err(err) = signal_handle.await {
        warn!("Signal handler task failed: {}", err);
    }
    drop(metrics);
    let run_metrics = collector.await?;

    let summary = RunSummary::build(
        config.scenario.as_str(),
        report.elapsed,
        report.vus_max,
        sessions,
        &run_metrics,
        &config.thresholds,
    );
    print_summary(&summary);
    if let Some(path) = config.summary_export.as_deref() {
        export_summary_json(path, &summary)
            .await
            .map_err(AppError::metrics)?;
        info!("Summary written to {}.", path.display());
    }

    let failed = summary.failed_thresholds();
    if failed > 0 {
        return Err(AppError::ThresholdsFailed {
            failed,
            total: summary.thresholds.len(),
        });
    }
    Ok(())
}

#[derive(Debug)]
pub(super) enum SetupOutcome {
    /// `None` when the scenario runs without sessions.
    Ready(Option<Arc<SessionPool>>),
    Interrupted,
}

/// Provisions identities and logs them in, bounded by the setup timeout.
async fn run_setup(
    config: &RunConfig,
    client: &Client,
    metrics: &MetricsSink,
    shutdown_tx: &ShutdownSender,
) -> AppResult<SetupOutcome> {
    if !config.needs_sessions {
        info!("{} traffic runs without sessions.", config.scenario.as_str());
        return Ok(SetupOutcome::Ready(None));
    }

    let mut shutdown_rx = shutdown_tx.subscribe();
    let setup = async {
        let source = config.accounts.build_source()?;
        let ctx = SetupContext {
            client,
            base_url: &config.base_url,
            metrics,
        };
        info!("Loading identities from the {} source.", source.name());
        let identities = source.load(&ctx).await?;
        establish_sessions(
            client,
            &config.base_url,
            identities,
            config.accounts.max_sessions,
            metrics,
        )
        .await
    };

    bounded_setup(config.setup_timeout, &mut shutdown_rx, setup).await
}

/// Races setup against its timeout and a shutdown signal.
pub(super) async fn bounded_setup<F>(
    timeout: Duration,
    shutdown_rx: &mut ShutdownReceiver,
    setup: F,
) -> AppResult<SetupOutcome>
where
    F: Future<Output = AppResult<SessionPool>>,
{
    tokio::select! {
        result = tokio::time::timeout(timeout, setup) => match result {
            Ok(pool) => Ok(SetupOutcome::Ready(Some(Arc::new(pool?)))),
            Err(_) => Err(AppError::setup(SetupError::Timeout { timeout })),
        },
        _ = shutdown_rx.recv() => Ok(SetupOutcome::Interrupted),
    }
}
