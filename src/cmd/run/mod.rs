use std::{sync::Arc, time::Duration};

use rama::{error::OpaqueError, graceful::ShutdownGuard, telemetry::tracing};

use clap::Args;
use tokio::sync::mpsc::{self, Receiver};

use crate::{
    api::{ApiClient, Recorder, RequestEvent},
    config::PerfConfig,
};

pub mod client;
pub mod reporter;
pub mod user;

use self::reporter::*;

/// run the load harness against a target fleet API
#[derive(Debug, Clone, Args)]
pub struct RunCommand {
    /// http(s) origin of the target API server, e.g. http://127.0.0.1:8000
    #[arg(value_name = "TARGET", required = true)]
    target: String,

    /// number of virtual users to simulate
    #[arg(long, value_name = "N", default_value_t = 1)]
    users: usize,

    /// report json instead of a human-friendly format
    #[arg(long, default_value_t = false)]
    json: bool,
}

pub async fn exec(guard: ShutdownGuard, args: RunCommand) -> Result<(), OpaqueError> {
    let cfg = Arc::new(PerfConfig::from_env()?);
    let http = self::client::new_http_client();

    let users = args.users.max(1);
    tracing::info!(
        target = %args.target,
        %users,
        run_time_secs = %cfg.run_time.as_secs(),
        kafkas_per_user = %cfg.kafkas_to_create,
        seed_kafkas_per_user = %cfg.seed_kafkas,
        get_only = %cfg.get_only,
        prepopulate_db = %cfg.prepopulate_db,
        hold_off_minutes = %cfg.hold_off_minutes,
        "perf run parameters ready",
    );

    const REPORT_INTERVAL: Duration = Duration::from_secs(1);

    let reporter: Box<dyn Reporter> = if args.json {
        const EMIT_EVENTS: bool = true;
        Box::new(JsonlReporter::new(REPORT_INTERVAL, EMIT_EVENTS))
    } else {
        Box::new(HumanReporter::new(REPORT_INTERVAL))
    };

    let (result_tx, result_rx) = mpsc::channel(users * 8);
    guard.spawn_task_fn(|guard| report_worker(guard, reporter, result_rx));

    let run_start = tokio::time::Instant::now();
    let mut user_tasks = tokio::task::JoinSet::new();
    for user in 0..users {
        let api = ApiClient::new(
            http.clone(),
            &args.target,
            &cfg.base_api_path,
            cfg.config_sink_url.clone(),
            Some(Recorder::new(run_start, result_tx.clone())),
        );
        let session = user::Session::new(user, cfg.clone(), api);
        let guard = guard.clone();
        user_tasks.spawn(session.run(guard));
    }
    // the report worker exits once every user (sender) is gone
    drop(result_tx);

    while let Some(joined) = user_tasks.join_next().await {
        if let Err(err) = joined {
            tracing::error!("virtual user task failed: {err}");
        }
    }

    tracing::info!("perf run done: all virtual users finished");
    Ok(())
}

async fn report_worker(
    guard: ShutdownGuard,
    mut reporter: Box<dyn Reporter>,
    mut result_rx: Receiver<RequestEvent>,
) {
    let start = tokio::time::Instant::now();

    loop {
        let ev = tokio::select! {
            _ = guard.cancelled() => {
                tracing::debug!("exit report worker: guard shutdown");
                reporter.finish();
                return;
            }

            maybe_ev = result_rx.recv() => {
                let Some(ev) = maybe_ev else {
                    tracing::debug!("exit report worker: event senders closed");
                    reporter.finish();
                    return;
                };

                ev
            }
        };

        reporter.on_result(&ev);
        reporter.on_tick(start.elapsed());
    }
}
