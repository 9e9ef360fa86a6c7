use std::{sync::Arc, time::Duration};

use rama::{graceful::ShutdownGuard, telemetry::tracing};
use rand::{Rng as _, SeedableRng as _, rngs::SmallRng};
use tokio::time::{Instant, sleep};

use crate::{api::ApiClient, config::PerfConfig};

pub mod cleanup;
pub mod exercise;
pub mod pacing;
pub mod phase;
pub mod readiness;
pub mod registry;
pub mod seed;

use self::{
    pacing::ConstantPacer,
    phase::{Phase, PhaseThresholds, SEED_CUTOFF, phase_at},
    registry::Registry,
};

/// Tick interval of one virtual user's main task.
const PACING_INTERVAL: Duration = Duration::from_millis(500);

/// One simulated independent API client.
///
/// Owns all of its registries, counters and flags; nothing here is shared
/// across virtual users, which is why no behavior needs a lock.
pub struct Session {
    pub(crate) user: usize,
    pub(crate) cfg: Arc<PerfConfig>,
    pub(crate) api: ApiClient,
    pub(crate) rng: SmallRng,
    pub(crate) started: Instant,
    pub(crate) thresholds: PhaseThresholds,

    pub(crate) kafkas: Registry,
    pub(crate) service_accounts: Registry,

    /// kafkas created so far, counts towards the seed target while seeding
    pub(crate) kafkas_created: u32,
    /// seed-population stage still active
    pub(crate) seeding: bool,
    /// every tracked kafka confirmed ready and its connection config persisted
    pub(crate) kafkas_persisted: bool,
    /// the one-time leftover sweep found both registries empty
    pub(crate) resources_cleaned_up: bool,
}

impl Session {
    pub fn new(user: usize, cfg: Arc<PerfConfig>, api: ApiClient) -> Self {
        Self::new_with_rng(user, cfg, api, SmallRng::from_os_rng())
    }

    pub(crate) fn new_with_rng(
        user: usize,
        cfg: Arc<PerfConfig>,
        api: ApiClient,
        rng: SmallRng,
    ) -> Self {
        let thresholds = PhaseThresholds::for_run(cfg.get_only, cfg.kafkas_to_create);
        let seeding = cfg.prepopulate_db && !cfg.get_only;

        Self {
            user,
            cfg,
            api,
            rng,
            started: Instant::now(),
            thresholds,
            kafkas: Registry::default(),
            service_accounts: Registry::default(),
            kafkas_created: 0,
            seeding,
            kafkas_persisted: false,
            resources_cleaned_up: false,
        }
    }

    /// Drive this virtual user until the run duration elapses or shutdown
    /// fires.
    pub async fn run(mut self, guard: ShutdownGuard) {
        // give the target server room to finish starting
        let start_delay = Duration::from_secs(self.rng.random_range(5..=10));
        tokio::select! {
            _ = guard.cancelled() => return,
            _ = sleep(start_delay) => {}
        }

        if let Some(sso) = self.cfg.sso.clone() {
            self.api.fetch_token(&sso).await;
        }

        let mut pacer = ConstantPacer::new(PACING_INTERVAL);
        loop {
            tokio::select! {
                _ = guard.cancelled() => {
                    tracing::debug!(user = %self.user, "exit virtual user: guard shutdown");
                    return;
                }
                _ = pacer.wait() => {}
            }

            if self.started.elapsed() >= self.cfg.run_time {
                tracing::info!(user = %self.user, "virtual user finished: run time elapsed");
                return;
            }

            self.main_task().await;
        }
    }

    /// One pacing tick: derive the phase and run exactly one behavior.
    pub(crate) async fn main_task(&mut self) {
        let remaining = self.cfg.run_time.saturating_sub(self.started.elapsed());

        if self.seeding && remaining <= SEED_CUTOFF {
            // too close to the end of the run to keep seeding
            self.seeding = false;
            return;
        }

        match phase_at(
            remaining,
            self.seeding,
            self.resources_cleaned_up,
            self.thresholds,
        ) {
            Phase::Seeding => self.seed_tick().await,
            Phase::Cleanup => self.cleanup().await,
            Phase::FinalSweep => {
                self.cleanup().await;
                self.check_leftover_resources().await;
            }
            Phase::Exercising => self.exercise().await,
        }
    }

    /// Uniform jittered backoff; every retry path sleeps through here so the
    /// virtual users never re-synchronize.
    pub(crate) async fn backoff_uniform(&mut self, lo: f64, hi: f64) {
        let secs = self.rng.random_range(lo..hi);
        sleep(Duration::from_secs_f64(secs)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::support::{call_count, json_response, scripted_session, status_response, test_config};

    #[tokio::test(flavor = "current_thread")]
    async fn early_ticks_of_a_prepopulating_run_seed_the_store() {
        time::pause();

        let mut cfg = test_config();
        cfg.prepopulate_db = true;
        cfg.seed_kafkas = 3;

        let (mut session, calls) = scripted_session(
            cfg,
            vec![
                json_response(202, serde_json::json!({ "id": "seed-0" })),
                status_response(204),
            ],
        );

        time::advance(Duration::from_secs(10)).await;
        session.main_task().await;

        assert!(session.seeding);
        assert_eq!(session.kafkas_created, 1);
        assert_eq!(call_count(&calls), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn seeding_stops_without_traffic_once_the_cutoff_is_reached() {
        time::pause();

        let mut cfg = test_config();
        cfg.prepopulate_db = true;
        cfg.seed_kafkas = 3;

        let (mut session, calls) = scripted_session(cfg, Vec::new());

        // 300s run: 120s remain exactly at t=180s
        time::advance(Duration::from_secs(180)).await;
        session.main_task().await;

        assert!(!session.seeding);
        assert_eq!(call_count(&calls), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn final_sweep_window_cleans_and_marks_the_user_clean() {
        time::pause();

        let (mut session, _calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, serde_json::json!({ "items": [] })),
                json_response(200, serde_json::json!({ "items": [] })),
            ],
        );

        // 50s of the 300s run remain: inside the final-sweep window
        time::advance(Duration::from_secs(250)).await;
        session.main_task().await;

        assert!(session.resources_cleaned_up);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn get_only_run_without_creations_exercises_until_the_end() {
        time::pause();

        let mut cfg = test_config();
        cfg.get_only = true;

        let (mut session, calls) = scripted_session(cfg, vec![status_response(200)]);
        session.kafkas_persisted = true;

        // deep inside what would otherwise be the cleanup window
        time::advance(Duration::from_secs(290)).await;
        session.main_task().await;

        // one endpoint of the weighted mix was hit, nothing was deleted
        assert!(call_count(&calls) >= 1);
        let recorded = calls.lock().expect("read calls");
        assert!(recorded.iter().all(|(method, _)| method != "DELETE"));
    }
}

#[cfg(test)]
pub(crate) mod support {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use rama::{
        Service as _,
        error::OpaqueError,
        http::{Request, Response, StatusCode, service::web::response::{IntoResponse, Json}},
        service::service_fn,
    };
    use rand::{SeedableRng as _, rngs::SmallRng};

    use crate::{api::ApiClient, config::PerfConfig};

    use super::Session;

    /// Record of one request the scripted backend saw: method + path/query.
    pub(crate) type Calls = Arc<Mutex<Vec<(String, String)>>>;

    pub(crate) fn test_config() -> PerfConfig {
        PerfConfig {
            get_only: false,
            prepopulate_db: false,
            seed_kafkas: 0,
            kafka_post_wait: Duration::from_secs(1),
            kafkas_to_create: 0,
            run_time: Duration::from_secs(300),
            hold_off_minutes: 0,
            base_api_path: "/api/managed-services-api/v1".to_owned(),
            config_sink_url: "http://sink.local/write_kafka_config".to_owned(),
            sso: None,
        }
    }

    /// Session backed by a scripted service: each request pops the next
    /// response off the queue (404 once exhausted) and is recorded.
    pub(crate) fn scripted_session(cfg: PerfConfig, responses: Vec<Response>) -> (Session, Calls) {
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));

        let svc = {
            let queue = queue.clone();
            let calls = calls.clone();
            service_fn(move |req: Request| {
                let queue = queue.clone();
                let calls = calls.clone();
                async move {
                    calls.lock().expect("record call").push((
                        req.method().to_string(),
                        req.uri()
                            .path_and_query()
                            .map(|pq| pq.to_string())
                            .unwrap_or_default(),
                    ));
                    let resp = queue
                        .lock()
                        .expect("pop scripted response")
                        .pop_front()
                        .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response());
                    Ok::<_, OpaqueError>(resp)
                }
            })
        };

        let api = ApiClient::new(
            svc.boxed(),
            "http://api.local",
            &cfg.base_api_path,
            cfg.config_sink_url.clone(),
            None,
        );
        let session = Session::new_with_rng(0, Arc::new(cfg), api, SmallRng::seed_from_u64(1));
        (session, calls)
    }

    pub(crate) fn status_response(code: u16) -> Response {
        StatusCode::from_u16(code)
            .expect("valid status code")
            .into_response()
    }

    pub(crate) fn json_response(code: u16, body: serde_json::Value) -> Response {
        (
            StatusCode::from_u16(code).expect("valid status code"),
            Json(body),
        )
            .into_response()
    }

    pub(crate) fn call_count(calls: &Calls) -> usize {
        calls.lock().expect("count calls").len()
    }

    pub(crate) fn calls_matching(calls: &Calls, needle: &str) -> usize {
        calls
            .lock()
            .expect("filter calls")
            .iter()
            .filter(|(_, path)| path.contains(needle))
            .count()
    }
}
