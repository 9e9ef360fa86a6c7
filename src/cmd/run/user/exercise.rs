use std::time::Duration;

use rand::Rng as _;
use tokio::time::sleep;

use crate::api::payload;

use super::Session;

/// Idle throttle applied while the endpoint hold-off is still more than a
/// minute away.
const HOLD_OFF_IDLE: Duration = Duration::from_secs(15);

/// Endpoint groups reachable from the weighted dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EndpointGroup {
    ServiceAccounts,
    CloudProviders,
    OpenApi,
    ListKafkas,
    SearchKafkas,
    KafkaDetail,
}

/// Map one uniform draw from `[0,99)` onto its endpoint group.
///
/// Cumulative ranges: 1% service accounts, 1% cloud providers + regions,
/// 1% OpenAPI document, 50% bare kafka list, 35% filtered kafka list,
/// 11% kafka detail.
pub(crate) fn pick_group(selector: u32) -> EndpointGroup {
    match selector {
        0 => EndpointGroup::ServiceAccounts,
        1 => EndpointGroup::CloudProviders,
        2 => EndpointGroup::OpenApi,
        3..=52 => EndpointGroup::ListKafkas,
        53..=87 => EndpointGroup::SearchKafkas,
        _ => EndpointGroup::KafkaDetail,
    }
}

impl Session {
    /// Main exercise tick: fill to the creation target, gate on readiness,
    /// then fire one draw of the weighted endpoint mix.
    pub(crate) async fn exercise(&mut self) {
        if self.kafkas.len() < self.cfg.kafkas_to_create {
            let body = payload::kafka_request(&mut self.rng);
            if let Some(kafka_id) = self.api.create_kafka(&body).await {
                self.kafkas.push(kafka_id);
                self.kafkas_created += 1;
                // creates are expensive for the backend, pace them apart
                sleep(self.cfg.kafka_post_wait).await;
            }
            return;
        }

        if !self.kafkas_persisted {
            self.wait_for_kafkas_ready().await;
        }

        let elapsed_minutes = self.started.elapsed().as_secs_f64() / 60.0;
        let hold_off_minutes = self.cfg.hold_off_minutes as f64;
        if elapsed_minutes >= hold_off_minutes {
            let selector = self.rng.random_range(0..99);
            match pick_group(selector) {
                EndpointGroup::ServiceAccounts => self.service_account_group().await,
                EndpointGroup::CloudProviders => {
                    self.api.list_cloud_providers().await;
                    self.api.list_cloud_provider_regions().await;
                }
                EndpointGroup::OpenApi => self.api.get_openapi().await,
                EndpointGroup::ListKafkas => self.api.list_kafkas().await,
                EndpointGroup::SearchKafkas => {
                    let term = payload::random_search_term(&mut self.rng);
                    self.api.search_kafkas(&term).await;
                }
                EndpointGroup::KafkaDetail => self.kafka_detail_group().await,
            }
        } else if elapsed_minutes + 1.0 < hold_off_minutes {
            // nothing to do for at least another minute
            sleep(HOLD_OFF_IDLE).await;
        }
    }

    /// Service-account slice of the mix: always a listing; outside GET-only
    /// mode alternate between removing a tracked account and creating a
    /// fresh one with rotated credentials.
    async fn service_account_group(&mut self) {
        self.api.list_service_accounts().await;
        if self.cfg.get_only {
            return;
        }

        if !self.service_accounts.is_empty() {
            self.remove_service_account(None).await;
            self.api.list_service_accounts().await;
        } else {
            let mut body = payload::service_account_request(&mut self.rng);
            if let Some(svc_acc_id) = self.api.create_service_account(&body).await {
                body.client_secret = payload::random_secret(&mut self.rng);
                self.api
                    .reset_service_account_credentials(&svc_acc_id, &body)
                    .await;
                self.service_accounts.push(svc_acc_id);
            }
        }
    }

    /// Fetch one kafka's detail; roughly one in twenty detail hits also
    /// pulls both metrics endpoints for the same kafka.
    async fn kafka_detail_group(&mut self) {
        let kafka_id = match self.kafkas.random(&mut self.rng) {
            Some(id) => Some(id),
            None => match self.api.list_kafkas_json().await {
                Some(body) => {
                    let ids = payload::item_ids(&body);
                    if ids.is_empty() {
                        None
                    } else {
                        let index = self.rng.random_range(0..ids.len());
                        ids.into_iter().nth(index)
                    }
                }
                None => None,
            },
        };

        let Some(kafka_id) = kafka_id else { return };
        self.api.get_kafka(&kafka_id).await;
        if self.rng.random_range(0..20) == 0 {
            self.api.kafka_metrics_query(&kafka_id).await;
            self.api.kafka_metrics_query_range(&kafka_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::{Rng as _, SeedableRng as _, rngs::SmallRng};
    use tokio::time::{self, Instant};

    use super::super::support::{
        call_count, calls_matching, json_response, scripted_session, status_response, test_config,
    };
    use super::{EndpointGroup, pick_group};

    #[test]
    fn dispatch_ranges_map_onto_their_groups() {
        assert_eq!(pick_group(0), EndpointGroup::ServiceAccounts);
        assert_eq!(pick_group(1), EndpointGroup::CloudProviders);
        assert_eq!(pick_group(2), EndpointGroup::OpenApi);
        assert_eq!(pick_group(3), EndpointGroup::ListKafkas);
        assert_eq!(pick_group(52), EndpointGroup::ListKafkas);
        assert_eq!(pick_group(53), EndpointGroup::SearchKafkas);
        assert_eq!(pick_group(87), EndpointGroup::SearchKafkas);
        assert_eq!(pick_group(88), EndpointGroup::KafkaDetail);
        assert_eq!(pick_group(98), EndpointGroup::KafkaDetail);
    }

    #[test]
    fn dispatch_distribution_converges_on_the_configured_mix() {
        const DRAWS: usize = 100_000;

        let mut rng = SmallRng::seed_from_u64(42);
        let mut counts = [0usize; 6];
        for _ in 0..DRAWS {
            let group = pick_group(rng.random_range(0..99));
            let index = match group {
                EndpointGroup::ServiceAccounts => 0,
                EndpointGroup::CloudProviders => 1,
                EndpointGroup::OpenApi => 2,
                EndpointGroup::ListKafkas => 3,
                EndpointGroup::SearchKafkas => 4,
                EndpointGroup::KafkaDetail => 5,
            };
            counts[index] += 1;
        }

        let expected = [1.0, 1.0, 1.0, 50.0, 35.0, 11.0].map(|share| share / 99.0);
        for (count, expected) in counts.into_iter().zip(expected) {
            let fraction = count as f64 / DRAWS as f64;
            assert!(
                (fraction - expected).abs() < 0.01,
                "fraction {fraction} too far from {expected}"
            );
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fill_stage_creates_one_kafka_per_tick_and_paces() {
        time::pause();

        let mut cfg = test_config();
        cfg.kafkas_to_create = 2;
        cfg.kafka_post_wait = Duration::from_secs(3);

        let (mut session, calls) = scripted_session(
            cfg,
            vec![json_response(
                202,
                serde_json::json!({ "id": "kafka-1", "status": "accepted" }),
            )],
        );

        let t0 = Instant::now();
        session.exercise().await;

        assert_eq!(session.kafkas.len(), 1);
        assert_eq!(call_count(&calls), 1);
        assert_eq!(t0.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_fill_create_leaves_state_untouched_until_the_next_tick() {
        time::pause();

        let mut cfg = test_config();
        cfg.kafkas_to_create = 1;

        let (mut session, calls) = scripted_session(cfg, vec![status_response(500)]);
        let t0 = Instant::now();
        session.exercise().await;

        assert!(session.kafkas.is_empty());
        assert_eq!(call_count(&calls), 1);
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hold_off_far_away_throttles_instead_of_spinning() {
        time::pause();

        let mut cfg = test_config();
        cfg.hold_off_minutes = 10;
        cfg.kafkas_to_create = 0;

        let (mut session, calls) = scripted_session(cfg, Vec::new());
        session.kafkas_persisted = true;

        let t0 = Instant::now();
        session.exercise().await;

        assert_eq!(call_count(&calls), 0);
        assert_eq!(t0.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn service_account_group_stays_read_only_in_get_only_mode() {
        time::pause();

        let mut cfg = test_config();
        cfg.get_only = true;

        let (mut session, calls) = scripted_session(
            cfg,
            vec![json_response(200, serde_json::json!({ "items": [] }))],
        );
        session.service_account_group().await;

        assert_eq!(call_count(&calls), 1);
        assert_eq!(calls_matching(&calls, "/serviceaccounts"), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn service_account_group_creates_and_rotates_credentials() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, serde_json::json!({ "items": [] })),
                json_response(201, serde_json::json!({ "id": "acc-1" })),
                json_response(200, serde_json::json!({ "id": "acc-1" })),
            ],
        );
        session.service_account_group().await;

        assert_eq!(session.service_accounts.len(), 1);
        assert_eq!(calls_matching(&calls, "reset-credentials"), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn detail_group_lists_first_when_nothing_is_tracked() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(
                    200,
                    serde_json::json!({ "items": [ { "id": "other-kafka" } ] }),
                ),
                json_response(200, serde_json::json!({ "id": "other-kafka" })),
            ],
        );
        session.kafka_detail_group().await;

        // the bare list came first, then the detail fetch for the listed id
        assert!(calls_matching(&calls, "/kafkas/other-kafka") >= 1);
        assert!(call_count(&calls) >= 2);
    }
}
