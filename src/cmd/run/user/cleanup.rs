use std::time::Duration;

use rand::Rng as _;
use tokio::time::sleep;

use crate::api::payload;

use super::Session;

/// The two resource kinds the harness creates and removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResourceKind {
    Kafka,
    ServiceAccount,
}

impl Session {
    pub(crate) async fn remove_kafka(&mut self, id: Option<String>) {
        self.remove_resource(ResourceKind::Kafka, id).await;
    }

    pub(crate) async fn remove_service_account(&mut self, id: Option<String>) {
        self.remove_resource(ResourceKind::ServiceAccount, id).await;
    }

    /// Delete one tracked resource, retrying until a terminal status.
    ///
    /// Terminal means the delete answered with at most 204 or with 404;
    /// anything else (including transport errors) backs off
    /// `attempt × uniform(0.05,0.1)` seconds and retries. The registry entry
    /// leaves only on a terminal outcome.
    pub(crate) async fn remove_resource(&mut self, kind: ResourceKind, id: Option<String>) {
        let registry = match kind {
            ResourceKind::Kafka => &self.kafkas,
            ResourceKind::ServiceAccount => &self.service_accounts,
        };
        if registry.is_empty() {
            return;
        }
        let resource_id = match id {
            Some(id) => id,
            None => match registry.random(&mut self.rng) {
                Some(id) => id,
                None => return,
            },
        };

        let mut attempt: u32 = 0;
        loop {
            let status = match kind {
                ResourceKind::Kafka => self.api.delete_kafka(&resource_id).await,
                ResourceKind::ServiceAccount => {
                    self.api.delete_service_account(&resource_id).await
                }
            };
            attempt += 1;

            if matches!(status, Some(code) if code <= 204 || code == 404) {
                break;
            }

            let unit = self.rng.random_range(0.05..0.1);
            sleep(Duration::from_secs_f64(f64::from(attempt) * unit)).await;
        }

        let registry = match kind {
            ResourceKind::Kafka => &mut self.kafkas,
            ResourceKind::ServiceAccount => &mut self.service_accounts,
        };
        registry.remove(&resource_id);
    }

    /// Pre-end cleanup tick: drop one random service account and, when this
    /// worker creates kafkas at all, one random kafka.
    pub(crate) async fn cleanup(&mut self) {
        self.remove_service_account(None).await;
        if self.cfg.kafkas_to_create > 0 {
            self.remove_kafka(None).await;
        }
    }

    /// One-time sweep for resources the per-tick cleanup missed.
    ///
    /// Lists what is still visible to this run's credentials, adopts the
    /// listed IDs as the registries and drains them completely. Marks the
    /// user clean only when both registries end up empty.
    pub(crate) async fn check_leftover_resources(&mut self) {
        self.backoff_uniform(1.0, 5.0).await;
        if let Some(body) = self.api.list_kafkas_json().await {
            let ids = payload::item_ids(&body);
            if !ids.is_empty() && self.cfg.kafkas_to_create > 0 {
                self.kafkas.adopt(ids.clone());
                for kafka_id in ids {
                    self.remove_kafka(Some(kafka_id)).await;
                }
            }
        }

        self.backoff_uniform(1.0, 5.0).await;
        if let Some(body) = self.api.list_service_accounts_json().await {
            let ids = payload::perf_run_item_ids(&body);
            if !ids.is_empty() {
                self.service_accounts.adopt(ids.clone());
                for svc_acc_id in ids {
                    self.remove_service_account(Some(svc_acc_id)).await;
                }
            }
        }

        if self.kafkas.is_empty() && self.service_accounts.is_empty() {
            self.resources_cleaned_up = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{self, Instant};

    use crate::api::payload::RESOURCE_NAME_PREFIX;

    use super::super::support::{
        call_count, calls_matching, json_response, scripted_session, status_response, test_config,
    };

    #[tokio::test(flavor = "current_thread")]
    async fn removal_on_an_empty_registry_is_a_no_op() {
        time::pause();

        let (mut session, calls) = scripted_session(test_config(), Vec::new());
        session.remove_kafka(None).await;
        session.remove_service_account(None).await;

        assert_eq!(call_count(&calls), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn removal_retries_until_terminal_status() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                status_response(500),
                status_response(500),
                status_response(404),
            ],
        );
        session.kafkas.push("kafka-1".to_owned());

        let t0 = Instant::now();
        session.remove_kafka(Some("kafka-1".to_owned())).await;
        let waited = t0.elapsed();

        assert_eq!(call_count(&calls), 3);
        assert!(session.kafkas.is_empty());
        // two backoff sleeps of attempt × uniform(0.05,0.1)
        assert!(waited >= Duration::from_secs_f64(0.05 + 0.10));
        assert!(waited < Duration::from_secs_f64(0.10 + 0.20));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn terminal_on_first_try_sleeps_never() {
        time::pause();

        let (mut session, calls) = scripted_session(test_config(), vec![status_response(204)]);
        session.service_accounts.push("acc-1".to_owned());

        let t0 = Instant::now();
        session.remove_service_account(None).await;

        assert_eq!(t0.elapsed(), Duration::ZERO);
        assert_eq!(call_count(&calls), 1);
        assert!(session.service_accounts.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn cleanup_skips_kafkas_when_none_are_created() {
        time::pause();

        let cfg = test_config(); // kafkas_to_create == 0
        let (mut session, calls) = scripted_session(cfg, vec![status_response(204)]);
        session.kafkas.push("kafka-1".to_owned());
        session.service_accounts.push("acc-1".to_owned());

        session.cleanup().await;

        assert_eq!(call_count(&calls), 1);
        assert_eq!(calls_matching(&calls, "/serviceaccounts/"), 1);
        assert_eq!(session.kafkas.len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn leftover_sweep_adopts_and_drains_everything() {
        time::pause();

        let mut cfg = test_config();
        cfg.kafkas_to_create = 2;

        let (mut session, calls) = scripted_session(
            cfg,
            vec![
                // leftover kafkas listing, then their deletes
                json_response(
                    200,
                    serde_json::json!({ "items": [ { "id": "k-1" }, { "id": "k-2" } ] }),
                ),
                status_response(204),
                status_response(404),
                // leftover service accounts, one foreign entry filtered out
                json_response(
                    200,
                    serde_json::json!({ "items": [
                        { "id": "sa-1", "name": format!("{RESOURCE_NAME_PREFIX}-svc-acc-x") },
                        { "id": "sa-2", "name": "someone-elses" },
                    ] }),
                ),
                status_response(204),
            ],
        );

        session.check_leftover_resources().await;

        assert!(session.resources_cleaned_up);
        assert!(session.kafkas.is_empty());
        assert!(session.service_accounts.is_empty());
        assert_eq!(call_count(&calls), 5);
        assert_eq!(calls_matching(&calls, "/serviceaccounts/sa-2"), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sweep_without_leftovers_marks_the_user_clean() {
        time::pause();

        let (mut session, _calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, serde_json::json!({ "items": [] })),
                json_response(200, serde_json::json!({ "items": [] })),
            ],
        );

        session.check_leftover_resources().await;
        assert!(session.resources_cleaned_up);
    }
}
