use rama::telemetry::tracing;
use serde_json::Value;

use crate::api::{KafkaConnectionConfig, payload};

use super::Session;

impl Session {
    /// Walk the kafka registry in order and confirm every entry: a ready
    /// status with a bootstrap host, a freshly provisioned service-account
    /// credential, and the connection config accepted by the config sink.
    ///
    /// A not-yet-ready entry blocks the walk; later entries are only looked
    /// at once everything before them confirmed. The persisted flag is set
    /// when (and only when) the last entry confirms.
    pub(crate) async fn wait_for_kafkas_ready(&mut self) {
        let mut confirmed = 0;
        while confirmed < self.kafkas.len() {
            let Some(kafka_id) = self.kafkas.get(confirmed).map(str::to_owned) else {
                break;
            };

            let Some(kafka) = self.api.get_kafka_json(&kafka_id).await else {
                // no body yet, the create may still be materializing
                self.backoff_uniform(1.0, 5.0).await;
                continue;
            };
            if kafka.get("status").is_none() {
                self.backoff_uniform(1.0, 5.0).await;
                continue;
            }

            let ready = kafka.get("status").and_then(Value::as_str) == Some("ready");
            let bootstrap_host = kafka
                .get("bootstrapServerHost")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let Some(bootstrap_url) = bootstrap_host.filter(|_| ready) else {
                // provisioning takes a while, poll at a coarse interval
                self.backoff_uniform(25.0, 30.0).await;
                continue;
            };

            self.provision_and_persist(&bootstrap_url).await;

            confirmed += 1;
            if confirmed == self.kafkas.len() {
                self.kafkas_persisted = true;
                tracing::info!(user = %self.user, "kafka config persisted for this worker");
            }
        }
    }

    /// Create a service-account credential (retrying until one sticks) and
    /// re-POST its connection config to the sink until it answers 204.
    async fn provision_and_persist(&mut self, bootstrap_url: &str) {
        loop {
            let account = payload::service_account_request(&mut self.rng);
            let Some(_svc_acc_id) = self.api.create_service_account(&account).await else {
                self.backoff_uniform(0.5, 1.0).await;
                continue;
            };

            let config = KafkaConnectionConfig {
                bootstrap_url: bootstrap_url.to_owned(),
                username: account.client_id,
                password: account.client_secret,
            };
            loop {
                if self.api.write_kafka_config(&config).await == Some(204) {
                    return;
                }
                self.backoff_uniform(1.0, 2.0).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{
        task::yield_now,
        time::{self, Instant},
    };

    use super::super::support::{
        calls_matching, json_response, scripted_session, status_response, test_config,
    };

    fn ready_kafka(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "status": "ready",
            "bootstrapServerHost": format!("{id}.kafka.example.com:443"),
        })
    }

    #[tokio::test(flavor = "current_thread")]
    async fn ready_without_host_backs_off_and_does_not_advance() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, serde_json::json!({ "id": "k-1", "status": "ready" })),
                json_response(200, ready_kafka("k-1")),
                json_response(201, serde_json::json!({ "id": "acc-1" })),
                status_response(204),
            ],
        );
        session.kafkas.push("k-1".to_owned());

        let t0 = Instant::now();
        session.wait_for_kafkas_ready().await;

        assert!(session.kafkas_persisted);
        // the incomplete detail answer forced a second poll of the same kafka
        assert_eq!(calls_matching(&calls, "/kafkas/k-1"), 2);
        assert!(t0.elapsed() >= Duration::from_secs(25));
        assert!(t0.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_status_uses_the_short_backoff() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, serde_json::json!({ "id": "k-1" })),
                json_response(200, ready_kafka("k-1")),
                json_response(201, serde_json::json!({ "id": "acc-1" })),
                status_response(204),
            ],
        );
        session.kafkas.push("k-1".to_owned());

        let t0 = Instant::now();
        session.wait_for_kafkas_ready().await;

        assert!(session.kafkas_persisted);
        assert_eq!(calls_matching(&calls, "/kafkas/k-1"), 2);
        assert!(t0.elapsed() >= Duration::from_secs(1));
        assert!(t0.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sink_rejection_retries_the_post_not_the_credential() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, ready_kafka("k-1")),
                json_response(201, serde_json::json!({ "id": "acc-1" })),
                status_response(500),
                status_response(500),
                status_response(204),
            ],
        );
        session.kafkas.push("k-1".to_owned());

        let t0 = Instant::now();
        session.wait_for_kafkas_ready().await;

        assert!(session.kafkas_persisted);
        assert_eq!(calls_matching(&calls, "/serviceaccounts"), 1);
        assert_eq!(calls_matching(&calls, "write_kafka_config"), 3);
        // two sink backoffs of uniform(1,2)s each
        assert!(t0.elapsed() >= Duration::from_secs(2));
        assert!(t0.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn credential_failure_retries_creation_before_persisting() {
        time::pause();

        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, ready_kafka("k-1")),
                status_response(500),
                json_response(201, serde_json::json!({ "id": "acc-1" })),
                status_response(204),
            ],
        );
        session.kafkas.push("k-1".to_owned());

        let t0 = Instant::now();
        session.wait_for_kafkas_ready().await;

        assert!(session.kafkas_persisted);
        assert_eq!(calls_matching(&calls, "/serviceaccounts"), 2);
        assert_eq!(calls_matching(&calls, "write_kafka_config"), 1);
        assert!(t0.elapsed() >= Duration::from_secs_f64(0.5));
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn persisted_is_never_set_while_an_entry_is_unconfirmed() {
        time::pause();

        // first kafka confirms fully, the second never leaves "accepted";
        // once the script runs dry every further call answers 404
        let (mut session, calls) = scripted_session(
            test_config(),
            vec![
                json_response(200, ready_kafka("k-1")),
                json_response(201, serde_json::json!({ "id": "acc-1" })),
                status_response(204),
                json_response(200, serde_json::json!({ "id": "k-2", "status": "accepted" })),
            ],
        );
        session.kafkas.push("k-1".to_owned());
        session.kafkas.push("k-2".to_owned());

        let poller = tokio::spawn(async move {
            session.wait_for_kafkas_ready().await;
            session
        });

        // a finished poller would mean the flag was set with k-2 unconfirmed
        for _ in 0..8 {
            time::advance(Duration::from_secs(30)).await;
            yield_now().await;
            assert!(!poller.is_finished());
        }

        assert_eq!(calls_matching(&calls, "write_kafka_config"), 1);
        assert!(calls_matching(&calls, "/kafkas/k-2") >= 2);
        poller.abort();
    }
}
