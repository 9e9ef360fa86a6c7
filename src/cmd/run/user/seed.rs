use tokio::time::sleep;

use crate::api::payload;

use super::{Session, phase::SEED_DRAIN_PAUSE};

impl Session {
    /// One seeding tick: create a kafka and immediately queue it for
    /// deletion, so the backing store fills with churn instead of live
    /// resources.
    pub(crate) async fn seed_tick(&mut self) {
        let body = payload::kafka_request(&mut self.rng);
        let Some(kafka_id) = self.api.create_kafka(&body).await else {
            return;
        };

        self.kafkas_created += 1;
        self.kafkas.push(kafka_id.clone());
        self.remove_kafka(Some(kafka_id)).await;

        if self.kafkas_created >= self.cfg.seed_kafkas {
            // let the backend work through the queued async deletions
            sleep(SEED_DRAIN_PAUSE).await;
            self.seeding = false;
            self.kafkas_created = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{self, Instant};

    use super::super::support::{
        call_count, json_response, scripted_session, status_response, test_config,
    };

    #[tokio::test(flavor = "current_thread")]
    async fn seed_reaches_target_then_drains_and_stops() {
        time::pause();

        let mut cfg = test_config();
        cfg.prepopulate_db = true;
        cfg.seed_kafkas = 3;

        let mut responses = Vec::new();
        for n in 0..3 {
            responses.push(json_response(
                202,
                serde_json::json!({ "id": format!("seed-{n}"), "status": "accepted" }),
            ));
            responses.push(status_response(204));
        }

        let (mut session, calls) = scripted_session(cfg, responses);
        assert!(session.seeding);

        let t0 = Instant::now();
        for _ in 0..3 {
            session.seed_tick().await;
        }

        assert!(!session.seeding);
        assert_eq!(session.kafkas_created, 0);
        assert!(session.kafkas.is_empty());
        // three creates, three deletes
        assert_eq!(call_count(&calls), 6);
        // the drain pause only fires after the third create
        assert!(t0.elapsed() >= Duration::from_secs(60));
        assert!(t0.elapsed() < Duration::from_secs(61));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_create_does_not_advance_the_seed_counter() {
        time::pause();

        let mut cfg = test_config();
        cfg.prepopulate_db = true;
        cfg.seed_kafkas = 2;

        let (mut session, calls) = scripted_session(cfg, vec![status_response(500)]);
        session.seed_tick().await;

        assert!(session.seeding);
        assert_eq!(session.kafkas_created, 0);
        assert_eq!(call_count(&calls), 1);
    }
}
