use std::collections::BTreeMap;

use crate::api::{FailureKind, RequestEvent};

use super::{Counters, Reporter};

pub struct HumanReporter {
    interval: std::time::Duration,
    last_tick: std::time::Duration,
    interval_counts: Counters,
    total_counts: Counters,
    endpoint_counts: BTreeMap<&'static str, Counters>,
}

impl HumanReporter {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval,
            last_tick: std::time::Duration::ZERO,
            interval_counts: Counters::default(),
            total_counts: Counters::default(),
            endpoint_counts: BTreeMap::new(),
        }
    }

    pub(super) fn apply_counts(c: &mut Counters, ev: &RequestEvent) {
        c.total += 1;
        c.latency_sum += ev.latency;
        c.latency_max = c.latency_max.max(ev.latency);
        if ev.outcome.ok {
            c.ok += 1;
            return;
        }
        match ev.outcome.failure {
            Some(FailureKind::HttpStatus) => c.http_fail += 1,
            _ => c.other_fail += 1,
        }
    }
}

impl Reporter for HumanReporter {
    fn on_result(&mut self, ev: &RequestEvent) {
        Self::apply_counts(&mut self.interval_counts, ev);
        Self::apply_counts(&mut self.total_counts, ev);
        Self::apply_counts(self.endpoint_counts.entry(ev.endpoint).or_default(), ev);
    }

    fn on_tick(&mut self, now: std::time::Duration) {
        if now.saturating_sub(self.last_tick) < self.interval {
            return;
        }
        self.last_tick = now;

        let rps = self.interval_counts.total as f64 / self.interval.as_secs_f64();

        println!(
            "t={:.1}s rps={:.1} ok={} http_fail={} other_fail={} total_ok={} total_fail={}",
            now.as_secs_f64(),
            rps,
            self.interval_counts.ok,
            self.interval_counts.http_fail,
            self.interval_counts.other_fail,
            self.total_counts.ok,
            self.total_counts.total - self.total_counts.ok,
        );

        self.interval_counts = Counters::default();
    }

    fn finish(&mut self) {
        println!(
            "done ok={} http_fail={} other_fail={} total={}",
            self.total_counts.ok,
            self.total_counts.http_fail,
            self.total_counts.other_fail,
            self.total_counts.total,
        );
        for (endpoint, counts) in &self.endpoint_counts {
            let avg_ms = if counts.total == 0 {
                0.
            } else {
                counts.latency_sum.as_secs_f64() * 1000. / counts.total as f64
            };
            println!(
                "  {endpoint} total={} ok={} avg_latency_ms={avg_ms:.1} max_latency_ms={:.1}",
                counts.total,
                counts.ok,
                counts.latency_max.as_secs_f64() * 1000.,
            );
        }
    }
}
