mod human;
mod json;

pub use self::{human::HumanReporter, json::JsonlReporter};

use crate::api::RequestEvent;

pub trait Reporter: Send + Sync + 'static {
    fn on_result(&mut self, ev: &RequestEvent);
    fn on_tick(&mut self, now: std::time::Duration);
    fn finish(&mut self);
}

#[derive(Default)]
pub struct Counters {
    total: u64,
    ok: u64,
    http_fail: u64,
    other_fail: u64,
    latency_sum: std::time::Duration,
    latency_max: std::time::Duration,
}
