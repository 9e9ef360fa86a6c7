use std::str::FromStr;
use std::time::Duration;

use rama::{
    error::{ErrorContext as _, OpaqueError},
    telemetry::tracing,
};

/// API base path, used unless `PERF_TEST_BASE_API_URL` overrides it.
pub const DEFAULT_BASE_API_PATH: &str = "/api/managed-services-api/v1";

/// Config sink endpoint, used unless `PERF_TEST_CONFIG_SINK_URL` overrides it.
pub const DEFAULT_CONFIG_SINK_URL: &str = "http://api:8099/write_kafka_config";

/// Performance-run options, read from `PERF_TEST_*` environment variables.
///
/// One instance is shared (read-only) by every virtual user of a run.
#[derive(Debug, Clone)]
pub struct PerfConfig {
    /// only GET endpoints are attacked
    pub get_only: bool,

    /// seed the backing store with kafkas before exercising
    pub prepopulate_db: bool,

    /// number of seed kafkas per worker, only used while `prepopulate_db` is set
    pub seed_kafkas: u32,

    /// pause after each kafka creation during the fill stage
    pub kafka_post_wait: Duration,

    /// number of kafkas each worker creates and keeps during the exercise stage
    pub kafkas_to_create: usize,

    /// total run duration
    pub run_time: Duration,

    /// minutes to wait after start before hitting the weighted endpoint mix
    pub hold_off_minutes: u64,

    /// path prefix of the fleet API, appended to the target origin
    pub base_api_path: String,

    /// endpoint that receives the kafka connection configs
    pub config_sink_url: String,

    /// token endpoint + client credentials; unset means unauthenticated
    pub sso: Option<SsoConfig>,
}

/// Client-credentials grant parameters for the SSO token endpoint.
#[derive(Debug, Clone)]
pub struct SsoConfig {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl PerfConfig {
    /// Read every recognized `PERF_TEST_*` option from the environment.
    ///
    /// Only `PERF_TEST_RUN_TIME` is required; everything else falls back to
    /// a default that results in a GET-only-ish idle run.
    pub fn from_env() -> Result<Self, OpaqueError> {
        let get_only = env_flag("PERF_TEST_GET_ONLY");
        let prepopulate_db = env_flag("PERF_TEST_PREPOPULATE_DB");
        let seed_kafkas = env_parsed("PERF_TEST_PREPOPULATE_DB_KAFKA_PER_WORKER").unwrap_or(0);
        let kafka_post_wait =
            Duration::from_secs(env_parsed("PERF_TEST_KAFKA_POST_WAIT_TIME").unwrap_or(1));
        let kafkas_to_create = env_parsed("PERF_TEST_KAFKAS_PER_WORKER").unwrap_or(0);
        let run_time = parse_run_time(
            &env_var("PERF_TEST_RUN_TIME")
                .context("read required env option PERF_TEST_RUN_TIME")?,
        )?;
        let hold_off_minutes = env_parsed("PERF_TEST_HIT_ENDPOINTS_HOLD_OFF").unwrap_or(0);
        let base_api_path =
            env_var("PERF_TEST_BASE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_API_PATH.to_owned());
        let config_sink_url = env_var("PERF_TEST_CONFIG_SINK_URL")
            .unwrap_or_else(|_| DEFAULT_CONFIG_SINK_URL.to_owned());

        let sso = env_var("PERF_TEST_SSO_TOKEN_URL").ok().map(|token_url| SsoConfig {
            token_url,
            client_id: env_var("PERF_TEST_SSO_CLIENT_ID").unwrap_or_default(),
            client_secret: env_var("PERF_TEST_SSO_CLIENT_SECRET").unwrap_or_default(),
        });

        if get_only && kafkas_to_create > 0 {
            // the literal guards keep the write-shaped branches reachable here
            tracing::warn!(
                %kafkas_to_create,
                "GET-only mode combined with a non-zero kafka creation target: write endpoints stay reachable",
            );
        }

        Ok(Self {
            get_only,
            prepopulate_db,
            seed_kafkas,
            kafka_post_wait,
            kafkas_to_create,
            run_time,
            hold_off_minutes,
            base_api_path,
            config_sink_url,
            sso,
        })
    }
}

fn env_var(name: &str) -> Result<String, std::env::VarError> {
    std::env::var(name)
}

/// A flag option is on if and only if it is set to the literal `TRUE`.
fn env_flag(name: &str) -> bool {
    matches!(std::env::var(name).as_deref(), Ok("TRUE"))
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Parse a run duration like `"30m"`: the numeric prefix counts minutes,
/// anything after it is ignored.
pub(crate) fn parse_run_time(raw: &str) -> Result<Duration, OpaqueError> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let minutes: u64 = raw[..end]
        .parse()
        .with_context(|| format!("parse run time '{raw}' as minutes"))?;
    Ok(Duration::from_secs(minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_time_parses_numeric_prefix_as_minutes() {
        assert_eq!(
            parse_run_time("30m").expect("parse"),
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            parse_run_time("5").expect("parse"),
            Duration::from_secs(5 * 60)
        );
        assert_eq!(
            parse_run_time("120min").expect("parse"),
            Duration::from_secs(120 * 60)
        );
        assert_eq!(
            parse_run_time(" 2m ").expect("parse"),
            Duration::from_secs(2 * 60)
        );
    }

    #[test]
    fn run_time_without_digits_is_rejected() {
        assert!(parse_run_time("m").is_err());
        assert!(parse_run_time("").is_err());
        assert!(parse_run_time("half an hour").is_err());
    }
}
