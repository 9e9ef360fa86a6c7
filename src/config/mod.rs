mod perf;

pub use self::perf::{DEFAULT_BASE_API_PATH, DEFAULT_CONFIG_SINK_URL, PerfConfig, SsoConfig};
