use std::time::Duration;

use gamebot_core::default_retry_delays;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Game API base URL, without a trailing slash.
    pub base_url: String,

    /// Sleep between two cycles.
    pub cycle_interval: Duration,
    /// Pause after each successful action.
    pub action_delay: Duration,
    /// Upper bound for a single remote call, as seen by the supervisor.
    pub call_timeout: Duration,
    /// Request timeout configured on the HTTP client.
    pub http_timeout: Duration,
    /// Whole-cycle retry delays, walked once per failure episode.
    pub retry_delays: Vec<Duration>,

    /// Stop after this many completed cycles. `None` runs forever.
    pub max_cycles: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            cycle_interval: Duration::from_secs(300),
            action_delay: Duration::from_secs(10),
            call_timeout: Duration::from_secs(30),
            http_timeout: Duration::from_secs(10),
            retry_delays: default_retry_delays(),
            max_cycles: None,
        }
    }
}
