use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub queue: QueueConfig,
    pub task_log: TaskLogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: u32,
    pub evict_after_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueueConfig {
    pub max_pending: usize,
    pub idle_evict_ms: u64,
    pub sweep_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TaskLogConfig {
    pub path: String,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn evict_after(&self) -> Duration {
        Duration::from_millis(self.evict_after_ms)
    }
}

impl QueueConfig {
    pub fn idle_evict(&self) -> Duration {
        Duration::from_millis(self.idle_evict_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
