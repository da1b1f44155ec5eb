use std::time::Duration;

use typed_builder::TypedBuilder;

use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "http://localhost:8080";

/// Knobs of a single load run.
///
/// Every field has a default so `LoadConfig::builder().build()` describes the
/// stock run: 20 teams of 10 members, 100 workers for one minute.
#[derive(Debug, Clone, TypedBuilder)]
pub struct LoadConfig {
    #[builder(default = DEFAULT_HOST.to_string(), setter(into))]
    pub host: String,

    /// Number of teams provisioned before the run starts.
    #[builder(default = 20)]
    pub pool_size: usize,

    /// Members created in every provisioned team.
    #[builder(default = 10)]
    pub member_count: usize,

    #[builder(default = Duration::from_millis(50))]
    pub wait_min: Duration,

    #[builder(default = Duration::from_millis(300))]
    pub wait_max: Duration,

    #[builder(default = Duration::from_secs(10))]
    pub request_timeout: Duration,

    #[builder(default = 100)]
    pub workers: usize,

    #[builder(default = Duration::from_secs(60))]
    pub duration: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LoadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.wait_min > self.wait_max {
            return Err(ConfigError::InvertedThinkTime {
                min: self.wait_min,
                max: self.wait_max,
            });
        }
        Ok(())
    }
}
