use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::{Result, TickflowError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// scheduler config
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// upper bound of ticks for a run-to-completion call, defaults to 10000
    pub max_ticks: u64,
    /// handler deadline in milliseconds, unset means no deadline
    pub handler_timeout_ms: Option<u64>,
    /// initial size of the context value store, defaults to 1024; it grows as needed
    pub context_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_ticks: 10_000,
            handler_timeout_ms: None,
            context_capacity: 1024,
        }
    }
}

impl SchedulerConfig {
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref()).map_err(|e| TickflowError::Config(format!("failed to load config file {:?}: {}", path.as_ref(), e)))?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_str)?;
        Ok(config)
    }
}
