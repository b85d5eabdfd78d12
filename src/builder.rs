use crate::{Config, Result, TickflowError, registry::Registry, scheduler::WorkflowScheduler};

pub struct SchedulerBuilder {
    registry: Option<Registry>,
    config: Config,
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self {
            registry: None,
            config: Config::default(),
        }
    }
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry to dispatch with, defaults to the built-in kinds only.
    pub fn registry(
        mut self,
        registry: Registry,
    ) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn max_ticks(
        mut self,
        n: u64,
    ) -> Self {
        self.config.scheduler.max_ticks = n;
        self
    }

    pub fn handler_timeout_ms(
        mut self,
        ms: u64,
    ) -> Self {
        self.config.scheduler.handler_timeout_ms = Some(ms);
        self
    }

    pub fn context_capacity(
        mut self,
        n: usize,
    ) -> Self {
        self.config.scheduler.context_capacity = n;
        self
    }

    pub fn build(self) -> Result<WorkflowScheduler> {
        if self.config.scheduler.max_ticks == 0 {
            return Err(TickflowError::Config("max_ticks must be greater than 0".to_string()));
        }
        let registry = self.registry.unwrap_or_else(Registry::with_builtins);

        Ok(WorkflowScheduler::with_config(registry, self.config.scheduler))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::kinds::{ArrayIterator, NodeKind};

    #[test]
    fn test_build_defaults() {
        let scheduler = SchedulerBuilder::new().build().unwrap();
        assert_eq!(scheduler.config().max_ticks, 10_000);
        assert!(scheduler.registry().class_handler(ArrayIterator::TYPE).is_some());
    }

    #[test]
    fn test_overrides_apply_over_config() {
        let config = Config::load_from_str("[scheduler]\nmax_ticks = 7\ncontext_capacity = 16").unwrap();
        let scheduler = SchedulerBuilder::new().config(config).handler_timeout_ms(30).build().unwrap();
        assert_eq!(scheduler.config().max_ticks, 7);
        assert_eq!(scheduler.config().context_capacity, 16);
        assert_eq!(scheduler.config().handler_timeout(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn test_custom_registry_replaces_builtins() {
        let scheduler = SchedulerBuilder::new().registry(Registry::new()).build().unwrap();
        assert!(scheduler.registry().class_handler(ArrayIterator::TYPE).is_none());
    }

    #[test]
    fn test_zero_max_ticks_is_rejected() {
        let err = SchedulerBuilder::new().max_ticks(0).build().err();
        assert_eq!(err, Some(TickflowError::Config("max_ticks must be greater than 0".to_string())));
    }
}
