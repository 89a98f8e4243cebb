//! Engine configuration: validated defaults instead of magic numbers
//! scattered through call sites (§4.8), patterned on the teacher's
//! `system::config::SystemConfig` builder.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::mailbox::{DEFAULT_MAILBOX_CAPACITY, MIN_MAILBOX_CAPACITY};
use crate::monitoring::{InMemoryMonitor, Monitor, MonitoringConfig, NoopMonitor, RuntimeEvent};

/// No implementation-defined cap by default: `spawn` only fails with
/// `TooManyWorkers` if the caller opts into a cap via
/// [`EngineConfigBuilder::with_max_workers`].
pub const DEFAULT_MAX_WORKERS: usize = usize::MAX;

/// Which [`Monitor`] implementation the engine installs.
pub enum MonitorChoice {
    /// [`NoopMonitor`] -- the default, zero overhead.
    Noop,
    /// [`InMemoryMonitor`] with the given configuration.
    InMemory(MonitoringConfig),
}

impl std::fmt::Debug for MonitorChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Noop => write!(f, "Noop"),
            Self::InMemory(config) => f.debug_tuple("InMemory").field(config).finish(),
        }
    }
}

impl Default for MonitorChoice {
    fn default() -> Self {
        Self::Noop
    }
}

impl MonitorChoice {
    pub(crate) fn build(self) -> Arc<dyn Monitor<RuntimeEvent>> {
        match self {
            Self::Noop => Arc::new(NoopMonitor::new()),
            Self::InMemory(config) => Arc::new(InMemoryMonitor::new(config)),
        }
    }
}

/// Errors produced while validating an [`EngineConfigBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested default mailbox capacity was below
    /// [`MIN_MAILBOX_CAPACITY`].
    #[error("default mailbox capacity {requested} is below the floor of {floor}")]
    MailboxCapacityTooSmall {
        /// What the caller asked for.
        requested: usize,
        /// The enforced floor.
        floor: usize,
    },
    /// `with_max_workers` was called with zero.
    #[error("max_workers must be greater than zero")]
    ZeroMaxWorkers,
}

/// Validated engine configuration: default mailbox capacity, an optional
/// worker-count cap, and which monitor to install.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    default_mailbox_capacity: usize,
    max_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl EngineConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// The mailbox capacity `Worker::register_actor` uses unless the
    /// caller overrides it per actor.
    pub fn default_mailbox_capacity(&self) -> usize {
        self.default_mailbox_capacity
    }

    /// The configured worker-count cap (`usize::MAX` if unset).
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }
}

/// Builder for [`EngineConfig`]. Validates on [`build`](Self::build) rather
/// than panicking on bad input.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    default_mailbox_capacity: Option<usize>,
    max_workers: Option<usize>,
    monitor: Option<MonitorChoiceSlot>,
}

/// `MonitorChoice` doesn't implement `Debug` cleanly when boxed as `Option`
/// without a marker; this newtype keeps the builder's `#[derive(Debug)]`
/// honest without requiring `Monitor` itself to be `Debug`.
#[derive(Debug)]
struct MonitorChoiceSlot(MonitorChoice);

impl EngineConfigBuilder {
    /// Override the default per-actor mailbox capacity. Clamped up to
    /// [`MIN_MAILBOX_CAPACITY`] on `build`, failing instead if the caller
    /// explicitly asked for less.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.default_mailbox_capacity = Some(capacity);
        self
    }

    /// Set a cap on the number of workers `Engine::spawn` will accept.
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = Some(max);
        self
    }

    /// Install [`NoopMonitor`] (this is also the default if never called).
    pub fn with_noop_monitor(mut self) -> Self {
        self.monitor = Some(MonitorChoiceSlot(MonitorChoice::Noop));
        self
    }

    /// Install [`InMemoryMonitor`] with the given configuration.
    pub fn with_in_memory_monitor(mut self, config: MonitoringConfig) -> Self {
        self.monitor = Some(MonitorChoiceSlot(MonitorChoice::InMemory(config)));
        self
    }

    /// Validate and produce the configuration plus the chosen monitor.
    pub fn build(self) -> Result<(EngineConfig, MonitorChoice), ConfigError> {
        let default_mailbox_capacity = self
            .default_mailbox_capacity
            .unwrap_or(DEFAULT_MAILBOX_CAPACITY);
        if default_mailbox_capacity < MIN_MAILBOX_CAPACITY {
            return Err(ConfigError::MailboxCapacityTooSmall {
                requested: default_mailbox_capacity,
                floor: MIN_MAILBOX_CAPACITY,
            });
        }

        let max_workers = self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS);
        if max_workers == 0 {
            return Err(ConfigError::ZeroMaxWorkers);
        }

        let monitor = self
            .monitor
            .map(|slot| slot.0)
            .unwrap_or(MonitorChoice::Noop);

        Ok((
            EngineConfig {
                default_mailbox_capacity,
                max_workers,
            },
            monitor,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let (config, _monitor) = EngineConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.default_mailbox_capacity(), DEFAULT_MAILBOX_CAPACITY);
        assert_eq!(config.max_workers(), DEFAULT_MAX_WORKERS);
    }

    #[test]
    fn rejects_a_mailbox_capacity_below_the_floor() {
        let result = EngineConfig::builder().with_mailbox_capacity(1).build();
        assert_eq!(
            result,
            Err(ConfigError::MailboxCapacityTooSmall {
                requested: 1,
                floor: MIN_MAILBOX_CAPACITY,
            })
        );
    }

    #[test]
    fn rejects_zero_max_workers() {
        let result = EngineConfig::builder().with_max_workers(0).build();
        assert_eq!(result, Err(ConfigError::ZeroMaxWorkers));
    }

    #[test]
    fn accepts_custom_values() {
        let (config, _monitor) = EngineConfig::builder()
            .with_mailbox_capacity(256)
            .with_max_workers(8)
            .build()
            .expect("valid configuration");
        assert_eq!(config.default_mailbox_capacity(), 256);
        assert_eq!(config.max_workers(), 8);
    }
}
