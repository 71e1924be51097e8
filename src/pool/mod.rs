//! # Pool Elástico de Workers
//!
//! Un conjunto de threads worker de larga vida más un thread manager. Los
//! workers toman tareas de la `TaskQueue`; el manager despierta cada
//! `manager_interval` y ajusta el número de workers entre `min_threads` y
//! `max_threads` según la carga observada.
//!
//! ```text
//!            submit()                 ┌──────────┐
//! reactor ───────────► TaskQueue ───► │ worker-N │ ──► task()
//!                          ▲          └──────────┘
//!                          │ crece / encoge
//!                    pool-manager
//! ```

pub mod queue;
pub mod workers;

pub use queue::{Task, TaskQueue};
pub use workers::{PoolStats, ThreadPool};

use crate::config::Config;
use std::time::Duration;
use thiserror::Error;

/// Workers que el manager marca para salir en cada ciclo de encogimiento
pub const SHRINK_STEP: usize = 2;

#[derive(Debug, Error)]
pub enum PoolError {
    /// `submit` después de iniciado el shutdown
    #[error("thread pool is shutting down")]
    ShuttingDown,

    #[error("invalid thread bounds: min={min}, max={max}")]
    InvalidBounds { min: usize, max: usize },

    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Configuración del pool
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_threads: usize,
    pub max_threads: usize,
    pub manager_interval: Duration,
    pub shrink_step: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_threads: 4,
            max_threads: 16,
            manager_interval: Duration::from_secs(5),
            shrink_step: SHRINK_STEP,
        }
    }
}

impl PoolConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_threads: config.min_threads,
            max_threads: config.max_threads,
            manager_interval: Duration::from_millis(config.manager_interval_ms),
            shrink_step: SHRINK_STEP,
        }
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.min_threads == 0 || self.min_threads > self.max_threads {
            return Err(PoolError::InvalidBounds {
                min: self.min_threads,
                max: self.max_threads,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.min_threads = 2;
        config.max_threads = 3;
        config.manager_interval_ms = 250;

        let pool_config = PoolConfig::from_config(&config);
        assert_eq!(pool_config.min_threads, 2);
        assert_eq!(pool_config.max_threads, 3);
        assert_eq!(pool_config.manager_interval, Duration::from_millis(250));
        assert_eq!(pool_config.shrink_step, SHRINK_STEP);
    }

    #[test]
    fn test_validate_bounds() {
        let ok = PoolConfig::default();
        assert!(ok.validate().is_ok());

        let zero = PoolConfig { min_threads: 0, ..PoolConfig::default() };
        assert!(matches!(zero.validate(), Err(PoolError::InvalidBounds { .. })));

        let inverted = PoolConfig { min_threads: 5, max_threads: 2, ..PoolConfig::default() };
        assert!(matches!(inverted.validate(), Err(PoolError::InvalidBounds { min: 5, max: 2 })));
    }
}
