use std::env;

use thiserror::Error;

const BATCH_SIZE_VAR: &str = "BATCH_SIZE";
const WORKERS_VAR: &str = "WORKERS";

/// Configuration errors raised before a pipeline run starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be at least 1, got {value}")]
    OutOfRange { name: &'static str, value: usize },

    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Validated pipeline sizing: records per batch and writer count
///
/// Both values must be at least 1; the pipeline refuses to start otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    batch_size: usize,
    workers: usize,
}

impl IngestConfig {
    pub fn new(batch_size: usize, workers: usize) -> Result<Self, ConfigError> {
        if batch_size < 1 {
            return Err(ConfigError::OutOfRange {
                name: "batch_size",
                value: batch_size,
            });
        }
        if workers < 1 {
            return Err(ConfigError::OutOfRange {
                name: "workers",
                value: workers,
            });
        }
        Ok(Self {
            batch_size,
            workers,
        })
    }

    /// Load sizing from `BATCH_SIZE` and `WORKERS`; both must be set
    pub fn from_env() -> Result<Self, ConfigError> {
        let batch_size = resolve_var(BATCH_SIZE_VAR, env::var(BATCH_SIZE_VAR).ok(), None)?;
        let workers = resolve_var(WORKERS_VAR, env::var(WORKERS_VAR).ok(), None)?;
        Self::new(batch_size, workers)
    }

    /// Load sizing from the environment, filling each unset variable
    /// from its default independently
    ///
    /// A set variable always wins over its default, and an invalid value
    /// is an error rather than a silent fallback.
    pub fn from_env_or(default_batch_size: usize, default_workers: usize) -> Result<Self, ConfigError> {
        let batch_size = resolve_var(
            BATCH_SIZE_VAR,
            env::var(BATCH_SIZE_VAR).ok(),
            Some(default_batch_size),
        )?;
        let workers = resolve_var(WORKERS_VAR, env::var(WORKERS_VAR).ok(), Some(default_workers))?;
        Self::new(batch_size, workers)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

fn resolve_var(
    name: &'static str,
    value: Option<String>,
    default: Option<usize>,
) -> Result<usize, ConfigError> {
    match value {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
        None => default.ok_or(ConfigError::MissingVar(name)),
    }
}
