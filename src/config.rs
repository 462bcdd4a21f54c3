//! Process configuration from the environment (after `.env` loading)

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const AIRPORTS_CSV_VAR: &str = "FDM_AIRPORTS_CSV";
pub const RUNWAYS_CSV_VAR: &str = "FDM_RUNWAYS_CSV";
pub const THRESHOLDS_VAR: &str = "FDM_THRESHOLDS";
pub const WORKERS_VAR: &str = "FDM_WORKERS";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub airports_csv: Option<PathBuf>,
    pub runways_csv: Option<PathBuf>,
    pub thresholds: Option<PathBuf>,
    pub workers: Option<usize>, // rayon pool size; rayon's default when unset
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests do not have to touch the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let workers = non_empty(WORKERS_VAR)
            .map(|v| {
                v.trim()
                    .parse::<usize>()
                    .with_context(|| format!("{} must be a positive integer, got {:?}", WORKERS_VAR, v))
            })
            .transpose()?;

        Ok(Self {
            airports_csv: non_empty(AIRPORTS_CSV_VAR).map(PathBuf::from),
            runways_csv: non_empty(RUNWAYS_CSV_VAR).map(PathBuf::from),
            thresholds: non_empty(THRESHOLDS_VAR).map(PathBuf::from),
            workers,
        })
    }
}
