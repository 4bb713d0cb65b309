use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_MAX_FEATURES: usize = 3000;
pub const DEFAULT_OVERFETCH_MARGIN: usize = 100;

/// Tunables for fitting and querying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on vocabulary size.
    pub max_features: usize,
    /// Extra ranked candidates kept beyond `top_n` before genre filtering.
    pub overfetch_margin: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_features: DEFAULT_MAX_FEATURES, overfetch_margin: DEFAULT_OVERFETCH_MARGIN }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(f))?;
        Ok(config)
    }
}
