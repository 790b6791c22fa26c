//! Cache operating mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the response cache participates in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// No caching; callers always fetch live. Existing cache data is left alone.
    #[default]
    Off,
    /// Wipe the cache directory at startup and record every live response.
    Store,
    /// Replay previously stored responses; never touch the network.
    Reuse,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::Off => "off",
            CacheMode::Store => "store",
            CacheMode::Reuse => "reuse",
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(CacheMode::Off),
            "store" => Ok(CacheMode::Store),
            "reuse" => Ok(CacheMode::Reuse),
            other => Err(format!("unknown cache mode '{other}' (expected off, store or reuse)")),
        }
    }
}
