//! Runtime configuration for [`Support`](crate::support::Support).
//!
//! # Environment
//!
//! | Variable                       | Effect                                  |
//! |--------------------------------|-----------------------------------------|
//! | `REGISTERMAPS_RESOURCE_DIR`    | directory searched before the bundle    |
//! | `REGISTERMAPS_VERBOSE`         | `1`, `true`, `yes`, `on` enable verbose |
//! | `REGISTERMAPS_CACHE_CAPACITY`  | entries per resolver cache (default 64) |
//!
//! [`SupportConfig::from_env`] reads the process environment and delegates
//! to [`SupportConfig::from_lookup`]; tests call `from_lookup` directly.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::resource::DEFAULT_CACHE_CAPACITY;

pub const ENV_RESOURCE_DIR: &str = "REGISTERMAPS_RESOURCE_DIR";
pub const ENV_VERBOSE: &str = "REGISTERMAPS_VERBOSE";
pub const ENV_CACHE_CAPACITY: &str = "REGISTERMAPS_CACHE_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportConfig {
    /// Directory layered in front of the embedded bundle.
    pub resource_dir: Option<PathBuf>,
    /// Capacity of each resolver cache.
    pub cache_capacity: NonZeroUsize,
    pub verbose: bool,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            resource_dir: None,
            cache_capacity: default_capacity(),
            verbose: false,
        }
    }
}

fn default_capacity() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}

impl SupportConfig {
    /// Configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults. An unparseable cache
    /// capacity is logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_RESOURCE_DIR).filter(|d| !d.trim().is_empty()) {
            config.resource_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_VERBOSE) {
            config.verbose = parse_flag(&raw);
        }

        if let Some(raw) = lookup(ENV_CACHE_CAPACITY).filter(|c| !c.trim().is_empty()) {
            match raw.trim().parse::<NonZeroUsize>() {
                Ok(capacity) => config.cache_capacity = capacity,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "ignoring {ENV_CACHE_CAPACITY}; using {DEFAULT_CACHE_CAPACITY}"
                ),
            }
        }

        config
    }

    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
