/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Configuration for Acton chains and the select engine.
///
/// Loaded from `chain.toml` in the XDG-compliant `acton` configuration
/// directory. Every section is optional; missing values take their defaults.
///
/// ```toml
/// [limits]
/// default_chain_capacity = 1024
/// finalizer_chain_capacity = 64
///
/// [timeouts]
/// default_overflow_wait_ms = 250
///
/// [defaults]
/// finalizer_thread_name = "acton-finalizer"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Capacity limits.
    pub limits: LimitsConfig,
    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
    /// Default names and values.
    pub defaults: DefaultsConfig,
}

/// Capacity limits for chains created without explicit parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Capacity used by `ChainParams::default()`. `None` means unbounded.
    pub default_chain_capacity: Option<usize>,
    /// Capacity of the finalizer's task chain. `None` means unbounded.
    pub finalizer_chain_capacity: Option<usize>,
}

/// Timeout-related configuration values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long `send` waits for space on a full bounded chain before the
    /// overflow reaction applies. `None` waits until space frees up.
    pub default_overflow_wait_ms: Option<u64>,
}

/// Default values configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Name given to the finalizer's dedicated thread.
    pub finalizer_thread_name: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            finalizer_thread_name: "acton-finalizer".to_string(),
        }
    }
}

impl ChainConfig {
    /// The overflow wait as a `Duration`, if one is configured.
    #[must_use]
    pub fn default_overflow_wait(&self) -> Option<Duration> {
        self.timeouts
            .default_overflow_wait_ms
            .map(Duration::from_millis)
    }

    /// Load configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        toml::from_str::<Self>(&raw)
            .with_context(|| format!("failed to parse configuration file {}", path.display()))
    }

    /// Load configuration from XDG-compliant locations.
    ///
    /// Looks for `$XDG_CONFIG_HOME/acton/chain.toml` (falling back to the
    /// platform's usual configuration directories). A missing file yields the
    /// defaults; a malformed one is logged and also yields the defaults.
    pub fn load() -> Self {
        use tracing::{error, info};

        let xdg_dirs = match xdg::BaseDirectories::with_prefix("acton") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("chain.toml") {
            Some(path) => {
                info!("Loading chain configuration from: {}", path.display());
                Self::load_from(&path).unwrap_or_else(|e| {
                    error!("{:#}", e);
                    Self::default()
                })
            }
            None => {
                info!("No chain configuration file found, using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Global configuration instance loaded from XDG-compliant locations.
    pub static ref CONFIG: ChainConfig = ChainConfig::load();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded_without_overflow_wait() {
        let config = ChainConfig::default();
        assert_eq!(config.limits.default_chain_capacity, None);
        assert_eq!(config.limits.finalizer_chain_capacity, None);
        assert_eq!(config.default_overflow_wait(), None);
        assert_eq!(config.defaults.finalizer_thread_name, "acton-finalizer");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: ChainConfig = toml::from_str(
            r"
            [timeouts]
            default_overflow_wait_ms = 40
            ",
        )
        .unwrap();
        assert_eq!(config.default_overflow_wait(), Some(Duration::from_millis(40)));
        assert_eq!(config.limits.default_chain_capacity, None);
        assert_eq!(config.defaults.finalizer_thread_name, "acton-finalizer");
    }
}
