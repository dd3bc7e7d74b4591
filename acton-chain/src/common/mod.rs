//! Provides configuration and shared internal types for the Acton chain crate.
//!
//! # Key Re-exported Components:
//!
//! *   [`ChainConfig`]: XDG-loaded configuration for chain defaults and the finalizer.
//! *   [`CONFIG`]: The lazily loaded global configuration instance.
//!
//! The internal `types` module holds handler signatures and deadline helpers.

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

// --- Public Re-exports ---
pub use config::{ChainConfig, DefaultsConfig, LimitsConfig, TimeoutConfig, CONFIG};

// --- Crate-Internal Re-exports ---
pub(crate) use types::*;

// --- Submodules ---

/// Defines the configuration system for the Acton chain crate.
pub mod config;

/// Defines common internal type aliases and helpers.
mod types;
