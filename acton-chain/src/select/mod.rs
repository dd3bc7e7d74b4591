//! Provides the multiplexed select engine over one or more chains.
//!
//! # Key Components
//!
//! *   [`Case`] / [`case`]: Binds a chain to handlers keyed by message type.
//! *   [`SelectParams`] / [`from_all`]: Termination policy of a select run.
//! *   [`select`] and [`receive`]: One-shot selects over a fixed set of cases.
//! *   [`ExtensibleSelect`]: A reusable select session whose cases can grow between runs.
//! *   [`SelectResult`]: Extraction and handling counts plus the final [`ExtractionStatus`].

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
pub use case::{case, Case};
pub use engine::{receive, select};
pub use extensible::{
    add_select_cases, make_extensible_select, select_extensible, ExtensibleSelect,
    WeakExtensibleSelect,
};
pub use select_params::{from_all, SelectParams};
pub use select_result::{ExtractionStatus, SelectResult};

// --- Crate-Internal Re-exports ---
pub(crate) use waiter::SelectWaiter;

// --- Submodules ---

/// Defines [`Case`] and the internal case table.
mod case;
/// The select loop shared by one-shot and extensible selects.
mod engine;
/// Defines [`ExtensibleSelect`].
mod extensible;
/// Defines [`SelectParams`].
mod select_params;
/// Defines [`SelectResult`] and [`ExtractionStatus`].
mod select_result;
/// Wake-up primitive registered on every chain a select watches.
mod waiter;
