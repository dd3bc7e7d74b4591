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

#![forbid(unsafe_code)]
#![forbid(missing_docs)]

//! # Acton Chain
//!
//! Typed, thread-safe message chains and a select engine that waits on
//! several chains at once, dispatching each extracted message to the handler
//! registered for its type.
//!
//! ## Key Concepts
//!
//! - **Chains (`Chain`)**: FIFO queues of type-tagged messages, bounded or
//!   unbounded, closable with or without discarding their content.
//! - **Master handles (`ChainMasterHandle`)**: Close their chain when they go
//!   out of scope, so consumers blocked on it are released.
//! - **Cases (`Case`)**: Bind one chain to handlers keyed by message type.
//! - **Select (`select`, `SelectParams`)**: Sweeps the cases in registration
//!   order and runs until a count, time or predicate limit is reached, or
//!   every chain is closed and drained.
//! - **Extensible select (`ExtensibleSelect`)**: A reusable session whose
//!   cases can be added between runs, guarded against nested and concurrent runs.
//! - **Finalizer (`Finalizer`)**: A dedicated thread running deferred tasks
//!   in FIFO order.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use acton_chain::prelude::*;
//!
//! let chain = create_chain(ChainCapacity::unbounded());
//! send(&chain, String::from("hello"))?;
//! send(&chain, 42_i32)?;
//!
//! let result = select(
//!     from_all().handle_n(2).empty_timeout(Duration::from_millis(50)),
//!     [case(&chain)
//!         .on(|text: String| println!("text: {text}"))
//!         .on(|n: i32| println!("number: {n}"))],
//! )?;
//! assert_eq!(result.handled(), 2);
//! # Ok::<(), ChainError>(())
//! ```

/// Configuration and internal shared types.
pub(crate) mod common;

/// Defines chains, envelopes, chain parameters and errors.
pub(crate) mod chain;

/// Defines the select engine and the extensible select session.
pub(crate) mod select;

/// Defines the message marker trait.
pub(crate) mod traits;

/// Defines the finalization thread.
pub(crate) mod finalizer;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Chains
/// *   [`crate::chain::Chain`]: Shared handle to a message chain.
/// *   [`crate::chain::ChainParams`], [`crate::chain::ChainCapacity`],
///     [`crate::chain::OverflowReaction`], [`crate::chain::CloseMode`]: Chain creation parameters.
/// *   [`crate::chain::ChainMasterHandle`]: Scoped closer of a chain.
/// *   [`crate::chain::Envelope`]: A type-tagged message in transit.
/// *   [`crate::chain::PushStatus`], [`crate::chain::PopResult`]: Outcomes of raw push and pop.
/// *   [`crate::chain::create_chain`], [`crate::chain::create_chain_with`],
///     [`crate::chain::send`], [`crate::chain::close_drop_content`],
///     [`crate::chain::close_retain_content`]: Free chain functions.
///
/// ## Select
/// *   [`crate::select::case`], [`crate::select::Case`]: Case construction.
/// *   [`crate::select::from_all`], [`crate::select::SelectParams`]: Termination policy.
/// *   [`crate::select::select`], [`crate::select::receive`]: One-shot selects.
/// *   [`crate::select::ExtensibleSelect`] and its free functions: Reusable sessions.
/// *   [`crate::select::SelectResult`], [`crate::select::ExtractionStatus`]: Run outcome.
///
/// ## Errors, configuration and traits
/// *   [`crate::chain::ChainError`], [`crate::chain::ErrorCode`]: Errors and their stable codes.
/// *   [`crate::common::ChainConfig`], [`crate::common::CONFIG`]: Configuration.
/// *   [`crate::traits::ChainMessage`]: Marker trait for all valid messages.
/// *   [`crate::finalizer::Finalizer`]: Deferred task runner.
pub mod prelude {
    pub use crate::chain::{
        close_drop_content, close_retain_content, create_chain, create_chain_with, send, Chain,
        ChainCapacity, ChainError, ChainId, ChainMasterHandle, ChainParams, CloseMode, Envelope,
        ErrorCode, OverflowReaction, PopResult, PushStatus,
    };
    pub use crate::common::{ChainConfig, DefaultsConfig, LimitsConfig, TimeoutConfig, CONFIG};
    pub use crate::finalizer::Finalizer;
    pub use crate::select::{
        add_select_cases, case, from_all, make_extensible_select, receive, select,
        select_extensible, Case, ExtensibleSelect, ExtractionStatus, SelectParams, SelectResult,
        WeakExtensibleSelect,
    };
    pub use crate::traits::ChainMessage;
}
