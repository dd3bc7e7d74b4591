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

//! Defines the message chain, its envelopes, parameters, errors and the
//! scoped master handle.
//!
//! # Key Components
//!
//! *   [`Chain`]: Shared handle to a typed, thread-safe FIFO with optional capacity.
//! *   [`Envelope`]: A message in transit together with its runtime type tag.
//! *   [`ChainParams`]: Capacity and overflow behaviour fixed at creation.
//! *   [`ChainMasterHandle`]: Closes its chain when it goes out of scope.
//! *   [`ChainError`]: Misuse and handler failures, each with a stable [`ErrorCode`].

// --- Public Re-exports ---
pub use chain_error::{ChainError, ErrorCode};
pub use chain_params::{ChainCapacity, ChainParams, CloseMode, OverflowReaction};
pub use envelope::Envelope;
pub use master_handle::ChainMasterHandle;
pub use mchain::{
    close_drop_content, close_retain_content, create_chain, create_chain_with, send, Chain,
    ChainId, PopResult, PushStatus,
};

// --- Submodules ---

/// Defines [`ChainError`] and [`ErrorCode`].
mod chain_error;
/// Defines [`ChainParams`] and related enums.
mod chain_params;
/// Defines [`Envelope`].
mod envelope;
/// Defines [`ChainMasterHandle`].
mod master_handle;
/// Defines [`Chain`] and the free chain functions.
mod mchain;
