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
use std::ops::Deref;

use tracing::trace;

use super::{Chain, CloseMode};

/// Scoped owner of a chain that closes it when dropped.
///
/// The close mode is fixed at construction. Closing the chain by hand before
/// the handle goes out of scope is allowed; the close on drop then does
/// nothing. Because the close runs in `Drop`, a producer that fills a chain
/// and leaves its scope early (through `?` or a panic) still leaves the chain
/// closed for its consumers.
///
/// ```rust,ignore
/// use acton_chain::prelude::*;
///
/// let chain = create_chain(ChainCapacity::unbounded());
/// {
///     let master = ChainMasterHandle::with_retain_content(&chain);
///     master.send(42)?;
/// }
/// assert!(chain.is_closed());
/// ```
#[derive(Debug)]
#[must_use = "the chain is closed as soon as the master handle is dropped"]
pub struct ChainMasterHandle {
    chain: Chain,
    mode: CloseMode,
}

impl ChainMasterHandle {
    /// Takes shared ownership of `chain`; it is closed on drop with the given mode.
    pub fn new(chain: &Chain, mode: CloseMode) -> Self {
        Self {
            chain: chain.clone(),
            mode,
        }
    }

    /// A handle that discards queued messages when it closes the chain.
    pub fn with_drop_content(chain: &Chain) -> Self {
        Self::new(chain, CloseMode::DropContent)
    }

    /// A handle that keeps queued messages poppable after closing the chain.
    pub fn with_retain_content(chain: &Chain) -> Self {
        Self::new(chain, CloseMode::RetainContent)
    }

    /// The close mode applied on drop.
    #[must_use]
    pub const fn mode(&self) -> CloseMode {
        self.mode
    }

    /// The owned chain.
    #[must_use]
    pub const fn chain(&self) -> &Chain {
        &self.chain
    }
}

impl Deref for ChainMasterHandle {
    type Target = Chain;

    fn deref(&self) -> &Chain {
        &self.chain
    }
}

impl Drop for ChainMasterHandle {
    fn drop(&mut self) {
        trace!(chain = %self.chain.id(), mode = ?self.mode, "master handle closing chain");
        self.chain.close(self.mode);
    }
}
