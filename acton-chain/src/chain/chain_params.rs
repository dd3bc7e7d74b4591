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
use std::time::Duration;

use tracing::warn;

use crate::common::CONFIG;

/// How many messages a chain may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCapacity {
    /// No limit; producers never wait.
    Unbounded,
    /// At most this many queued messages; producers wait for space.
    Bounded(usize),
}

impl ChainCapacity {
    /// An unbounded capacity.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::Unbounded
    }

    /// A bounded capacity. A limit of zero is raised to one.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self::Bounded(limit).normalized()
    }

    /// Raises a zero limit to one.
    fn normalized(self) -> Self {
        match self {
            Self::Bounded(0) => {
                warn!("chain capacity of zero requested, using one");
                Self::Bounded(1)
            }
            other => other,
        }
    }

    /// The limit, or `None` for an unbounded chain.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Bounded(limit) => Some(*limit),
        }
    }
}

/// What `send` does when a bounded chain is still full after its overflow wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowReaction {
    /// Discard the message being sent.
    DropNewest,
    /// Discard the oldest queued message to make room.
    RemoveOldest,
    /// Reject the message with [`ChainError::ChainOverflow`](super::ChainError::ChainOverflow).
    #[default]
    Fail,
}

/// What happens to queued messages when a chain is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseMode {
    /// Queued messages are discarded at once.
    DropContent,
    /// Queued messages stay poppable until drained.
    RetainContent,
}

/// Parameters fixed when a chain is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    capacity: ChainCapacity,
    overflow_wait: Option<Duration>,
    overflow_reaction: OverflowReaction,
}

impl ChainParams {
    /// Parameters with the given capacity, no overflow wait limit and the `Fail` reaction.
    ///
    /// `ChainCapacity::Bounded(0)` is raised to `Bounded(1)`.
    #[must_use]
    pub fn new(capacity: ChainCapacity) -> Self {
        Self {
            capacity: capacity.normalized(),
            overflow_wait: None,
            overflow_reaction: OverflowReaction::Fail,
        }
    }

    /// Parameters for an unbounded chain.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            capacity: ChainCapacity::Unbounded,
            overflow_wait: None,
            overflow_reaction: OverflowReaction::Fail,
        }
    }

    /// Parameters for a chain holding at most `limit` messages.
    #[must_use]
    pub fn bounded(limit: usize) -> Self {
        Self::new(ChainCapacity::bounded(limit))
    }

    /// Limits how long `send` waits for space before the overflow reaction applies.
    #[must_use]
    pub fn with_overflow_wait(mut self, wait: Duration) -> Self {
        self.overflow_wait = Some(wait);
        self
    }

    /// Sets the reaction applied when the overflow wait expires.
    #[must_use]
    pub fn with_overflow_reaction(mut self, reaction: OverflowReaction) -> Self {
        self.overflow_reaction = reaction;
        self
    }

    /// The chain capacity.
    #[must_use]
    pub const fn capacity(&self) -> ChainCapacity {
        self.capacity
    }

    /// The overflow wait; `None` waits until space frees up or the chain closes.
    #[must_use]
    pub const fn overflow_wait(&self) -> Option<Duration> {
        self.overflow_wait
    }

    /// The overflow reaction.
    #[must_use]
    pub const fn overflow_reaction(&self) -> OverflowReaction {
        self.overflow_reaction
    }
}

impl Default for ChainParams {
    /// Capacity and overflow wait come from the global [`CONFIG`].
    fn default() -> Self {
        let capacity = CONFIG
            .limits
            .default_chain_capacity
            .map_or(ChainCapacity::Unbounded, ChainCapacity::bounded);
        Self {
            capacity,
            overflow_wait: CONFIG.default_overflow_wait(),
            overflow_reaction: OverflowReaction::default(),
        }
    }
}

impl From<ChainCapacity> for ChainParams {
    fn from(capacity: ChainCapacity) -> Self {
        Self::new(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(ChainCapacity::bounded(0), ChainCapacity::Bounded(1));
        assert_eq!(ChainCapacity::bounded(0).limit(), Some(1));
        assert_eq!(ChainCapacity::unbounded().limit(), None);
    }

    #[test]
    fn raw_zero_capacity_is_raised_to_one() {
        assert_eq!(
            ChainParams::new(ChainCapacity::Bounded(0)).capacity(),
            ChainCapacity::Bounded(1)
        );
        assert_eq!(
            ChainParams::from(ChainCapacity::Bounded(0)).capacity(),
            ChainCapacity::Bounded(1)
        );
    }

    #[test]
    fn builder_sets_overflow_behaviour() {
        let params = ChainParams::bounded(4)
            .with_overflow_wait(Duration::from_millis(5))
            .with_overflow_reaction(OverflowReaction::RemoveOldest);
        assert_eq!(params.capacity(), ChainCapacity::Bounded(4));
        assert_eq!(params.overflow_wait(), Some(Duration::from_millis(5)));
        assert_eq!(params.overflow_reaction(), OverflowReaction::RemoveOldest);
    }
}
