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

//! The message chain: a thread-safe FIFO of [`Envelope`]s with optional
//! capacity and an explicit, irreversible close.
//!
//! Every chain owns a single lock guarding its queue, its open/closed flag and
//! the select waiters registered on it. Blocked producers and consumers park
//! on the chain's two condition variables; closing wakes all of them.

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use static_assertions::assert_impl_all;
use tracing::{debug, trace, warn};

use super::{ChainCapacity, ChainError, ChainParams, CloseMode, Envelope, OverflowReaction};
use crate::common::deadline_after;
use crate::select::SelectWaiter;
use crate::traits::ChainMessage;

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    fn next() -> Self {
        Self(NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain#{}", self.0)
    }
}

/// Outcome of [`Chain::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum PushStatus {
    /// The envelope was queued.
    Stored,
    /// The chain stayed full until the timeout expired; the envelope was dropped.
    TimedOut,
    /// The chain is closed; the envelope was dropped.
    Closed,
}

/// Outcome of [`Chain::pop`].
#[derive(Debug)]
pub enum PopResult {
    /// The next envelope in FIFO order.
    Extracted(Envelope),
    /// The chain is open but stayed empty until the timeout expired.
    NoMessages,
    /// The chain is closed and holds nothing more.
    Closed,
}

impl PopResult {
    /// The extracted envelope, if any.
    #[must_use]
    pub fn into_envelope(self) -> Option<Envelope> {
        match self {
            Self::Extracted(envelope) => Some(envelope),
            Self::NoMessages | Self::Closed => None,
        }
    }

    /// Returns `true` if the chain was found closed and drained.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

enum SpaceOutcome {
    Available,
    TimedOut,
    Closed,
}

struct ChainState {
    queue: VecDeque<Envelope>,
    closed: bool,
    waiters: Vec<Arc<SelectWaiter>>,
}

struct ChainInner {
    id: ChainId,
    params: ChainParams,
    state: Mutex<ChainState>,
    not_empty: Condvar,
    not_full: Condvar,
}

/// A shared handle to a message chain.
///
/// Cloning the handle shares the chain. Releasing the last handle never
/// closes it implicitly; closing is always explicit, either through
/// [`Chain::close`] or a [`ChainMasterHandle`](super::ChainMasterHandle).
///
/// Equality and hashing are based solely on the chain's [`ChainId`].
#[derive(Clone)]
pub struct Chain {
    inner: Arc<ChainInner>,
}

assert_impl_all!(Chain: Send, Sync, Clone);

impl Chain {
    /// Creates an open, empty chain.
    #[must_use]
    pub fn new(params: ChainParams) -> Self {
        let id = ChainId::next();
        trace!(chain = %id, capacity = ?params.capacity(), "creating chain");
        Self {
            inner: Arc::new(ChainInner {
                id,
                params,
                state: Mutex::new(ChainState {
                    queue: VecDeque::new(),
                    closed: false,
                    waiters: Vec::new(),
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
            }),
        }
    }

    /// The chain's identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ChainId {
        self.inner.id
    }

    /// The parameters the chain was created with.
    #[must_use]
    pub fn params(&self) -> &ChainParams {
        &self.inner.params
    }

    /// The chain's capacity.
    #[must_use]
    pub fn capacity(&self) -> ChainCapacity {
        self.inner.params.capacity()
    }

    /// Number of queued envelopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().queue.is_empty()
    }

    /// Returns `true` once the chain has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Sends a typed message.
    ///
    /// On a full bounded chain this waits up to the chain's overflow wait and
    /// then applies its [`OverflowReaction`].
    ///
    /// # Errors
    ///
    /// * [`ChainError::ChainClosed`] if the chain is or becomes closed.
    /// * [`ChainError::ChainOverflow`] if the chain stayed full and the reaction is `Fail`.
    pub fn send<T: ChainMessage>(&self, message: T) -> Result<(), ChainError> {
        let envelope = Envelope::new(message);
        let deadline = deadline_after(self.inner.params.overflow_wait());
        let mut state = self.inner.state.lock();
        match self.wait_for_space(&mut state, deadline) {
            SpaceOutcome::Available => {
                self.store(&mut state, envelope);
                Ok(())
            }
            SpaceOutcome::Closed => {
                drop(state);
                trace!(chain = %self.id(), message = envelope.type_name(), "send on closed chain");
                Err(ChainError::ChainClosed { chain: self.id() })
            }
            SpaceOutcome::TimedOut => self.overflow(state, envelope),
        }
    }

    /// Queues an envelope, waiting for space on a full bounded chain.
    ///
    /// `timeout` bounds the wait: `None` waits until space frees up or the
    /// chain closes, `Some(Duration::ZERO)` never blocks.
    pub fn push(&self, envelope: Envelope, timeout: Option<Duration>) -> PushStatus {
        let deadline = deadline_after(timeout);
        let mut state = self.inner.state.lock();
        let status = match self.wait_for_space(&mut state, deadline) {
            SpaceOutcome::Available => {
                self.store(&mut state, envelope);
                return PushStatus::Stored;
            }
            SpaceOutcome::TimedOut => PushStatus::TimedOut,
            SpaceOutcome::Closed => PushStatus::Closed,
        };
        drop(state);
        trace!(chain = %self.id(), message = envelope.type_name(), ?status, "push rejected");
        status
    }

    /// Takes the next envelope, waiting while the chain is open and empty.
    ///
    /// `timeout` bounds the wait the same way as for [`Chain::push`]. After a
    /// close with [`CloseMode::RetainContent`] the remaining envelopes are
    /// still returned before [`PopResult::Closed`] is reported.
    pub fn pop(&self, timeout: Option<Duration>) -> PopResult {
        let deadline = deadline_after(timeout);
        let mut state = self.inner.state.lock();
        loop {
            if let Some(envelope) = self.take_front(&mut state) {
                return PopResult::Extracted(envelope);
            }
            if state.closed {
                return PopResult::Closed;
            }
            match deadline {
                None => self.inner.not_empty.wait(&mut state),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return PopResult::NoMessages;
                    }
                    let _ = self.inner.not_empty.wait_until(&mut state, deadline);
                }
            }
        }
    }

    /// Takes the next envelope without blocking.
    pub fn try_pop(&self) -> PopResult {
        self.pop(Some(Duration::ZERO))
    }

    /// Closes the chain. Only the first close has any effect.
    ///
    /// Every blocked producer and consumer, and every select waiting on the
    /// chain, is woken. With [`CloseMode::DropContent`] the queued envelopes
    /// are discarded immediately.
    pub fn close(&self, mode: CloseMode) {
        let discarded = {
            let mut state = self.inner.state.lock();
            if state.closed {
                trace!(chain = %self.id(), ?mode, "chain already closed");
                return;
            }
            state.closed = true;
            let discarded = match mode {
                CloseMode::DropContent => std::mem::take(&mut state.queue),
                CloseMode::RetainContent => VecDeque::new(),
            };
            self.inner.not_empty.notify_all();
            self.inner.not_full.notify_all();
            for waiter in &state.waiters {
                waiter.notify();
            }
            discarded
        };
        // Payloads are dropped outside the lock.
        debug!(chain = %self.id(), ?mode, discarded = discarded.len(), "chain closed");
    }

    /// Closes the chain, discarding queued envelopes.
    pub fn close_drop_content(&self) {
        self.close(CloseMode::DropContent);
    }

    /// Closes the chain, keeping queued envelopes poppable.
    pub fn close_retain_content(&self) {
        self.close(CloseMode::RetainContent);
    }

    /// Registers a select waiter to be signalled by every push and by close.
    ///
    /// The waiter is signalled at once if the chain already has content or is
    /// closed, so a select registering late cannot miss a wake-up.
    pub(crate) fn register_waiter(&self, waiter: &Arc<SelectWaiter>) {
        let mut state = self.inner.state.lock();
        state.waiters.push(Arc::clone(waiter));
        if state.closed || !state.queue.is_empty() {
            waiter.notify();
        }
    }

    pub(crate) fn deregister_waiter(&self, waiter: &Arc<SelectWaiter>) {
        self.inner
            .state
            .lock()
            .waiters
            .retain(|registered| !Arc::ptr_eq(registered, waiter));
    }

    fn is_full(&self, state: &ChainState) -> bool {
        self.inner
            .params
            .capacity()
            .limit()
            .is_some_and(|limit| state.queue.len() >= limit)
    }

    fn wait_for_space(
        &self,
        state: &mut MutexGuard<'_, ChainState>,
        deadline: Option<Instant>,
    ) -> SpaceOutcome {
        loop {
            if state.closed {
                return SpaceOutcome::Closed;
            }
            if !self.is_full(state) {
                return SpaceOutcome::Available;
            }
            match deadline {
                None => self.inner.not_full.wait(state),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return SpaceOutcome::TimedOut;
                    }
                    let _ = self.inner.not_full.wait_until(state, deadline);
                }
            }
        }
    }

    fn store(&self, state: &mut ChainState, envelope: Envelope) {
        trace!(chain = %self.id(), message = envelope.type_name(), "message stored");
        state.queue.push_back(envelope);
        self.inner.not_empty.notify_one();
        for waiter in &state.waiters {
            waiter.notify();
        }
    }

    fn take_front(&self, state: &mut ChainState) -> Option<Envelope> {
        let envelope = state.queue.pop_front()?;
        self.inner.not_full.notify_one();
        trace!(chain = %self.id(), message = envelope.type_name(), "message extracted");
        Some(envelope)
    }

    fn overflow(
        &self,
        mut state: MutexGuard<'_, ChainState>,
        envelope: Envelope,
    ) -> Result<(), ChainError> {
        match self.inner.params.overflow_reaction() {
            OverflowReaction::DropNewest => {
                drop(state);
                warn!(chain = %self.id(), message = envelope.type_name(), "chain full, newest message dropped");
                drop(envelope);
                Ok(())
            }
            OverflowReaction::RemoveOldest => {
                let oldest = state.queue.pop_front();
                self.store(&mut state, envelope);
                drop(state);
                if let Some(oldest) = oldest {
                    warn!(chain = %self.id(), message = oldest.type_name(), "chain full, oldest message removed");
                }
                Ok(())
            }
            OverflowReaction::Fail => {
                drop(state);
                drop(envelope);
                Err(ChainError::ChainOverflow {
                    chain: self.id(),
                    capacity: self.capacity().limit().unwrap_or(usize::MAX),
                })
            }
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("id", &self.inner.id)
            .field("capacity", &self.inner.params.capacity())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Chain {}

impl Hash for Chain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Creates a chain with the given capacity and default overflow handling.
#[must_use]
pub fn create_chain(capacity: ChainCapacity) -> Chain {
    Chain::new(ChainParams::new(capacity))
}

/// Creates a chain from full parameters.
#[must_use]
pub fn create_chain_with(params: ChainParams) -> Chain {
    Chain::new(params)
}

/// Sends a typed message to a chain. See [`Chain::send`].
///
/// # Errors
///
/// Fails with [`ChainError::ChainClosed`] on a closed chain, or
/// [`ChainError::ChainOverflow`] when the chain's overflow reaction rejects it.
pub fn send<T: ChainMessage>(chain: &Chain, message: T) -> Result<(), ChainError> {
    chain.send(message)
}

/// Closes a chain, discarding its queued messages.
pub fn close_drop_content(chain: &Chain) {
    chain.close_drop_content();
}

/// Closes a chain, keeping its queued messages poppable until drained.
pub fn close_retain_content(chain: &Chain) {
    chain.close_retain_content();
}
