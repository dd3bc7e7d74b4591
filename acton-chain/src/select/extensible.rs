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

//! The extensible select: a reusable, mutable case table guarded by an
//! `idle -> active -> idle` state machine.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use static_assertions::assert_impl_all;
use tracing::{instrument, trace};

use super::case::CaseTable;
use super::engine::run_select;
use super::{Case, SelectParams, SelectResult};
use crate::chain::ChainError;

#[derive(Debug, Default)]
struct ExtensibleState {
    params: SelectParams,
    cases: CaseTable,
    active: bool,
}

/// A select session whose cases can be added after construction and which
/// can be run any number of times, one run at a time.
///
/// While a run is in progress the session is *active*: running it again
/// (from one of its own handlers or from another thread) or adding cases
/// fails with [`ChainError::ExtensibleSelectIsActiveNow`] and changes
/// nothing. The session returns to *idle* when the run ends, including when a
/// handler fails or panics.
///
/// The handle is cheap to clone; clones share the session. Use
/// [`ExtensibleSelect::downgrade`] when a handler needs to refer to its own
/// session.
#[derive(Debug, Clone)]
pub struct ExtensibleSelect {
    inner: Arc<Mutex<ExtensibleState>>,
}

/// A non-owning reference to an [`ExtensibleSelect`].
#[derive(Debug, Clone)]
pub struct WeakExtensibleSelect {
    inner: Weak<Mutex<ExtensibleState>>,
}

assert_impl_all!(ExtensibleSelect: Send, Sync);
assert_impl_all!(WeakExtensibleSelect: Send, Sync);

/// Checked-out session contents for the duration of one run.
///
/// The table and params are moved out of the shared state so handlers run
/// without the session lock held; `Drop` puts them back and clears the
/// active flag on every exit path.
struct ActiveRun<'a> {
    owner: &'a Mutex<ExtensibleState>,
    params: SelectParams,
    cases: CaseTable,
}

impl<'a> ActiveRun<'a> {
    fn begin(owner: &'a Mutex<ExtensibleState>) -> Result<Self, ChainError> {
        let mut state = owner.lock();
        if state.active {
            return Err(ChainError::ExtensibleSelectIsActiveNow);
        }
        state.active = true;
        Ok(Self {
            owner,
            params: std::mem::take(&mut state.params),
            cases: std::mem::take(&mut state.cases),
        })
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        let mut state = self.owner.lock();
        state.params = std::mem::take(&mut self.params);
        state.cases = std::mem::take(&mut self.cases);
        state.active = false;
        trace!("extensible select returned to idle");
    }
}

impl ExtensibleSelect {
    /// Creates an idle session with no cases.
    #[must_use]
    pub fn new(params: SelectParams) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ExtensibleState {
                params,
                cases: CaseTable::default(),
                active: false,
            })),
        }
    }

    /// Appends cases to the session's table.
    ///
    /// A case for a chain already in the table is merged into the existing
    /// entry, which keeps its position.
    ///
    /// # Errors
    ///
    /// [`ChainError::ExtensibleSelectIsActiveNow`] while a run is in progress;
    /// none of the cases are added.
    pub fn add_cases<I>(&self, cases: I) -> Result<(), ChainError>
    where
        I: IntoIterator<Item = Case>,
    {
        let mut state = self.inner.lock();
        if state.active {
            return Err(ChainError::ExtensibleSelectIsActiveNow);
        }
        state.cases.extend(cases);
        trace!(cases = state.cases.len(), "cases added to extensible select");
        Ok(())
    }

    /// Runs the session once.
    ///
    /// # Errors
    ///
    /// * [`ChainError::ExtensibleSelectIsActiveNow`] if a run is already in progress.
    /// * [`ChainError::NoCases`] if the table is empty and the params set no timeout.
    /// * [`ChainError::HandlerFailed`] if a fallible handler returned an error.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&self) -> Result<SelectResult, ChainError> {
        let mut active = ActiveRun::begin(&self.inner)?;
        let ActiveRun { params, cases, .. } = &mut active;
        run_select(params, cases)
    }

    /// Returns `true` while a run is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    /// Creates a non-owning reference to this session.
    #[must_use]
    pub fn downgrade(&self) -> WeakExtensibleSelect {
        WeakExtensibleSelect {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl WeakExtensibleSelect {
    /// Returns the session if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ExtensibleSelect> {
        self.inner.upgrade().map(|inner| ExtensibleSelect { inner })
    }
}

/// Creates an extensible select with initial cases.
pub fn make_extensible_select<I>(params: SelectParams, cases: I) -> ExtensibleSelect
where
    I: IntoIterator<Item = Case>,
{
    let select = ExtensibleSelect::new(params);
    select.inner.lock().cases.extend(cases);
    select
}

/// Adds cases to an extensible select. See [`ExtensibleSelect::add_cases`].
///
/// # Errors
///
/// [`ChainError::ExtensibleSelectIsActiveNow`] while a run is in progress.
pub fn add_select_cases<I>(select: &ExtensibleSelect, cases: I) -> Result<(), ChainError>
where
    I: IntoIterator<Item = Case>,
{
    select.add_cases(cases)
}

/// Runs an extensible select once. See [`ExtensibleSelect::run`].
///
/// # Errors
///
/// Fails like [`ExtensibleSelect::run`].
pub fn select_extensible(select: &ExtensibleSelect) -> Result<SelectResult, ChainError> {
    select.run()
}
