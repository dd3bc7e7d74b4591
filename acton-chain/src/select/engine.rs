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

//! The select loop: sweep the case table in registration order, dispatch one
//! message at a time, and stop on the first termination condition to fire.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, trace};

use super::case::CaseTable;
use super::waiter::{SelectWaiter, WaiterRegistration};
use super::{Case, ExtractionStatus, SelectParams, SelectResult};
use crate::chain::{ChainError, PopResult};
use crate::common::earliest;

/// Why a run ended. Kept apart from the reported status, which describes
/// what the run achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    CountLimit,
    TotalTime,
    StopPredicate,
    AllClosed,
    WaitExpired,
}

enum Sweep {
    Extracted { handled: bool },
    Idle { all_closed: bool },
}

/// Runs one select over `table` until `params` says stop.
///
/// The caller owns both for the duration of the run; nothing here is shared
/// with other threads except the chains themselves.
#[instrument(level = "debug", skip_all, fields(cases = table.len()))]
pub(crate) fn run_select(
    params: &mut SelectParams,
    table: &mut CaseTable,
) -> Result<SelectResult, ChainError> {
    if table.is_empty() && !params.is_time_bounded() {
        return Err(ChainError::NoCases);
    }

    let started = Instant::now();
    let total_deadline = params
        .total_time_value()
        .and_then(|budget| started.checked_add(budget));

    let waiter = Arc::new(SelectWaiter::new());
    let _registration = WaiterRegistration::register(&waiter, table.chains());
    let mut closed_seen = vec![false; table.len()];
    let mut idle_since = started;
    let mut extracted = 0_usize;
    let mut handled = 0_usize;

    let reason = if params.counts_reached(extracted, handled) {
        StopReason::CountLimit
    } else {
        loop {
            match sweep(params, table, &mut closed_seen)? {
                Sweep::Extracted { handled: was_handled } => {
                    extracted += 1;
                    if was_handled {
                        handled += 1;
                    }
                    idle_since = Instant::now();

                    if params.counts_reached(extracted, handled) {
                        break StopReason::CountLimit;
                    }
                    if total_deadline.is_some_and(|deadline| idle_since >= deadline) {
                        break StopReason::TotalTime;
                    }
                    if params.should_stop() {
                        break StopReason::StopPredicate;
                    }
                }
                Sweep::Idle { all_closed: true } => break StopReason::AllClosed,
                Sweep::Idle { all_closed: false } => {
                    let idle_deadline = params
                        .empty_timeout_value()
                        .and_then(|timeout| idle_since.checked_add(timeout));
                    let deadline = earliest(idle_deadline, total_deadline);
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        break StopReason::WaitExpired;
                    }
                    trace!(?deadline, "no chain ready, waiting");
                    waiter.wait(deadline);
                }
            }
        }
    };

    let status = if extracted > 0 {
        ExtractionStatus::MsgExtracted
    } else if reason == StopReason::AllClosed {
        ExtractionStatus::ChainClosed
    } else {
        ExtractionStatus::NoMessages
    };
    debug!(
        extracted,
        handled,
        ?reason,
        ?status,
        elapsed = ?started.elapsed(),
        "select finished"
    );
    Ok(SelectResult::new(extracted, handled, status))
}

/// One non-blocking pass over the table in registration order.
fn sweep(
    params: &mut SelectParams,
    table: &mut CaseTable,
    closed_seen: &mut [bool],
) -> Result<Sweep, ChainError> {
    let mut all_closed = !table.is_empty();
    for (case, seen) in table.iter_mut().zip(closed_seen.iter_mut()) {
        match case.chain().try_pop() {
            PopResult::Extracted(envelope) => {
                let handled = case.dispatch(envelope).map_err(|e| {
                    debug!(chain = %case.chain().id(), error = %e, "handler failed");
                    ChainError::HandlerFailed(e)
                })?;
                return Ok(Sweep::Extracted { handled });
            }
            PopResult::NoMessages => all_closed = false,
            PopResult::Closed => {
                if !*seen {
                    *seen = true;
                    trace!(chain = %case.chain().id(), "chain closed and drained");
                    params.notify_closed(case.chain());
                }
            }
        }
    }
    Ok(Sweep::Idle { all_closed })
}

/// Runs a one-shot select over `cases`.
///
/// The cases form an implicit session that is discarded when the run ends.
///
/// Every extraction restarts the scan from the first case, so ready chains
/// are served in registration order. A chain that is never empty (for
/// example, one whose handler sends back into it) keeps later cases waiting
/// until a limit stops the run or that chain drains.
///
/// # Errors
///
/// * [`ChainError::NoCases`] if `cases` is empty and `params` sets neither
///   `empty_timeout` nor `total_time`.
/// * [`ChainError::HandlerFailed`] if a fallible handler returned an error.
pub fn select<I>(mut params: SelectParams, cases: I) -> Result<SelectResult, ChainError>
where
    I: IntoIterator<Item = Case>,
{
    let mut table: CaseTable = cases.into_iter().collect();
    run_select(&mut params, &mut table)
}

/// Runs a one-shot select over a single chain.
///
/// # Errors
///
/// Fails like [`select`].
pub fn receive(params: SelectParams, case: Case) -> Result<SelectResult, ChainError> {
    select(params, [case])
}
