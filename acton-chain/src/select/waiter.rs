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
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::chain::Chain;

/// Wake-up point shared by one running select and every chain in its case table.
///
/// Chains signal it on each push and on close. The signal is sticky: a
/// notification arriving between the select's sweep and its wait is not lost.
#[derive(Debug, Default)]
pub(crate) struct SelectWaiter {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl SelectWaiter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn notify(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.cond.notify_one();
    }

    /// Blocks until signalled or until `deadline` passes.
    ///
    /// Returns `true` if a signal was consumed, `false` on timeout.
    pub(crate) fn wait(&self, deadline: Option<Instant>) -> bool {
        let mut signaled = self.signaled.lock();
        loop {
            if *signaled {
                *signaled = false;
                return true;
            }
            match deadline {
                None => self.cond.wait(&mut signaled),
                Some(deadline) => {
                    if self.cond.wait_until(&mut signaled, deadline).timed_out() {
                        let fired = *signaled;
                        *signaled = false;
                        return fired;
                    }
                }
            }
        }
    }
}

/// Keeps a waiter registered on a set of chains for the lifetime of a run.
///
/// Deregistration happens in `Drop`, so it also runs when a handler panics.
pub(crate) struct WaiterRegistration {
    waiter: Arc<SelectWaiter>,
    chains: Vec<Chain>,
}

impl WaiterRegistration {
    pub(crate) fn register<'a>(
        waiter: &Arc<SelectWaiter>,
        chains: impl IntoIterator<Item = &'a Chain>,
    ) -> Self {
        let chains: Vec<Chain> = chains.into_iter().cloned().collect();
        for chain in &chains {
            chain.register_waiter(waiter);
        }
        Self {
            waiter: Arc::clone(waiter),
            chains,
        }
    }
}

impl Drop for WaiterRegistration {
    fn drop(&mut self) {
        for chain in &self.chains {
            chain.deregister_waiter(&self.waiter);
        }
    }
}
