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

//! A dedicated thread that runs deferred finalization tasks in FIFO order.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use anyhow::Context;
use tracing::{debug, error, instrument, trace};

use crate::chain::{create_chain_with, Chain, ChainCapacity, ChainError, ChainParams};
use crate::common::{ChainConfig, CONFIG};
use crate::select::{case, from_all, make_extensible_select};

/// A queued finalization task.
struct FinalizerTask(Box<dyn FnOnce() + Send + 'static>);

impl fmt::Debug for FinalizerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FinalizerTask")
    }
}

/// Runs finalization tasks on a dedicated OS thread.
///
/// Tasks are queued on an internal chain and executed one at a time, in the
/// order they were scheduled, by an extensible select running on the
/// finalizer thread. A panicking task is logged and does not stop the loop.
///
/// [`Finalizer::finish`] closes the chain with retained content, so every
/// task scheduled before the call still runs. Dropping an unfinished
/// finalizer finishes it.
#[derive(Debug)]
pub struct Finalizer {
    chain: Chain,
    worker: Option<JoinHandle<usize>>,
}

impl Finalizer {
    /// Starts a finalizer configured from the global [`CONFIG`].
    ///
    /// # Errors
    ///
    /// Returns an error if the finalizer thread cannot be spawned.
    pub fn start() -> anyhow::Result<Self> {
        Self::with_config(&CONFIG)
    }

    /// Starts a finalizer with explicit configuration.
    ///
    /// The task chain capacity comes from `limits.finalizer_chain_capacity`
    /// and the thread name from `defaults.finalizer_thread_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the finalizer thread cannot be spawned.
    pub fn with_config(config: &ChainConfig) -> anyhow::Result<Self> {
        let capacity = config
            .limits
            .finalizer_chain_capacity
            .map_or(ChainCapacity::Unbounded, ChainCapacity::bounded);
        let mut params = ChainParams::new(capacity);
        if let Some(wait) = config.default_overflow_wait() {
            params = params.with_overflow_wait(wait);
        }
        let chain = create_chain_with(params);

        let thread_name = config.defaults.finalizer_thread_name.clone();
        let worker = thread::Builder::new()
            .name(thread_name.clone())
            .spawn({
                let chain = chain.clone();
                move || finalization_loop(&chain)
            })
            .with_context(|| format!("failed to spawn finalizer thread {thread_name}"))?;

        debug!(chain = %chain.id(), thread = %thread_name, "finalizer started");
        Ok(Self {
            chain,
            worker: Some(worker),
        })
    }

    /// Queues a task for execution on the finalizer thread.
    ///
    /// # Errors
    ///
    /// * [`ChainError::ChainClosed`] once the finalizer has been finished.
    /// * [`ChainError::ChainOverflow`] if a bounded task chain stayed full.
    pub fn schedule<F>(&self, task: F) -> Result<(), ChainError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.chain.send(FinalizerTask(Box::new(task)))
    }

    /// Number of tasks queued but not yet started.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` once [`Finalizer::finish`] has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_none()
    }

    /// Runs the remaining tasks, stops the thread and returns how many tasks
    /// it executed over its lifetime. Later calls return `0`.
    #[instrument(level = "debug", skip(self), fields(chain = %self.chain.id()))]
    pub fn finish(&mut self) -> usize {
        self.chain.close_retain_content();
        let Some(worker) = self.worker.take() else {
            return 0;
        };
        match worker.join() {
            Ok(executed) => {
                debug!(executed, "finalizer finished");
                executed
            }
            Err(_) => {
                error!("finalizer thread panicked");
                0
            }
        }
    }
}

impl Drop for Finalizer {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.finish();
        }
    }
}

fn finalization_loop(chain: &Chain) -> usize {
    let session = make_extensible_select(
        from_all().handle_all(),
        [case(chain).on(|FinalizerTask(task): FinalizerTask| {
            if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                error!("finalization task panicked");
            } else {
                trace!("finalization task completed");
            }
        })],
    );
    match session.run() {
        Ok(result) => result.handled(),
        Err(e) => {
            error!(error = %e, "finalization loop failed");
            0
        }
    }
}
