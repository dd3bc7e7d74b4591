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
use std::time::Duration;

use acton_chain::prelude::*;
use anyhow::{anyhow, ensure};
use parking_lot::Mutex;

use crate::setup::*;

mod setup;

const TIME_LIMIT: Duration = Duration::from_secs(20);

#[test]
fn test_tasks_run_in_fifo_order() -> anyhow::Result<()> {
    initialize_tracing();
    run_with_time_limit("finalizer", TIME_LIMIT, || {
        let mut finalizer = Finalizer::start()?;
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..50 {
            let order = Arc::clone(&order);
            finalizer.schedule(move || order.lock().push(i))?;
        }

        ensure!(finalizer.finish() == 50);
        ensure!(*order.lock() == (0..50).collect::<Vec<_>>());
        Ok(())
    })
}

#[test]
fn test_schedule_after_finish_fails() -> anyhow::Result<()> {
    initialize_tracing();
    run_with_time_limit("finalizer", TIME_LIMIT, || {
        let mut finalizer = Finalizer::start()?;
        finalizer.finish();

        let err = finalizer
            .schedule(|| {})
            .err()
            .ok_or_else(|| anyhow!("scheduled on a finished finalizer"))?;
        ensure!(err.code() == ErrorCode::ChainClosed);
        Ok(())
    })
}

#[test]
fn test_drop_runs_queued_tasks() -> anyhow::Result<()> {
    initialize_tracing();
    run_with_time_limit("finalizer", TIME_LIMIT, || {
        let ran = Arc::new(Mutex::new(0));
        {
            let finalizer = Finalizer::start()?;
            for _ in 0..10 {
                let ran = Arc::clone(&ran);
                finalizer.schedule(move || *ran.lock() += 1)?;
            }
        }
        ensure!(*ran.lock() == 10);
        Ok(())
    })
}

#[test]
fn test_bounded_task_chain() -> anyhow::Result<()> {
    initialize_tracing();
    run_with_time_limit("finalizer", TIME_LIMIT, || {
        let mut config = ChainConfig::default();
        config.limits.finalizer_chain_capacity = Some(2);
        let mut finalizer = Finalizer::with_config(&config)?;

        let ran = Arc::new(Mutex::new(0));
        for _ in 0..20 {
            let ran = Arc::clone(&ran);
            finalizer.schedule(move || {
                std::thread::sleep(Duration::from_millis(1));
                *ran.lock() += 1;
            })?;
        }
        ensure!(finalizer.finish() == 20);
        ensure!(*ran.lock() == 20);
        Ok(())
    })
}
