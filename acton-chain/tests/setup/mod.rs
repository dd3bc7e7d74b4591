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
#![allow(dead_code)]

use std::sync::Once;
use std::thread;
use std::time::Duration;

use acton_chain::prelude::*;
use anyhow::{anyhow, bail};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Declare the submodules.
pub mod messages;
pub use messages::*;

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Logs go to `logs/chain_tests.txt`. `RUST_LOG` overrides the default
/// `trace` filter for this crate.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "chain_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Leak the guard so the non-blocking writer is not dropped before process exit
        Box::leak(Box::new(guard));

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info")
                .add_directive("acton_chain=trace".parse().unwrap())
                .add_directive("chain_tests=trace".parse().unwrap())
                .add_directive("select_tests=trace".parse().unwrap())
                .add_directive("extensible_select_tests=trace".parse().unwrap())
        });

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .with_max_level(Level::TRACE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// The chain parameter sets every scenario is run against.
pub fn chain_variants() -> Vec<(&'static str, ChainParams)> {
    vec![
        ("unbounded", ChainParams::unbounded()),
        ("bounded(16)", ChainParams::bounded(16)),
        (
            "bounded(16), overflow wait 100ms",
            ChainParams::bounded(16).with_overflow_wait(Duration::from_millis(100)),
        ),
    ]
}

/// Runs `scenario` on its own thread and fails if it does not finish within `limit`.
///
/// The outcome travels back over a chain; a panicking scenario drops its
/// master handle, which closes the chain and is reported as a failure.
pub fn run_with_time_limit<F>(name: &str, limit: Duration, scenario: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    let outcome = create_chain(ChainCapacity::bounded(1));
    let _scenario = thread::Builder::new().name(name.to_string()).spawn({
        let outcome = outcome.clone();
        move || {
            let master = ChainMasterHandle::with_retain_content(&outcome);
            let result = scenario().map_err(|e| format!("{e:#}"));
            let _ = master.send(result);
        }
    })?;

    match outcome.pop(Some(limit)) {
        PopResult::Extracted(envelope) => envelope
            .downcast::<Result<(), String>>()
            .ok_or_else(|| anyhow!("{name}: unexpected outcome message"))?
            .map_err(|e| anyhow!("{name}: {e}")),
        PopResult::Closed => bail!("{name}: scenario panicked"),
        PopResult::NoMessages => bail!("{name}: scenario did not finish within {limit:?}"),
    }
}
