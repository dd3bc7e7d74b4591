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

use acton_chain::prelude::*;
use anyhow::{bail, ensure};

use crate::setup::*;

mod setup;

const TIME_LIMIT: Duration = Duration::from_secs(20);

fn reject(i: i32) -> anyhow::Result<()> {
    bail!("unexpected message: {i}")
}

fn expect_42(i: i32) -> anyhow::Result<()> {
    ensure!(i == 42, "unexpected value: {i}");
    Ok(())
}

fn create_chains(params: &ChainParams, count: usize) -> Vec<Chain> {
    (0..count).map(|_| create_chain_with(params.clone())).collect()
}

fn check_drop_content(chains: &[Chain]) -> anyhow::Result<()> {
    {
        let masters: Vec<_> = chains
            .iter()
            .map(ChainMasterHandle::with_drop_content)
            .collect();
        for (i, master) in (0_i32..).zip(&masters) {
            send(master, i)?;
        }
    }

    let result = select(
        from_all().handle_n(1).no_wait_on_empty(),
        chains.iter().map(|ch| case(ch).try_on(reject)),
    )?;
    ensure!(
        result.status() == ExtractionStatus::ChainClosed,
        "unexpected select status: {:?}",
        result.status()
    );
    Ok(())
}

fn check_retain_content(chains: &[Chain]) -> anyhow::Result<()> {
    {
        let masters: Vec<_> = chains
            .iter()
            .map(ChainMasterHandle::with_retain_content)
            .collect();
        for master in &masters {
            send(master, 42_i32)?;
            send(master, 42_i32)?;
        }
    }

    let expected = chains.len() * 2;
    let result = select(
        from_all().handle_n(expected),
        chains.iter().map(|ch| case(ch).try_on(expect_42)),
    )?;
    ensure!(
        result.handled() == expected,
        "unexpected count of handled messages: {}",
        result.handled()
    );

    let result = select(
        from_all().handle_n(1).no_wait_on_empty(),
        chains.iter().map(|ch| case(ch).try_on(reject)),
    )?;
    ensure!(
        result.status() == ExtractionStatus::ChainClosed,
        "unexpected select status: {:?}",
        result.status()
    );
    Ok(())
}

#[test]
fn test_drop_content_single_chain() -> anyhow::Result<()> {
    initialize_tracing();
    for (name, params) in chain_variants() {
        run_with_time_limit(name, TIME_LIMIT, move || {
            check_drop_content(&create_chains(&params, 1))
        })?;
    }
    Ok(())
}

#[test]
fn test_drop_content_three_chains() -> anyhow::Result<()> {
    initialize_tracing();
    for (name, params) in chain_variants() {
        run_with_time_limit(name, TIME_LIMIT, move || {
            check_drop_content(&create_chains(&params, 3))
        })?;
    }
    Ok(())
}

#[test]
fn test_retain_content_single_chain() -> anyhow::Result<()> {
    initialize_tracing();
    for (name, params) in chain_variants() {
        run_with_time_limit(name, TIME_LIMIT, move || {
            check_retain_content(&create_chains(&params, 1))
        })?;
    }
    Ok(())
}

#[test]
fn test_retain_content_three_chains() -> anyhow::Result<()> {
    initialize_tracing();
    for (name, params) in chain_variants() {
        run_with_time_limit(name, TIME_LIMIT, move || {
            check_retain_content(&create_chains(&params, 3))
        })?;
    }
    Ok(())
}

/// A consumer blocked on an empty chain is released when the master leaves scope.
#[test]
fn test_master_releases_blocked_consumer() -> anyhow::Result<()> {
    initialize_tracing();
    for (name, params) in chain_variants() {
        run_with_time_limit(name, TIME_LIMIT, move || {
            let chain = create_chain_with(params);
            let consumer = std::thread::spawn({
                let chain = chain.clone();
                move || select(from_all().handle_all(), [case(&chain).try_on(reject)])
            });

            {
                let _master = ChainMasterHandle::with_drop_content(&chain);
                std::thread::sleep(Duration::from_millis(20));
            }

            let result = consumer
                .join()
                .map_err(|_| anyhow::anyhow!("consumer panicked"))??;
            ensure!(result.extracted() == 0);
            ensure!(result.status() == ExtractionStatus::ChainClosed);
            Ok(())
        })?;
    }
    Ok(())
}
