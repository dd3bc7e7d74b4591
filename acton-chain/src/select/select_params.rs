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
use std::fmt;
use std::time::Duration;

use crate::chain::Chain;
use crate::common::{CloseCallback, StopPredicate};

/// Termination policy for a select.
///
/// All conditions are optional and combine first-to-fire: the run stops as
/// soon as any configured limit is reached. Without any condition a select
/// runs until every chain in its table is closed and drained.
///
/// ```rust,ignore
/// let params = from_all()
///     .handle_n(10)
///     .empty_timeout(Duration::from_millis(200))
///     .total_time(Duration::from_secs(5));
/// ```
#[derive(Default)]
#[must_use]
pub struct SelectParams {
    handle_n: Option<usize>,
    extract_n: Option<usize>,
    empty_timeout: Option<Duration>,
    total_time: Option<Duration>,
    stop_on: Option<StopPredicate>,
    on_close: Option<CloseCallback>,
}

/// Starts a termination policy that reads from every chain of the select.
pub fn from_all() -> SelectParams {
    SelectParams::default()
}

impl SelectParams {
    /// Stop after `n` messages were handled.
    pub fn handle_n(mut self, n: usize) -> Self {
        self.handle_n = Some(n);
        self
    }

    /// Remove any handled-count limit.
    pub fn handle_all(mut self) -> Self {
        self.handle_n = None;
        self
    }

    /// Stop after `n` messages were extracted, handled or not.
    pub fn extract_n(mut self, n: usize) -> Self {
        self.extract_n = Some(n);
        self
    }

    /// Stop when no message arrives for `timeout`. The idle timer restarts
    /// after every extracted message.
    pub fn empty_timeout(mut self, timeout: Duration) -> Self {
        self.empty_timeout = Some(timeout);
        self
    }

    /// Stop as soon as no message is ready.
    pub fn no_wait_on_empty(self) -> Self {
        self.empty_timeout(Duration::ZERO)
    }

    /// Stop once `budget` has elapsed since the run started.
    pub fn total_time(mut self, budget: Duration) -> Self {
        self.total_time = Some(budget);
        self
    }

    /// Stop when `predicate` returns `true`. It is evaluated after every
    /// dispatched message.
    pub fn stop_on<F>(mut self, predicate: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.stop_on = Some(Box::new(predicate));
        self
    }

    /// Call `callback` once per chain when the run first finds it closed and drained.
    pub fn on_close<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Chain) + Send + 'static,
    {
        self.on_close = Some(Box::new(callback));
        self
    }

    pub(crate) const fn empty_timeout_value(&self) -> Option<Duration> {
        self.empty_timeout
    }

    pub(crate) const fn total_time_value(&self) -> Option<Duration> {
        self.total_time
    }

    /// Returns `true` if the run can finish even with an empty case table.
    pub(crate) const fn is_time_bounded(&self) -> bool {
        self.empty_timeout.is_some() || self.total_time.is_some()
    }

    pub(crate) fn counts_reached(&self, extracted: usize, handled: usize) -> bool {
        self.handle_n.is_some_and(|n| handled >= n) || self.extract_n.is_some_and(|n| extracted >= n)
    }

    pub(crate) fn should_stop(&mut self) -> bool {
        self.stop_on.as_mut().is_some_and(|predicate| predicate())
    }

    pub(crate) fn notify_closed(&mut self, chain: &Chain) {
        if let Some(callback) = self.on_close.as_mut() {
            callback(chain);
        }
    }
}

impl fmt::Debug for SelectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectParams")
            .field("handle_n", &self.handle_n)
            .field("extract_n", &self.extract_n)
            .field("empty_timeout", &self.empty_timeout)
            .field("total_time", &self.total_time)
            .field("stop_on", &self.stop_on.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_all_clears_the_limit() {
        let params = from_all().handle_n(3).handle_all();
        assert!(!params.counts_reached(100, 100));
    }

    #[test]
    fn either_count_limit_stops() {
        let params = from_all().handle_n(2).extract_n(5);
        assert!(!params.counts_reached(1, 1));
        assert!(params.counts_reached(2, 2));
        assert!(params.counts_reached(5, 0));
    }

    #[test]
    fn no_wait_on_empty_is_a_zero_timeout() {
        let params = from_all().no_wait_on_empty();
        assert_eq!(params.empty_timeout_value(), Some(Duration::ZERO));
        assert!(params.is_time_bounded());
        assert!(!from_all().is_time_bounded());
    }

    #[test]
    fn stop_predicate_is_consulted() {
        let mut calls = 0;
        let mut params = from_all().stop_on(move || {
            calls += 1;
            calls > 1
        });
        assert!(!params.should_stop());
        assert!(params.should_stop());
        assert!(!from_all().should_stop());
    }
}
