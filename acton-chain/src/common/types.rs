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

//! Defines common internal type aliases and supporting structures used within `acton-chain`.
//!
//! Handler signatures, the per-case handler map and the deadline arithmetic
//! shared by chains and the select engine live here.

use std::any::TypeId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::chain::{Chain, Envelope};

/// Crate-internal: Map storing message handlers of one case (`TypeId` -> `HandlerItem`).
///
/// A plain `HashMap` is enough: the map is built while the case is
/// assembled and only read (and invoked) by the single thread running a select.
pub type HandlerMap = HashMap<TypeId, HandlerItem>;

/// Crate-internal: Enum wrapping the two kinds of message handlers a case can hold.
pub enum HandlerItem {
    /// A handler that cannot fail.
    Infallible(Box<InfallibleHandler>),
    /// A handler whose failure aborts the running select.
    Fallible(Box<FallibleHandler>),
}

impl HandlerItem {
    /// Invokes the handler with an envelope whose type tag already matched.
    pub fn invoke(&mut self, envelope: Envelope) -> anyhow::Result<()> {
        match self {
            Self::Infallible(handler) => {
                handler(envelope);
                Ok(())
            }
            Self::Fallible(handler) => handler(envelope),
        }
    }
}

impl std::fmt::Debug for HandlerItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infallible(_) => f.write_str("HandlerItem::Infallible"),
            Self::Fallible(_) => f.write_str("HandlerItem::Fallible"),
        }
    }
}

/// Type-erased infallible handler: downcasts the envelope and calls the user closure.
pub type InfallibleHandler = dyn FnMut(Envelope) + Send + 'static;

/// Type-erased fallible handler.
pub type FallibleHandler = dyn FnMut(Envelope) -> anyhow::Result<()> + Send + 'static;

/// User predicate evaluated after every dispatched message; `true` stops the select.
pub type StopPredicate = Box<dyn FnMut() -> bool + Send + 'static>;

/// Callback invoked once per chain when a select first sees it closed and drained.
pub type CloseCallback = Box<dyn FnMut(&Chain) + Send + 'static>;

/// Converts an optional timeout into an optional deadline.
///
/// `None` (wait forever) stays `None`; so does a timeout too large to
/// represent as an `Instant`.
pub fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}

/// Returns whichever of two optional deadlines comes first.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_prefers_the_sooner_deadline() {
        let now = Instant::now();
        let later = now + Duration::from_millis(50);
        assert_eq!(earliest(Some(now), Some(later)), Some(now));
        assert_eq!(earliest(None, Some(later)), Some(later));
        assert_eq!(earliest(Some(now), None), Some(now));
        assert_eq!(earliest(None, None), None);
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        assert_eq!(deadline_after(Some(Duration::MAX)), None);
        assert!(deadline_after(Some(Duration::ZERO)).is_some());
    }
}
