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
use std::any::TypeId;
use std::fmt;

use tracing::{trace, warn};

use crate::chain::{Chain, Envelope};
use crate::common::{HandlerItem, HandlerMap};
use crate::traits::ChainMessage;

/// One entry of a select's case table: a chain and its handlers keyed by message type.
///
/// A message whose type has no handler is still extracted from the chain but
/// counts only as extracted, never as handled.
///
/// ```rust,ignore
/// let c = case(&chain)
///     .on(|n: i32| println!("int {n}"))
///     .try_on(|s: String| {
///         anyhow::ensure!(!s.is_empty(), "empty string");
///         Ok(())
///     });
/// ```
#[must_use]
pub struct Case {
    chain: Chain,
    handlers: HandlerMap,
}

/// Starts a case for `chain` with no handlers.
pub fn case(chain: &Chain) -> Case {
    Case::new(chain)
}

impl Case {
    /// Starts a case for `chain` with no handlers.
    pub fn new(chain: &Chain) -> Self {
        Self {
            chain: chain.clone(),
            handlers: HandlerMap::new(),
        }
    }

    /// Registers an infallible handler for messages of type `T`.
    ///
    /// A previously registered handler for `T` is replaced.
    pub fn on<T, F>(self, mut handler: F) -> Self
    where
        T: ChainMessage,
        F: FnMut(T) + Send + 'static,
    {
        let erased = move |envelope: Envelope| {
            if let Some(message) = envelope.downcast::<T>() {
                handler(message);
            }
        };
        self.with_handler::<T>(HandlerItem::Infallible(Box::new(erased)))
    }

    /// Registers a fallible handler for messages of type `T`.
    ///
    /// An error returned by the handler stops the select, which then fails
    /// with [`ChainError::HandlerFailed`](crate::chain::ChainError::HandlerFailed).
    /// A previously registered handler for `T` is replaced.
    pub fn try_on<T, F>(self, mut handler: F) -> Self
    where
        T: ChainMessage,
        F: FnMut(T) -> anyhow::Result<()> + Send + 'static,
    {
        let erased = move |envelope: Envelope| match envelope.downcast::<T>() {
            Some(message) => handler(message),
            None => Err(anyhow::anyhow!(
                "envelope tag does not match {}",
                std::any::type_name::<T>()
            )),
        };
        self.with_handler::<T>(HandlerItem::Fallible(Box::new(erased)))
    }

    /// The chain this case reads from.
    #[must_use]
    pub const fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Returns `true` if a handler for `T` is registered.
    #[must_use]
    pub fn handles<T: ChainMessage>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn with_handler<T: ChainMessage>(mut self, item: HandlerItem) -> Self {
        if self.handlers.insert(TypeId::of::<T>(), item).is_some() {
            warn!(
                chain = %self.chain.id(),
                message = std::any::type_name::<T>(),
                "handler replaced"
            );
        }
        self
    }

    /// Routes an extracted envelope. Returns `Ok(true)` if a handler ran.
    pub(crate) fn dispatch(&mut self, envelope: Envelope) -> anyhow::Result<bool> {
        match self.handlers.get_mut(&envelope.message_type()) {
            Some(handler) => {
                trace!(chain = %self.chain.id(), message = envelope.type_name(), "dispatching");
                handler.invoke(envelope)?;
                Ok(true)
            }
            None => {
                trace!(chain = %self.chain.id(), message = envelope.type_name(), "no handler, message discarded");
                Ok(false)
            }
        }
    }

    fn merge(&mut self, other: Self) {
        for (type_id, item) in other.handlers {
            if self.handlers.insert(type_id, item).is_some() {
                warn!(chain = %self.chain.id(), "handler replaced while merging cases");
            }
        }
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("chain", &self.chain)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Ordered case table. Registration order is the sweep order of the select.
#[derive(Debug, Default)]
pub(crate) struct CaseTable {
    cases: Vec<Case>,
}

impl CaseTable {
    /// Appends a case, merging it into an existing entry for the same chain.
    pub(crate) fn add(&mut self, case: Case) {
        match self.cases.iter_mut().find(|c| c.chain == case.chain) {
            Some(existing) => existing.merge(case),
            None => self.cases.push(case),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cases.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub(crate) fn chains(&self) -> impl Iterator<Item = &Chain> {
        self.cases.iter().map(Case::chain)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Case> {
        self.cases.iter_mut()
    }
}

impl FromIterator<Case> for CaseTable {
    fn from_iter<I: IntoIterator<Item = Case>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl Extend<Case> for CaseTable {
    fn extend<I: IntoIterator<Item = Case>>(&mut self, iter: I) {
        for case in iter {
            self.add(case);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::chain::{create_chain, ChainCapacity};

    #[test]
    fn dispatch_routes_by_type() {
        let chain = create_chain(ChainCapacity::unbounded());
        let ints = Arc::new(AtomicUsize::new(0));
        let mut c = case(&chain).on({
            let ints = Arc::clone(&ints);
            move |n: i32| {
                ints.fetch_add(usize::try_from(n).unwrap(), Ordering::SeqCst);
            }
        });
        assert!(c.handles::<i32>());
        assert!(!c.handles::<String>());

        assert!(c.dispatch(Envelope::new(5_i32)).unwrap());
        assert!(!c.dispatch(Envelope::new(String::from("x"))).unwrap());
        assert_eq!(ints.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn fallible_handler_error_surfaces() {
        let chain = create_chain(ChainCapacity::unbounded());
        let mut c = case(&chain).try_on(|n: u8| {
            anyhow::ensure!(n < 10, "too big: {n}");
            Ok(())
        });
        assert!(c.dispatch(Envelope::new(3_u8)).unwrap());
        let err = c.dispatch(Envelope::new(30_u8)).unwrap_err();
        assert_eq!(err.to_string(), "too big: 30");
    }

    #[test]
    fn one_handler_per_type() {
        let chain = create_chain(ChainCapacity::unbounded());
        let c = case(&chain).on(|_: i32| {}).on(|_: i32| {});
        assert_eq!(c.handler_count(), 1);
    }

    #[test]
    fn cases_for_the_same_chain_merge_in_place() {
        let first = create_chain(ChainCapacity::unbounded());
        let second = create_chain(ChainCapacity::unbounded());
        let table: CaseTable = [
            case(&first).on(|_: i32| {}),
            case(&second),
            case(&first).on(|_: String| {}),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.len(), 2);
        let chains: Vec<_> = table.chains().cloned().collect();
        assert_eq!(chains, vec![first, second]);
        assert_eq!(table.cases[0].handler_count(), 2);
    }
}
