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

use static_assertions::assert_impl_all;

use crate::traits::ChainMessage;

/// A message in transit: the boxed payload plus its runtime type tag.
///
/// Envelopes are created by `send`/`push` and handed back by `pop` or to the
/// select engine, which routes them by [`Envelope::message_type`].
pub struct Envelope {
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn ChainMessage>,
}

impl Envelope {
    /// Wraps a message, recording its concrete type.
    pub fn new<T: ChainMessage>(message: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            payload: Box::new(message),
        }
    }

    /// The type tag used for handler lookup.
    #[inline]
    #[must_use]
    pub fn message_type(&self) -> TypeId {
        self.type_id
    }

    /// The name of the payload type, for diagnostics.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the payload is a `T`.
    #[inline]
    #[must_use]
    pub fn is<T: ChainMessage>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Consumes the envelope and returns the payload if it is a `T`.
    pub fn downcast<T: ChainMessage>(self) -> Option<T> {
        if !self.is::<T>() {
            return None;
        }
        ChainMessage::into_any(self.payload)
            .downcast::<T>()
            .ok()
            .map(|message| *message)
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("type_name", &self.type_name)
            .field("payload", &self.payload)
            .finish()
    }
}

assert_impl_all!(Envelope: Send);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[test]
    fn downcast_recovers_the_payload() {
        let envelope = Envelope::new(Ping(7));
        assert!(envelope.is::<Ping>());
        assert!(!envelope.is::<u32>());
        assert_eq!(envelope.downcast::<Ping>(), Some(Ping(7)));
    }

    #[test]
    fn downcast_to_the_wrong_type_yields_none() {
        let envelope = Envelope::new(String::from("hello"));
        assert!(envelope.type_name().contains("String"));
        assert_eq!(envelope.downcast::<i32>(), None);
    }
}
