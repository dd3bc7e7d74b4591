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
use std::any::Any;
use std::fmt::Debug;

/// A marker trait for types that can travel through a [`Chain`](crate::chain::Chain).
///
/// Messages are moved into the chain and moved out again by the consumer, so
/// there is no `Clone` requirement. `Debug` is required so extracted messages
/// can show up in traces.
///
/// A blanket implementation covers every `Any + Send + Debug` type; payload-less
/// signals are simply unit structs.
pub trait ChainMessage: Any + Send + Debug {
    /// Converts the boxed message into a boxed [`Any`] so it can be downcast by value.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T> ChainMessage for T
where
    T: Any + Send + Debug,
{
    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}
