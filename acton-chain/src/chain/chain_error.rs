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

use super::ChainId;

/// Stable, programmatically comparable codes for [`ChainError`].
///
/// The numeric values never change between releases.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A message was sent to a closed chain.
    ChainClosed = 1,
    /// A bounded chain stayed full and its overflow reaction is `Fail`.
    ChainOverflow = 2,
    /// An extensible select was run or modified while a run of it was in progress.
    ExtensibleSelectIsActiveNow = 3,
    /// A select had no cases and no timeout, so it could never finish.
    NoCases = 4,
    /// A fallible handler returned an error.
    HandlerFailed = 5,
}

/// Errors produced by chains and the select engine.
///
/// Only misuse and handler failures are errors. An expired wait or a
/// drained, closed chain is reported through
/// [`ExtractionStatus`](crate::select::ExtractionStatus) instead.
#[derive(Debug)]
pub enum ChainError {
    /// The chain was closed before or while the message was sent.
    ChainClosed {
        /// The closed chain.
        chain: ChainId,
    },
    /// The chain was full and the overflow reaction rejected the message.
    ChainOverflow {
        /// The full chain.
        chain: ChainId,
        /// Its capacity.
        capacity: usize,
    },
    /// Nested or concurrent run, or modification, of an active extensible select.
    ExtensibleSelectIsActiveNow,
    /// A select with no cases would wait forever.
    NoCases,
    /// A handler failed; the select stopped after restoring its session.
    HandlerFailed(anyhow::Error),
}

impl ChainError {
    /// Returns the stable code identifying this kind of error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::ChainClosed { .. } => ErrorCode::ChainClosed,
            Self::ChainOverflow { .. } => ErrorCode::ChainOverflow,
            Self::ExtensibleSelectIsActiveNow => ErrorCode::ExtensibleSelectIsActiveNow,
            Self::NoCases => ErrorCode::NoCases,
            Self::HandlerFailed(_) => ErrorCode::HandlerFailed,
        }
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChainClosed { chain } => write!(f, "{chain} is closed"),
            Self::ChainOverflow { chain, capacity } => {
                write!(f, "{chain} is full (capacity {capacity})")
            }
            Self::ExtensibleSelectIsActiveNow => {
                write!(f, "extensible select is active now")
            }
            Self::NoCases => write!(f, "select has no cases and no timeout"),
            Self::HandlerFailed(e) => write!(f, "handler failed: {e}"),
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::HandlerFailed(e) => Some(&**e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::ChainClosed as i32, 1);
        assert_eq!(ErrorCode::ChainOverflow as i32, 2);
        assert_eq!(ErrorCode::ExtensibleSelectIsActiveNow as i32, 3);
        assert_eq!(ErrorCode::NoCases as i32, 4);
        assert_eq!(ErrorCode::HandlerFailed as i32, 5);
    }

    #[test]
    fn handler_failure_keeps_its_source() {
        let err = ChainError::HandlerFailed(anyhow::anyhow!("boom"));
        assert_eq!(err.code(), ErrorCode::HandlerFailed);
        assert_eq!(err.to_string(), "handler failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }
}
