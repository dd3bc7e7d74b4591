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
use derive_new::new;

/// What a finished select run reports about its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// Nothing was extracted and the wait ceiling expired.
    NoMessages,
    /// At least one message was extracted, whatever condition ended the run.
    MsgExtracted,
    /// Nothing was extracted because every chain was closed and drained.
    ChainClosed,
}

/// Counts and status of one select run.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectResult {
    extracted: usize,
    handled: usize,
    status: ExtractionStatus,
}

impl SelectResult {
    /// Messages removed from chains, handled or not.
    #[must_use]
    pub const fn extracted(&self) -> usize {
        self.extracted
    }

    /// Messages that matched a registered handler.
    #[must_use]
    pub const fn handled(&self) -> usize {
        self.handled
    }

    /// The run's final status.
    #[must_use]
    pub const fn status(&self) -> ExtractionStatus {
        self.status
    }
}
