//   Copyright 2026 TIS-100 Core Contributors
//
//   Licensed under the Apache License, Version 2.0 (the "License");
//   you may not use this file except in compliance with the License.
//   You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//   Unless required by applicable law or agreed to in writing, software
//   distributed under the License is distributed on an "AS IS" BASIS,
//   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//   See the License for the specific language governing permissions and
//   limitations under the License.

//! Input and numeric output nodes (§4.4).

use crate::port::{Direction, WriteTarget};
use crate::word::Word;

/// A finite input stream attached to the top of a grid column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputNode {
    pub values: Vec<Word>,
    pub cursor: usize,
}

impl InputNode {
    pub fn new(values: Vec<Word>) -> Self {
        InputNode { values, cursor: 0 }
    }

    /// Publishes the next unconsumed value as a pending write to `down`,
    /// if nothing is already pending and the stream isn't exhausted.
    /// Once exhausted, this simply stops publishing — downstream reads
    /// then block forever, which is how a level times out rather than
    /// erroring.
    pub fn refresh_pending(&self, pending: &mut Option<(WriteTarget, Word)>) {
        if pending.is_none() {
            if let Some(&v) = self.values.get(self.cursor) {
                *pending = Some((WriteTarget::Dir(Direction::Down), v));
            }
        }
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }
}

/// A numeric validation sink attached to the bottom of a grid column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNode {
    pub expected: Vec<Word>,
    pub received: Vec<Word>,
    read_result: Option<Word>,
}

impl OutputNode {
    pub fn new(expected: Vec<Word>) -> Self {
        OutputNode { expected, received: Vec::new(), read_result: None }
    }

    pub fn on_read_resolved(&mut self, value: Word) {
        self.read_result = Some(value);
    }

    pub fn commit(&mut self) {
        if let Some(v) = self.read_result.take() {
            self.received.push(v);
        }
    }

    /// `true` once at least as many values have arrived as expected.
    pub fn complete(&self) -> bool {
        self.received.len() >= self.expected.len()
    }

    /// `true` if any received value differs from the expected value at
    /// the same index.
    pub fn wrong(&self) -> bool {
        self.received.iter().zip(self.expected.iter()).any(|(r, e)| r != e)
    }
}
