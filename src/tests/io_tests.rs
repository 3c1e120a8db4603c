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

//! Unit tests for the input and numeric output nodes (§4.4).

use crate::io_nodes::{InputNode, OutputNode};
use crate::port::{Direction, WriteTarget};
use crate::word::Word;

#[test]
fn input_publishes_values_in_order() {
    let input = InputNode::new(vec![Word::new(1), Word::new(2)]);
    let mut pending = None;
    input.refresh_pending(&mut pending);
    assert_eq!(pending, Some((WriteTarget::Dir(Direction::Down), Word::new(1))));
}

#[test]
fn input_does_not_overwrite_an_unconsumed_pending_write() {
    let input = InputNode::new(vec![Word::new(1), Word::new(2)]);
    let mut pending = Some((WriteTarget::Dir(Direction::Down), Word::new(99)));
    input.refresh_pending(&mut pending);
    assert_eq!(pending, Some((WriteTarget::Dir(Direction::Down), Word::new(99))));
}

#[test]
fn exhausted_input_stops_publishing() {
    let mut input = InputNode::new(vec![Word::new(1)]);
    input.advance();
    let mut pending = None;
    input.refresh_pending(&mut pending);
    assert!(pending.is_none(), "exhausted input blocks downstream reads forever rather than erroring");
}

#[test]
fn output_tracks_completion_and_mismatch() {
    let mut output = OutputNode::new(vec![Word::new(1), Word::new(2)]);
    assert!(!output.complete());
    assert!(!output.wrong());

    output.on_read_resolved(Word::new(1));
    output.commit();
    assert!(!output.complete());
    assert!(!output.wrong());

    output.on_read_resolved(Word::new(9));
    output.commit();
    assert!(output.complete());
    assert!(output.wrong(), "received value differs from expected at the same index");
}

#[test]
fn output_commit_is_a_no_op_without_a_resolved_read() {
    let mut output = OutputNode::new(vec![Word::new(1)]);
    output.commit();
    assert!(output.received.is_empty());
}
