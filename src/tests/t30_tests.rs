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

//! Unit tests for the T30 bounded LIFO (§4.3), exercised directly against
//! its push/pop bookkeeping. The rendezvous wiring that drives these in a
//! real field is covered end-to-end by `scenario_tests::s5_stack_lifo_order`.

use crate::port::ReadIntent;
use crate::t30::T30Node;
use crate::word::Word;

#[test]
fn accepts_writes_while_under_capacity() {
    let stack = T30Node::new(2);
    assert_eq!(stack.read_intent(), ReadIntent::AnyScan);
}

#[test]
fn stops_accepting_writes_once_full() {
    let mut stack = T30Node::new(2);
    stack.on_push(Word::new(1));
    stack.on_push(Word::new(2));
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.read_intent(), ReadIntent::None, "a full stack blocks writers");
}

#[test]
fn pops_in_lifo_order() {
    let mut stack = T30Node::new(3);
    stack.on_push(Word::new(1));
    stack.on_push(Word::new(2));
    stack.on_push(Word::new(3));

    assert_eq!(stack.peek(), Some(Word::new(3)));
    stack.on_popped();
    assert_eq!(stack.peek(), Some(Word::new(2)));
    stack.on_popped();
    assert_eq!(stack.peek(), Some(Word::new(1)));
    stack.on_popped();
    assert_eq!(stack.peek(), None);
    assert!(stack.is_empty());
}

#[test]
fn default_capacity_is_fifteen() {
    assert_eq!(crate::t30::DEFAULT_CAPACITY, 15);
}
