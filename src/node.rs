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

//! Common node representation: the closed set of node kinds, their shared
//! coordinate/neighbor/pending-write bookkeeping, and the capability set
//! every kind implements.

use crate::image::ImageNode;
use crate::io_nodes::{InputNode, OutputNode};
use crate::port::{Direction, ReadIntent, WriteTarget};
use crate::t21::T21Node;
use crate::t30::T30Node;
use crate::word::Word;

/// Index of a node within a [`crate::field::Field`]'s arena.
///
/// Non-owning; valid only for as long as the `Field` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// The observable activity of a node at the end of its most recent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Run,
    Read,
    Write,
}

/// A node's four spatial neighbor links, post-finalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub up: Option<NodeId>,
    pub down: Option<NodeId>,
}

impl Neighbors {
    pub fn get(&self, d: Direction) -> Option<NodeId> {
        match d {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn set(&mut self, d: Direction, id: Option<NodeId>) {
        match d {
            Direction::Left => self.left = id,
            Direction::Right => self.right = id,
            Direction::Up => self.up = id,
            Direction::Down => self.down = id,
        }
    }

    /// Neighbors in the fixed `{left, right, up, down}` scan priority.
    pub fn in_priority(&self) -> [(Direction, Option<NodeId>); 4] {
        Direction::PRIORITY.map(|d| (d, self.get(d)))
    }
}

/// A terminal `hcf` condition raised by a T21 node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaltSignal {
    pub x: i32,
    pub y: i32,
    pub line: Option<u32>,
}

/// The closed set of node kinds a field can contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Damaged,
    T21(T21Node),
    T30(T30Node),
    Input(InputNode),
    Output(OutputNode),
    Image(ImageNode),
}

/// A short, stable tag naming a node's kind, used by introspection and by
/// the finalize pass's "is this neighbor inert?" test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Damaged,
    T21,
    T30,
    Input,
    Output,
    Image,
}

impl NodeKind {
    pub fn type_tag(&self) -> NodeType {
        match self {
            NodeKind::Damaged => NodeType::Damaged,
            NodeKind::T21(_) => NodeType::T21,
            NodeKind::T30(_) => NodeType::T30,
            NodeKind::Input(_) => NodeType::Input,
            NodeKind::Output(_) => NodeType::Output,
            NodeKind::Image(_) => NodeType::Image,
        }
    }

    /// Inert neighbors (damaged, or absent) are never traversed; a
    /// finalized field replaces links to them with `None`.
    pub fn is_inert(&self) -> bool {
        matches!(self, NodeKind::Damaged)
    }

    pub fn activity(&self) -> Activity {
        match self {
            NodeKind::Damaged => Activity::Idle,
            NodeKind::T21(t) => t.activity,
            NodeKind::T30(_) => Activity::Idle,
            NodeKind::Input(n) => {
                if n.cursor < n.values.len() {
                    Activity::Write
                } else {
                    Activity::Idle
                }
            }
            NodeKind::Output(_) => Activity::Read,
            NodeKind::Image(_) => Activity::Read,
        }
    }
}

/// A node, plus the coordinate/topology/rendezvous bookkeeping common to
/// every kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    pub x: i32,
    pub y: i32,
    pub neighbors: Neighbors,
    /// A write this node has published and not yet had consumed. Rule 1:
    /// stays visible across cycles until a reader latches it.
    pub pending_write: Option<(WriteTarget, Word)>,
    /// The spatial direction most recently resolved via `any`, for `mov
    /// last, x` / `mov x, last` and for T30's own bookkeeping.
    pub last: Option<Direction>,
    pub kind: NodeKind,
}

impl FieldNode {
    pub fn new(x: i32, y: i32, kind: NodeKind) -> Self {
        FieldNode {
            x,
            y,
            neighbors: Neighbors::default(),
            pending_write: None,
            last: None,
            kind,
        }
    }

    /// What this node wants to read from a neighbor this cycle, computed
    /// purely from its own pre-cycle state.
    pub fn read_intent(&self) -> ReadIntent {
        match &self.kind {
            NodeKind::Damaged => ReadIntent::None,
            NodeKind::T21(t) => t.read_intent(self.last),
            NodeKind::T30(t) => t.read_intent(),
            NodeKind::Input(_) => ReadIntent::None,
            NodeKind::Output(_) => ReadIntent::Direct(Direction::Up),
            NodeKind::Image(_) => ReadIntent::Direct(Direction::Up),
        }
    }

    /// Called when this node's read intent was satisfied this cycle: `via`
    /// is the direction the value arrived from (the winning scan direction
    /// for `AnyScan`, or the fixed direction for `Direct`).
    ///
    /// For most kinds this only caches the value for the step phase; T30
    /// pushes immediately, since it has no step-phase state of its own.
    pub fn on_read_resolved(&mut self, value: Word, via: Direction) {
        let was_any = matches!(self.read_intent(), ReadIntent::AnyScan);
        match &mut self.kind {
            NodeKind::Damaged => {}
            NodeKind::T21(t) => t.on_read_resolved(value, via),
            NodeKind::T30(t) => {
                t.on_push(value);
                // The freshly pushed value is the new top; offer it for
                // the next pop regardless of whether anything was parked
                // in `pending_write` before.
                self.pending_write = Some((WriteTarget::Any, value));
            }
            NodeKind::Input(_) => {}
            NodeKind::Output(n) => n.on_read_resolved(value),
            NodeKind::Image(n) => n.on_read_resolved(value),
        }
        if was_any {
            self.last = Some(via);
        }
    }

    /// Called on the writer side when its pending write was just consumed
    /// by a reader; `via` is the direction the reader sat at (from the
    /// writer's perspective).
    pub fn on_write_consumed(&mut self, target: WriteTarget, via: Direction) {
        self.pending_write = None;
        if matches!(target, WriteTarget::Any) {
            self.last = Some(via);
        }
        match &mut self.kind {
            NodeKind::T30(t) => {
                t.on_popped();
                if let Some(top) = t.peek() {
                    self.pending_write = Some((WriteTarget::Any, top));
                }
            }
            NodeKind::Input(n) => n.advance(),
            _ => {}
        }
    }

    /// Step-phase advance: decode/execute for T21, append-received for
    /// output/image, no-op otherwise. Returns a halt signal if this step
    /// raised one.
    pub fn step(&mut self) -> Option<HaltSignal> {
        match &mut self.kind {
            NodeKind::Damaged => None,
            NodeKind::T21(t) => t.step(self.x, self.y, &mut self.pending_write, self.last),
            NodeKind::T30(_) => None,
            NodeKind::Input(n) => {
                n.refresh_pending(&mut self.pending_write);
                None
            }
            NodeKind::Output(n) => {
                n.commit();
                None
            }
            NodeKind::Image(n) => {
                n.commit();
                None
            }
        }
    }
}
