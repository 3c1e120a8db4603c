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

//! Port and direction types shared by every node kind.

use crate::word::Word;

/// A spatial neighbor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Fixed scan priority used to resolve `any`, on both the read and
    /// write side (spec rules 2 and 3).
    pub const PRIORITY: [Direction; 4] =
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// The opposite direction, used when reciprocating neighbor links.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// A port operand: a spatial direction, or one of the non-spatial
/// selectors (`nil`, `acc`, `any`, `last`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    Dir(Direction),
    Nil,
    Acc,
    Any,
    Last,
}

/// An instruction operand: either a literal value or a port to read from
/// or write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Immediate(Word),
    Port(Port),
}

/// The target of a published pending write.
///
/// Distinct from [`Port`] because `nil`/`acc`/`immediate` resolve
/// instantly and a pending write can only ever be stored against a
/// spatial direction or `any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteTarget {
    Dir(Direction),
    Any,
}

impl WriteTarget {
    /// Whether this target would be satisfied by a read issued on `port`.
    pub fn satisfies(self, reciprocal: Direction) -> bool {
        match self {
            WriteTarget::Dir(d) => d == reciprocal,
            WriteTarget::Any => true,
        }
    }
}

/// What a node wants to read this cycle, computed from pre-cycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadIntent {
    None,
    Direct(Direction),
    AnyScan,
}
