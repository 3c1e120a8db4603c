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

//! Decode/execute helpers for a single T21 instruction.
//!
//! Kept free of [`super::T21Node`]'s field access so the blocking-operand
//! resolution rules (an operand either yields a value immediately or names
//! the port to block on) are exercised identically whether reached from a
//! fresh decode or from resuming a blocked read.

use crate::port::{Direction, Operand, Port, WriteTarget};
use crate::word::Word;

/// What resolving a source operand against current register/`last` state
/// yields: a value in hand, or a port that must rendezvous first.
pub enum SrcResolution {
    Value(Word),
    Block(Port),
}

/// Resolves a source operand without touching any port rendezvous state.
/// `acc` and `last` are the only register state a source operand can read
/// without blocking.
pub fn resolve_src(op: Operand, acc: Word, last: Option<Direction>) -> SrcResolution {
    match op {
        Operand::Immediate(w) => SrcResolution::Value(w),
        Operand::Port(Port::Acc) => SrcResolution::Value(acc),
        Operand::Port(Port::Nil) => SrcResolution::Value(Word::ZERO),
        Operand::Port(Port::Last) => match last {
            Some(d) => SrcResolution::Block(Port::Dir(d)),
            None => SrcResolution::Value(Word::ZERO),
        },
        Operand::Port(p @ (Port::Dir(_) | Port::Any)) => SrcResolution::Block(p),
    }
}

/// What applying a resolved value to a destination port yields: it's
/// already done, or a pending write was published and a drain must be
/// awaited.
pub enum DstResolution {
    Done,
    Blocked(WriteTarget),
}

/// Applies `value` to destination `dst`. Mutates `acc` directly for the
/// `acc` destination; publishes into `*pending` for spatial/`any`
/// destinations (the caller is responsible for not overwriting an
/// already-pending write).
pub fn apply_dst(
    dst: Port,
    value: Word,
    acc: &mut Word,
    last: Option<Direction>,
    pending: &mut Option<(WriteTarget, Word)>,
) -> DstResolution {
    match dst {
        Port::Acc => {
            *acc = value;
            DstResolution::Done
        }
        Port::Nil => DstResolution::Done,
        Port::Last => match last {
            Some(d) => {
                *pending = Some((WriteTarget::Dir(d), value));
                DstResolution::Blocked(WriteTarget::Dir(d))
            }
            None => DstResolution::Done,
        },
        Port::Dir(d) => {
            *pending = Some((WriteTarget::Dir(d), value));
            DstResolution::Blocked(WriteTarget::Dir(d))
        }
        Port::Any => {
            *pending = Some((WriteTarget::Any, value));
            DstResolution::Blocked(WriteTarget::Any)
        }
    }
}
