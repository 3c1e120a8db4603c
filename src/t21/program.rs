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

//! The compiled instruction representation a T21 program is made of.
//!
//! This is consumed, not produced: building one of these from TIS-100
//! assembly source is a parser's job, outside this crate.

use crate::port::{Operand, Port};

/// Default program capacity used when a [`crate::layout::LayoutSpec`] does
/// not override it.
pub const DEFAULT_PROGRAM_SIZE: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    Nop,
    Mov { src: Operand, dst: Port },
    Swp,
    Sav,
    Add(Operand),
    Sub(Operand),
    Neg,
    Jmp(String),
    Jez(String),
    Jnz(String),
    Jgz(String),
    Jlz(String),
    Jro(Operand),
    Hcf,
}

/// One compiled instruction, with optional source-line attribution used
/// only by `hcf`'s halt signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub line: Option<u32>,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Instruction { opcode, line: None }
    }

    pub fn with_line(opcode: Opcode, line: u32) -> Self {
        Instruction { opcode, line: Some(line) }
    }
}
