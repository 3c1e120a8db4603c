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

//! # tis100-core
//!
//! A cycle-accurate simulation core for TIS-100: a grid of communicating
//! T21 compute nodes, T30 stack nodes, and input/output nodes, driven by a
//! deterministic two-phase (read, then step) cycle scheduler.
//!
//! This crate is the execution engine only. Parsing TIS-100 assembly source
//! and textual layout files, the CLI, the level catalog, random test-vector
//! generation and score/classification reporting are all out of scope and
//! left to a caller; this crate consumes already-compiled [`t21::program`]
//! instructions and a hand-built [`layout::LayoutSpec`], and exposes `step`,
//! `active`, and read-only state for validation.
//!
//! ## Example
//!
//! ```rust
//! use tis100_core::field::Field;
//! use tis100_core::layout::{CellKind, LayoutSpec};
//! use tis100_core::port::{Direction, Operand, Port};
//! use tis100_core::t21::program::{Instruction, Opcode};
//! use tis100_core::word::Word;
//!
//! // A single compute node that copies its input straight to its output.
//! let program = vec![Instruction::new(Opcode::Mov {
//!     src: Operand::Port(Port::Dir(Direction::Up)),
//!     dst: Port::Dir(Direction::Down),
//! })];
//!
//! let spec = LayoutSpec::new(1, 1)
//!     .with_cell(0, 0, CellKind::T21(program, Default::default()))
//!     .with_input(0, vec![Word::new(1), Word::new(2), Word::new(3)])
//!     .with_output(0, vec![Word::new(1), Word::new(2), Word::new(3)]);
//!
//! let mut field = Field::new(&spec);
//! let mut cycles = 0;
//! while field.active() && cycles < 1_000 {
//!     field.step();
//!     cycles += 1;
//! }
//! assert!(cycles >= 3);
//! ```

pub mod field;
pub mod image;
pub mod io_nodes;
pub mod layout;
pub mod node;
pub mod port;
pub mod t21;
pub mod t30;
pub mod word;

pub use field::Field;
pub use node::HaltSignal;
pub use word::Word;

#[cfg(test)]
mod tests;
