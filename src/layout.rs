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

//! A hand-written construction surface for describing a field's shape.
//!
//! The textual layout format is a parser's job and stays out of scope;
//! this is the in-scope equivalent, used to build a [`crate::field::Field`]
//! directly from Rust.

use std::collections::HashMap;

use crate::image::ImageBuffer;
use crate::t21::program::{Instruction, DEFAULT_PROGRAM_SIZE};
use crate::t30::DEFAULT_CAPACITY;
use crate::word::Word;

/// What occupies one compute-grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    Damaged,
    T21(Vec<Instruction>, HashMap<String, usize>),
    T30,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub column: usize,
    pub values: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSpec {
    Numeric { column: usize, expected: Vec<Word> },
    Image { column: usize, width: usize, height: usize, expected: ImageBuffer },
}

/// Describes a field's grid shape, cell contents and I/O attachments
/// before construction. Analogous to a parsed layout file, built by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSpec {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellKind>,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    pub t21_program_limit: usize,
    pub t30_capacity: usize,
}

impl LayoutSpec {
    pub fn new(width: usize, height: usize) -> Self {
        LayoutSpec {
            width,
            height,
            cells: vec![CellKind::Damaged; width * height],
            inputs: Vec::new(),
            outputs: Vec::new(),
            t21_program_limit: DEFAULT_PROGRAM_SIZE,
            t30_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn with_cell(mut self, x: usize, y: usize, kind: CellKind) -> Self {
        if let CellKind::T21(program, _) = &kind {
            debug_assert!(
                program.len() <= self.t21_program_limit,
                "T21 program exceeds the configured limit"
            );
        }
        self.cells[y * self.width + x] = kind;
        self
    }

    pub fn with_input(mut self, column: usize, values: Vec<Word>) -> Self {
        self.inputs.push(InputSpec { column, values });
        self
    }

    pub fn with_output(mut self, column: usize, expected: Vec<Word>) -> Self {
        self.outputs.push(OutputSpec::Numeric { column, expected });
        self
    }

    pub fn with_image_output(
        mut self,
        column: usize,
        width: usize,
        height: usize,
        expected: ImageBuffer,
    ) -> Self {
        self.outputs.push(OutputSpec::Image { column, width, height, expected });
        self
    }

    pub fn with_t21_program_limit(mut self, limit: usize) -> Self {
        self.t21_program_limit = limit;
        self
    }

    pub fn with_t30_capacity(mut self, capacity: usize) -> Self {
        self.t30_capacity = capacity;
        self
    }

    pub fn cell(&self, x: usize, y: usize) -> &CellKind {
        &self.cells[y * self.width + x]
    }
}
