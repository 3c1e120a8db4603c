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

//! The image output node and its fixed-palette pixel buffer (§4.5).

use crate::word::Word;

/// The four-value image palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Black,
    Dark,
    Light,
    White,
}

impl Palette {
    fn from_word(n: i32) -> Palette {
        match n.rem_euclid(4) {
            0 => Palette::Black,
            1 => Palette::Dark,
            2 => Palette::Light,
            _ => Palette::White,
        }
    }

    fn to_char(self) -> char {
        match self {
            Palette::Black => '0',
            Palette::Dark => '1',
            Palette::Light => '2',
            Palette::White => '3',
        }
    }
}

/// A fixed-size 2D pixel buffer. Never resized after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Palette>,
}

impl ImageBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        ImageBuffer { width, height, pixels: vec![Palette::default(); width * height] }
    }

    pub fn get(&self, x: usize, y: usize) -> Palette {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, p: Palette) {
        self.pixels[y * self.width + x] = p;
    }

    /// `true` if every pixel is still the default palette value — used by
    /// `layout()` to decide whether to print an expected-image literal.
    pub fn blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == Palette::Black)
    }

    pub fn write_text(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.get(x, y).to_char());
            }
            if y + 1 != self.height {
                out.push('\n');
            }
        }
        out
    }
}

/// The draw-command mode state machine (§4.5, and the wire-format
/// decision recorded in `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrawMode {
    AwaitCommand,
    AwaitX,
    AwaitY(i32),
    AwaitLength(Palette),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNode {
    pub expected: ImageBuffer,
    pub received: ImageBuffer,
    cursor: (i32, i32),
    mode: DrawMode,
    read_result: Option<Word>,
}

impl ImageNode {
    pub fn new(width: usize, height: usize, expected: ImageBuffer) -> Self {
        ImageNode {
            expected,
            received: ImageBuffer::new(width, height),
            cursor: (0, 0),
            mode: DrawMode::AwaitCommand,
            read_result: None,
        }
    }

    pub fn width(&self) -> usize {
        self.received.width
    }

    pub fn height(&self) -> usize {
        self.received.height
    }

    pub fn on_read_resolved(&mut self, value: Word) {
        self.read_result = Some(value);
    }

    /// Step-phase commit: advances the draw-command state machine by one
    /// word. A negative command word starts a three-word absolute move;
    /// a non-negative one is a run-length color draw.
    pub fn commit(&mut self) {
        let Some(v) = self.read_result.take() else { return };
        let n = v.get();
        match self.mode {
            DrawMode::AwaitCommand => {
                if n < 0 {
                    self.mode = DrawMode::AwaitX;
                } else {
                    self.mode = DrawMode::AwaitLength(Palette::from_word(n));
                }
            }
            DrawMode::AwaitX => {
                self.mode = DrawMode::AwaitY(n);
            }
            DrawMode::AwaitY(x) => {
                self.cursor = (
                    x.clamp(0, self.width().saturating_sub(1) as i32),
                    n.clamp(0, self.height().saturating_sub(1) as i32),
                );
                self.mode = DrawMode::AwaitCommand;
            }
            DrawMode::AwaitLength(color) => {
                self.draw_run(color, n);
                self.mode = DrawMode::AwaitCommand;
            }
        }
    }

    /// Draws `length` pixels of `color` starting at the cursor, clipped at
    /// the right edge without wrapping to the next row. The cursor's `x`
    /// advances by the full, unclipped length so a run drawn entirely
    /// off-buffer still leaves the cursor in the right place for the next
    /// command.
    fn draw_run(&mut self, color: Palette, length: i32) {
        let (cx, cy) = self.cursor;
        let len = length.max(0);
        if cy >= 0 && (cy as usize) < self.height() {
            for i in 0..len {
                let x = cx + i;
                if x >= 0 && (x as usize) < self.width() {
                    self.received.set(x as usize, cy as usize, color);
                }
            }
        }
        self.cursor = (cx + len, cy);
    }
}
