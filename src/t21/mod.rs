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

//! The T21 compute node: program storage plus the decode/execute state
//! machine described in component design §4.2.

pub mod exec;
pub mod program;

use std::collections::HashMap;

use crate::node::{Activity, HaltSignal};
use crate::port::{Direction, Port, ReadIntent, WriteTarget};
use crate::word::Word;
use exec::{apply_dst, resolve_src, DstResolution, SrcResolution};
use program::{Instruction, Opcode};

/// A T21's blocking state. `Idle` applies only when the program is empty;
/// a non-empty program is always in `Run`, `Read`, or `Write`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecState {
    Idle,
    Run,
    Read(Port),
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct T21Node {
    pub program: Vec<Instruction>,
    pub labels: HashMap<String, usize>,
    pub acc: Word,
    pub bak: Word,
    pub ip: usize,
    pub activity: Activity,
    state: ExecState,
    /// Cached between the read phase's latch and the step phase's commit.
    read_result: Option<Word>,
}

impl T21Node {
    pub fn new(program: Vec<Instruction>, labels: HashMap<String, usize>) -> Self {
        let state = if program.is_empty() { ExecState::Idle } else { ExecState::Run };
        let activity = if program.is_empty() { Activity::Idle } else { Activity::Run };
        T21Node {
            program,
            labels,
            acc: Word::ZERO,
            bak: Word::ZERO,
            ip: 0,
            activity,
            state,
            read_result: None,
        }
    }

    /// Whether this node's program contains a `hcf`, which keeps an
    /// otherwise-isolated node in the simulation set (finalize step 5).
    pub fn has_hcf(&self) -> bool {
        self.program.iter().any(|i| matches!(i.opcode, Opcode::Hcf))
    }

    pub fn read_intent(&self, last: Option<Direction>) -> ReadIntent {
        let _ = last;
        match self.state {
            ExecState::Read(Port::Dir(d)) => ReadIntent::Direct(d),
            ExecState::Read(Port::Any) => ReadIntent::AnyScan,
            _ => ReadIntent::None,
        }
    }

    fn advance_ip(&mut self) {
        if !self.program.is_empty() {
            self.ip = (self.ip + 1) % self.program.len();
        }
    }

    fn current_opcode(&self) -> Opcode {
        self.program[self.ip].opcode.clone()
    }

    fn current_line(&self) -> Option<u32> {
        self.program[self.ip].line
    }

    /// Applies a resolved source value to whatever instruction is blocked
    /// in `ExecState::Read`, then either completes (advances `ip`, returns
    /// to `Run`) or transitions to `Write` awaiting a destination drain.
    pub fn on_read_resolved(&mut self, value: Word, via: Direction) {
        let _ = via;
        self.read_result = Some(value);
    }

    /// Step-phase advance. Mirrors §4.2's per-cycle state machine exactly:
    /// one instruction's worth of progress per call.
    pub fn step(
        &mut self,
        x: i32,
        y: i32,
        pending: &mut Option<(WriteTarget, Word)>,
        last: Option<Direction>,
    ) -> Option<HaltSignal> {
        if self.program.is_empty() {
            self.activity = Activity::Idle;
            return None;
        }

        match self.state {
            ExecState::Idle => {
                self.state = ExecState::Run;
                None
            }
            ExecState::Write => {
                if pending.is_none() {
                    self.advance_ip();
                    self.state = ExecState::Run;
                    self.activity = Activity::Run;
                } else {
                    self.activity = Activity::Write;
                }
                None
            }
            ExecState::Read(_) => {
                if let Some(v) = self.read_result.take() {
                    self.commit_read(v, pending, last);
                } else {
                    self.activity = Activity::Read;
                }
                None
            }
            ExecState::Run => {
                self.activity = Activity::Run;
                self.decode_execute(x, y, pending, last)
            }
        }
    }

    /// Applies a just-resolved source value to the instruction that is
    /// waiting on it, re-reading the instruction at `ip` (unchanged since
    /// the block began) rather than keeping a separate resumption record.
    fn commit_read(&mut self, value: Word, pending: &mut Option<(WriteTarget, Word)>, last: Option<Direction>) {
        match self.current_opcode() {
            Opcode::Mov { dst, .. } => match apply_dst(dst, value, &mut self.acc, last, pending) {
                DstResolution::Done => {
                    self.advance_ip();
                    self.state = ExecState::Run;
                }
                DstResolution::Blocked(_) => {
                    self.state = ExecState::Write;
                    self.activity = Activity::Write;
                }
            },
            Opcode::Add(_) => {
                self.acc = self.acc.saturating_add(value);
                self.advance_ip();
                self.state = ExecState::Run;
            }
            Opcode::Sub(_) => {
                self.acc = self.acc.saturating_sub(value);
                self.advance_ip();
                self.state = ExecState::Run;
            }
            Opcode::Jro(_) => {
                self.ip = Word::new(self.ip as i32 + value.get()).clamp_index(self.program.len());
                self.state = ExecState::Run;
            }
            _ => unreachable!("T21 only blocks on Mov/Add/Sub/Jro source reads"),
        }
    }

    fn decode_execute(
        &mut self,
        x: i32,
        y: i32,
        pending: &mut Option<(WriteTarget, Word)>,
        last: Option<Direction>,
    ) -> Option<HaltSignal> {
        match self.current_opcode() {
            Opcode::Nop => self.advance_ip(),
            Opcode::Swp => {
                std::mem::swap(&mut self.acc, &mut self.bak);
                self.advance_ip();
            }
            Opcode::Sav => {
                self.bak = self.acc;
                self.advance_ip();
            }
            Opcode::Neg => {
                self.acc = self.acc.negate();
                self.advance_ip();
            }
            Opcode::Hcf => {
                let line = self.current_line();
                return Some(HaltSignal { x, y, line });
            }
            Opcode::Jmp(label) => self.branch_to(&label),
            Opcode::Jez(label) => self.branch_if(&label, self.acc.get() == 0),
            Opcode::Jnz(label) => self.branch_if(&label, self.acc.get() != 0),
            Opcode::Jgz(label) => self.branch_if(&label, self.acc.get() > 0),
            Opcode::Jlz(label) => self.branch_if(&label, self.acc.get() < 0),
            Opcode::Add(src) => match resolve_src(src, self.acc, last) {
                SrcResolution::Value(v) => {
                    self.acc = self.acc.saturating_add(v);
                    self.advance_ip();
                }
                SrcResolution::Block(p) => self.enter_read(p),
            },
            Opcode::Sub(src) => match resolve_src(src, self.acc, last) {
                SrcResolution::Value(v) => {
                    self.acc = self.acc.saturating_sub(v);
                    self.advance_ip();
                }
                SrcResolution::Block(p) => self.enter_read(p),
            },
            Opcode::Jro(src) => match resolve_src(src, self.acc, last) {
                SrcResolution::Value(v) => {
                    self.ip = Word::new(self.ip as i32 + v.get()).clamp_index(self.program.len())
                }
                SrcResolution::Block(p) => self.enter_read(p),
            },
            Opcode::Mov { src, dst } => match resolve_src(src, self.acc, last) {
                SrcResolution::Value(v) => match apply_dst(dst, v, &mut self.acc, last, pending) {
                    DstResolution::Done => self.advance_ip(),
                    DstResolution::Blocked(_) => {
                        self.state = ExecState::Write;
                        self.activity = Activity::Write;
                    }
                },
                SrcResolution::Block(p) => self.enter_read(p),
            },
        }
        None
    }

    fn enter_read(&mut self, port: Port) {
        self.state = ExecState::Read(port);
        self.activity = Activity::Read;
    }

    fn branch_to(&mut self, label: &str) {
        if let Some(&idx) = self.labels.get(label) {
            self.ip = idx;
        } else {
            self.advance_ip();
        }
    }

    fn branch_if(&mut self, label: &str, cond: bool) {
        if cond {
            self.branch_to(label);
        } else {
            self.advance_ip();
        }
    }
}
