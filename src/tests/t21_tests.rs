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

//! Unit tests for T21 decode/execute semantics (§4.2), driven directly
//! against [`T21Node::step`] rather than through a full [`crate::field::Field`]
//! — exactly the cases a full grid would never isolate cleanly.

use std::collections::HashMap;

use crate::node::Activity;
use crate::port::{Direction, Operand, Port, WriteTarget};
use crate::t21::program::{Instruction, Opcode};
use crate::t21::T21Node;
use crate::word::Word;

fn node(program: Vec<Instruction>) -> T21Node {
    T21Node::new(program, HashMap::new())
}

fn node_with_labels(program: Vec<Instruction>, labels: &[(&str, usize)]) -> T21Node {
    let map: HashMap<String, usize> = labels.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    T21Node::new(program, map)
}

#[test]
fn empty_program_is_idle_forever() {
    let mut n = node(vec![]);
    assert_eq!(n.activity, Activity::Idle);
    let mut pending = None;
    let sig = n.step(0, 0, &mut pending, None);
    assert!(sig.is_none());
    assert_eq!(n.activity, Activity::Idle);
}

#[test]
fn nop_advances_ip_and_wraps() {
    let mut n = node(vec![Instruction::new(Opcode::Nop), Instruction::new(Opcode::Nop)]);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 1);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 0); // wraps past the end
}

#[test]
fn swp_exchanges_acc_and_bak() {
    let mut n = node(vec![Instruction::new(Opcode::Swp)]);
    n.acc = Word::new(5);
    n.bak = Word::new(9);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::new(9));
    assert_eq!(n.bak, Word::new(5));
}

#[test]
fn sav_copies_acc_into_bak_without_touching_acc() {
    let mut n = node(vec![Instruction::new(Opcode::Sav)]);
    n.acc = Word::new(7);
    n.bak = Word::new(0);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::new(7));
    assert_eq!(n.bak, Word::new(7));
}

#[test]
fn add_sub_neg_saturate() {
    let mut n = node(vec![
        Instruction::new(Opcode::Add(Operand::Immediate(Word::new(999)))),
        Instruction::new(Opcode::Add(Operand::Immediate(Word::new(999)))),
        Instruction::new(Opcode::Sub(Operand::Immediate(Word::new(999)))),
        Instruction::new(Opcode::Neg),
    ]);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::new(999));
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc.get(), 999, "add saturates rather than overflowing");
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc.get(), 0);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc.get(), 0, "negating zero stays zero");
}

#[test]
fn jez_jnz_jgz_jlz_branch_on_acc() {
    // Each program: [branch to label "hit", nop, nop] with "hit" == index 2.
    let mk = |op: fn(String) -> Opcode| {
        node_with_labels(
            vec![Instruction::new(op("hit".into())), Instruction::new(Opcode::Nop), Instruction::new(Opcode::Nop)],
            &[("hit", 2)],
        )
    };

    let mut pending = None;

    let mut n = mk(Opcode::Jez);
    n.acc = Word::ZERO;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 2, "jez taken when acc == 0");

    let mut n = mk(Opcode::Jez);
    n.acc = Word::new(1);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 1, "jez not taken when acc != 0");

    let mut n = mk(Opcode::Jnz);
    n.acc = Word::new(1);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 2);

    let mut n = mk(Opcode::Jgz);
    n.acc = Word::new(5);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 2);

    let mut n = mk(Opcode::Jgz);
    n.acc = Word::new(-5);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 1);

    let mut n = mk(Opcode::Jlz);
    n.acc = Word::new(-5);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 2);
}

#[test]
fn jmp_to_unknown_label_just_advances() {
    // A dangling label reference shouldn't be reachable from a compiled
    // program in practice (that's the parser's job to reject), but the
    // node falls back to a plain advance rather than panicking.
    let mut n = node(vec![Instruction::new(Opcode::Jmp("nowhere".into())), Instruction::new(Opcode::Nop)]);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 1);
}

#[test]
fn jro_clamps_forward_past_program_end() {
    let mut n = node(vec![
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Jro(Operand::Immediate(Word::new(100)))),
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Nop),
    ]);
    n.ip = 2;
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 4, "clamps to the last valid index, not wraps");
}

#[test]
fn jro_clamps_backward_past_program_start() {
    let mut n = node(vec![
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Jro(Operand::Immediate(Word::new(-100)))),
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Nop),
    ]);
    n.ip = 2;
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 0);
}

#[test]
fn jro_offset_is_relative_to_current_ip() {
    let mut n = node(vec![
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Jro(Operand::Immediate(Word::new(1)))),
        Instruction::new(Opcode::Nop),
        Instruction::new(Opcode::Nop),
    ]);
    n.ip = 2;
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 3, "ip + offset, not offset alone");
}

#[test]
fn hcf_raises_a_halt_signal_with_coordinates_and_line() {
    let mut n = node(vec![Instruction::with_line(Opcode::Hcf, 7)]);
    let mut pending = None;
    let sig = n.step(3, 4, &mut pending, None).expect("hcf halts");
    assert_eq!(sig.x, 3);
    assert_eq!(sig.y, 4);
    assert_eq!(sig.line, Some(7));
}

#[test]
fn mov_immediate_to_acc_completes_without_blocking() {
    let mut n = node(vec![Instruction::new(Opcode::Mov { src: Operand::Immediate(Word::new(42)), dst: Port::Acc })]);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::new(42));
    assert_eq!(n.ip, 0, "single-instruction program wraps back to 0");
    assert!(pending.is_none());
}

#[test]
fn mov_to_spatial_port_blocks_until_the_write_drains() {
    let mut n =
        node(vec![Instruction::new(Opcode::Mov { src: Operand::Immediate(Word::new(5)), dst: Port::Dir(Direction::Right) })]);
    let mut pending = None;

    n.step(0, 0, &mut pending, None);
    assert_eq!(pending, Some((WriteTarget::Dir(Direction::Right), Word::new(5))));
    assert_eq!(n.activity, Activity::Write);
    assert_eq!(n.ip, 0, "ip does not advance while the write is pending");

    // Not drained yet: stays blocked.
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 0);
    assert_eq!(n.activity, Activity::Write);

    // Simulate a neighbor consuming the pending write.
    pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.ip, 0, "single-instruction program wraps back to 0 once drained");
    assert_eq!(n.activity, Activity::Run);
}

#[test]
fn mov_from_spatial_port_blocks_until_read_resolved() {
    let mut n = node(vec![Instruction::new(Opcode::Mov { src: Operand::Port(Port::Dir(Direction::Up)), dst: Port::Acc })]);
    let mut pending = None;

    n.step(0, 0, &mut pending, None);
    assert_eq!(n.activity, Activity::Read);
    assert_eq!(n.acc, Word::ZERO, "acc untouched until the read resolves");

    n.on_read_resolved(Word::new(8), Direction::Up);
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::new(8));
}

#[test]
fn reading_last_before_any_succeeded_yields_zero_immediately() {
    // Open question 1: the reference yields 0 immediately rather than
    // blocking when `last` has never been set.
    let mut n = node(vec![Instruction::new(Opcode::Add(Operand::Port(Port::Last)))]);
    n.acc = Word::new(5);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::new(5), "adding the unset `last` is a no-op, not a block");
    assert_eq!(n.activity, Activity::Run);
}

#[test]
fn reading_last_once_set_blocks_on_that_spatial_direction() {
    let mut n = node(vec![Instruction::new(Opcode::Add(Operand::Port(Port::Last)))]);
    let mut pending = None;
    n.step(0, 0, &mut pending, Some(Direction::Left));
    assert_eq!(n.activity, Activity::Read, "blocks on the remembered direction");
}

#[test]
fn nil_reads_zero_and_writes_are_discarded_instantly() {
    let mut n = node(vec![
        Instruction::new(Opcode::Mov { src: Operand::Port(Port::Nil), dst: Port::Acc }),
        Instruction::new(Opcode::Mov { src: Operand::Immediate(Word::new(1)), dst: Port::Nil }),
    ]);
    n.acc = Word::new(99);
    let mut pending = None;
    n.step(0, 0, &mut pending, None);
    assert_eq!(n.acc, Word::ZERO);
    n.step(0, 0, &mut pending, None);
    assert!(pending.is_none(), "writes to nil never block");
}
