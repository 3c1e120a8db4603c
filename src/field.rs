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

//! The field: topology, neighbor wiring and the two-phase cycle driver.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::image::ImageNode;
use crate::io_nodes::{InputNode, OutputNode};
use crate::layout::{CellKind, LayoutSpec, OutputSpec};
use crate::node::{Activity, FieldNode, HaltSignal, NodeId, NodeKind, NodeType, Neighbors};
use crate::port::{Direction, ReadIntent, WriteTarget};
use crate::t21::T21Node;
use crate::t30::T30Node;
use crate::word::Word;

/// The grid plus attached I/O nodes, and the cycle scheduler that drives
/// them. Owns every node; neighbor links are arena indices scoped to this
/// field (see `DESIGN.md` for why this replaces pointer back-references).
#[derive(Debug, PartialEq, Eq)]
pub struct Field {
    nodes: Vec<FieldNode>,
    width: usize,
    in_nodes_offset: usize,
    out_nodes_offset: usize,
    nodes_to_sim: Vec<NodeId>,
    halt: Option<HaltSignal>,
}

struct ReadMatch {
    writer: NodeId,
    reader: NodeId,
    reader_dir: Direction,
    value: Word,
}

impl Field {
    /// Builds a field from a layout description and wires its topology.
    pub fn new(spec: &LayoutSpec) -> Field {
        let mut nodes = Vec::with_capacity(spec.cells.len() + spec.inputs.len() + spec.outputs.len());

        for y in 0..spec.height {
            for x in 0..spec.width {
                let kind = match spec.cell(x, y) {
                    CellKind::Damaged => NodeKind::Damaged,
                    CellKind::T21(program, labels) => {
                        NodeKind::T21(T21Node::new(program.clone(), labels.clone()))
                    }
                    CellKind::T30 => NodeKind::T30(T30Node::new(spec.t30_capacity)),
                };
                nodes.push(FieldNode::new(x as i32, y as i32, kind));
            }
        }

        let in_nodes_offset = nodes.len();
        for input in &spec.inputs {
            let kind = NodeKind::Input(InputNode::new(input.values.clone()));
            nodes.push(FieldNode::new(input.column as i32, -1, kind));
        }

        let out_nodes_offset = nodes.len();
        for output in &spec.outputs {
            match output {
                OutputSpec::Numeric { column, expected } => {
                    let kind = NodeKind::Output(OutputNode::new(expected.clone()));
                    nodes.push(FieldNode::new(*column as i32, spec.height as i32, kind));
                }
                OutputSpec::Image { column, width, height, expected } => {
                    let kind = NodeKind::Image(ImageNode::new(*width, *height, expected.clone()));
                    nodes.push(FieldNode::new(*column as i32, spec.height as i32, kind));
                }
            }
        }

        let mut field = Field {
            nodes,
            width: spec.width,
            in_nodes_offset,
            out_nodes_offset,
            nodes_to_sim: Vec::new(),
            halt: None,
        };
        field.finalize();
        field
    }

    fn height(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.in_nodes_offset / self.width
        }
    }

    fn grid_lookup(&self, x: i32, y: i32) -> Option<NodeId> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height() {
            return None;
        }
        Some(NodeId(y as usize * self.width + x as usize))
    }

    /// Wires spatial neighbors, the I/O attachment edges, nulls out inert
    /// links, and recomputes the simulation set. Idempotent (testable
    /// property 5): running it again on an already-finalized field
    /// reproduces the same graph.
    pub fn finalize(&mut self) {
        for y in 0..self.height() {
            for x in 0..self.width {
                let idx = y * self.width + x;
                if self.nodes[idx].kind.is_inert() {
                    continue;
                }
                let (xi, yi) = (x as i32, y as i32);
                let neighbors = Neighbors {
                    left: self.grid_lookup(xi - 1, yi),
                    right: self.grid_lookup(xi + 1, yi),
                    up: self.grid_lookup(xi, yi - 1),
                    down: self.grid_lookup(xi, yi + 1),
                };
                self.nodes[idx].neighbors = neighbors;
            }
        }

        for i in self.in_nodes_offset..self.out_nodes_offset {
            let x = self.nodes[i].x;
            let Some(cell) = self.grid_lookup(x, 0) else { continue };
            self.nodes[i].neighbors.down = Some(cell);
            self.nodes[cell.0].neighbors.up = Some(NodeId(i));
        }

        for i in self.out_nodes_offset..self.nodes.len() {
            let x = self.nodes[i].x;
            let Some(cell) = self.grid_lookup(x, self.height() as i32 - 1) else { continue };
            self.nodes[i].neighbors.up = Some(cell);
            self.nodes[cell.0].neighbors.down = Some(NodeId(i));
        }

        for i in 0..self.nodes.len() {
            for d in Direction::PRIORITY {
                let nb = self.nodes[i].neighbors.get(d);
                if let Some(nb) = nb {
                    if self.nodes[nb.0].kind.is_inert() {
                        self.nodes[i].neighbors.set(d, None);
                    }
                }
            }
        }

        self.nodes_to_sim.clear();
        for i in 0..self.nodes.len() {
            let connected = Direction::PRIORITY.iter().any(|&d| self.nodes[i].neighbors.get(d).is_some());
            let has_hcf = matches!(&self.nodes[i].kind, NodeKind::T21(t) if t.has_hcf());
            if connected || has_hcf {
                self.nodes_to_sim.push(NodeId(i));
            }
        }
    }

    /// Advances the field by one cycle: a read phase that resolves every
    /// rendezvous from pre-cycle state alone, then a step phase in which
    /// every simulated node advances its own state.
    ///
    /// The read phase itself runs in two sub-passes so a T30 that is both
    /// pushed to and popped from in the same cycle resolves correctly
    /// (§4.3): pushes into a T30 commit first, so a same-cycle pop observes
    /// the freshly pushed top rather than the value that was on top before
    /// this cycle began.
    pub fn step(&mut self) {
        if self.halt.is_some() {
            return;
        }

        // Sorted into canonical (row-major grid, then I/O in column order)
        // index order regardless of how `nodes_to_sim` happens to be
        // ordered, so every pass below is independent of simulation-set
        // iteration order (testable property 2).
        let mut sim = self.nodes_to_sim.clone();
        sim.sort_by_key(|id| id.0);

        let intents: HashMap<NodeId, ReadIntent> =
            sim.iter().map(|&id| (id, self.nodes[id.0].read_intent())).collect();
        let any_reservation = self.reserve_any_writes(&sim, &intents);

        let t30_pushes = self.resolve_matches(&sim, &intents, &any_reservation, |node| {
            matches!(node.kind, NodeKind::T30(_))
        });
        self.commit_matches(&t30_pushes);

        let rest = self.resolve_matches(&sim, &intents, &any_reservation, |node| {
            !matches!(node.kind, NodeKind::T30(_))
        });
        self.commit_matches(&rest);

        for id in sim {
            if let Some(sig) = self.nodes[id.0].step() {
                if self.halt.is_none() {
                    self.halt = Some(sig);
                }
            }
        }
    }

    /// Writer-priority reservation of `any`-writes among compatible readers
    /// (spec rule 3), walked in `sim`'s (canonical) order so the result
    /// cannot depend on simulation-set iteration order.
    fn reserve_any_writes(
        &self,
        sim: &[NodeId],
        intents: &HashMap<NodeId, ReadIntent>,
    ) -> HashMap<NodeId, NodeId> {
        let mut any_reservation: HashMap<NodeId, NodeId> = HashMap::new();
        for &writer_id in sim {
            let is_any_write =
                matches!(self.nodes[writer_id.0].pending_write, Some((WriteTarget::Any, _)));
            if !is_any_write {
                continue;
            }
            for d in Direction::PRIORITY {
                let Some(nb_id) = self.nodes[writer_id.0].neighbors.get(d) else { continue };
                let accepts = match intents.get(&nb_id).copied().unwrap_or(ReadIntent::None) {
                    // `rd` is the neighbor's own read direction; it must
                    // point back at this writer, i.e. be `d`'s opposite.
                    ReadIntent::Direct(rd) => rd == d.opposite(),
                    ReadIntent::AnyScan => true,
                    ReadIntent::None => false,
                };
                let already_claimed = any_reservation.values().any(|r| *r == nb_id);
                if accepts && !already_claimed {
                    any_reservation.insert(writer_id, nb_id);
                    break;
                }
            }
        }
        any_reservation
    }

    /// Reader-priority resolution against the reservations above (spec rule
    /// 2), restricted to readers for which `reader_filter` holds. Called
    /// once for T30 readers (a push) and once for everything else, so a
    /// push into a T30 is fully committed (see `commit_matches`) before any
    /// same-cycle pop from that T30 is resolved.
    fn resolve_matches(
        &self,
        sim: &[NodeId],
        intents: &HashMap<NodeId, ReadIntent>,
        any_reservation: &HashMap<NodeId, NodeId>,
        reader_filter: impl Fn(&FieldNode) -> bool,
    ) -> Vec<ReadMatch> {
        let mut matches = Vec::new();
        for &reader_id in sim {
            if !reader_filter(&self.nodes[reader_id.0]) {
                continue;
            }
            let dirs: Vec<Direction> = match intents[&reader_id] {
                ReadIntent::None => continue,
                ReadIntent::Direct(d) => vec![d],
                ReadIntent::AnyScan => Direction::PRIORITY.to_vec(),
            };
            for d in dirs {
                if let Some(m) = self.try_match_direction(reader_id, d, any_reservation) {
                    matches.push(m);
                    break;
                }
            }
        }
        matches
    }

    fn commit_matches(&mut self, matches: &[ReadMatch]) {
        for m in matches {
            self.nodes[m.reader.0].on_read_resolved(m.value, m.reader_dir);
        }
        for m in matches {
            let writer_dir = m.reader_dir.opposite();
            let target = self.nodes[m.writer.0]
                .pending_write
                .map(|(t, _)| t)
                .unwrap_or(WriteTarget::Dir(writer_dir));
            self.nodes[m.writer.0].on_write_consumed(target, writer_dir);
        }
    }

    fn try_match_direction(
        &self,
        reader_id: NodeId,
        d: Direction,
        any_reservation: &HashMap<NodeId, NodeId>,
    ) -> Option<ReadMatch> {
        let writer_id = self.nodes[reader_id.0].neighbors.get(d)?;
        let (target, value) = self.nodes[writer_id.0].pending_write?;
        let writer_to_reader = d.opposite();
        let ok = match target {
            WriteTarget::Dir(wd) => wd == writer_to_reader,
            WriteTarget::Any => any_reservation.get(&writer_id) == Some(&reader_id),
        };
        ok.then_some(ReadMatch { writer: writer_id, reader: reader_id, reader_dir: d, value })
    }

    /// The field is active while any numeric output still needs values and
    /// no `hcf` has fired. A field with no numeric outputs at all (e.g. an
    /// image-only level) never self-terminates this way; the driver's
    /// cycle budget is what bounds it.
    pub fn active(&self) -> bool {
        if self.halt.is_some() {
            return false;
        }
        let mut any_numeric = false;
        for n in &self.nodes[self.out_nodes_offset..] {
            if let NodeKind::Output(o) = &n.kind {
                any_numeric = true;
                if !o.complete() {
                    return true;
                }
            }
        }
        !any_numeric
    }

    pub fn halt(&self) -> Option<&HaltSignal> {
        self.halt.as_ref()
    }

    /// Crate-internal white-box access to a node's full state, by grid
    /// coordinate (row-major; I/O nodes aren't reachable this way). Used by
    /// `src/tests` the same way `mc6809-core`'s tests reach into `cpu.reg`
    /// directly rather than through a public accessor.
    #[cfg(test)]
    pub(crate) fn node_at(&self, x: usize, y: usize) -> &FieldNode {
        &self.nodes[y * self.width + x]
    }

    #[cfg(test)]
    pub(crate) fn input_node(&self, index: usize) -> &FieldNode {
        &self.nodes[self.in_nodes_offset + index]
    }

    #[cfg(test)]
    pub(crate) fn output_node(&self, index: usize) -> &FieldNode {
        &self.nodes[self.out_nodes_offset + index]
    }

    /// Reverses the recorded simulation-set order in place. `step` sorts
    /// into canonical order internally regardless, so this exists purely
    /// to let tests prove that reordering `nodes_to_sim` has no effect on
    /// the result (testable property 2).
    #[cfg(test)]
    pub(crate) fn reverse_sim_order(&mut self) {
        self.nodes_to_sim.reverse();
    }

    /// Total instruction count across all T21s.
    pub fn instructions(&self) -> usize {
        self.nodes[..self.in_nodes_offset]
            .iter()
            .filter_map(|n| match &n.kind {
                NodeKind::T21(t) => Some(t.program.len()),
                _ => None,
            })
            .sum()
    }

    /// Count of T21s with a non-empty program.
    pub fn nodes_used(&self) -> usize {
        self.nodes[..self.in_nodes_offset]
            .iter()
            .filter(|n| matches!(&n.kind, NodeKind::T21(t) if !t.program.is_empty()))
            .count()
    }

    /// Canonical textual dump of geometry and I/O attachments (§6).
    pub fn layout(&self) -> String {
        let h = self.height();
        let mut out = format!("{} {}\n", self.width, h);
        for y in 0..h {
            for x in 0..self.width {
                let c = match self.nodes[y * self.width + x].kind.type_tag() {
                    NodeType::Damaged => 'D',
                    NodeType::T21 => 'C',
                    NodeType::T30 => 'S',
                    _ => unreachable!("grid cells are only damaged/T21/T30"),
                };
                out.push(c);
            }
            out.push('\n');
        }

        for n in &self.nodes[self.in_nodes_offset..] {
            match &n.kind {
                NodeKind::Input(input) => {
                    let _ = write!(out, "I{}", n.x);
                    if !input.values.is_empty() {
                        let vals: Vec<String> = input.values.iter().map(|v| v.to_string()).collect();
                        let _ = write!(out, " [{}]", vals.join(", "));
                    }
                    out.push(' ');
                }
                NodeKind::Output(output) => {
                    let _ = write!(out, "O{}", n.x);
                    if !output.expected.is_empty() {
                        let vals: Vec<String> = output.expected.iter().map(|v| v.to_string()).collect();
                        let _ = write!(out, " [{}]", vals.join(", "));
                    }
                    out.push(' ');
                }
                NodeKind::Image(image) => {
                    let _ = write!(out, "V{} {},{}", n.x, image.width(), image.height());
                    if !image.expected.blank() {
                        let _ = write!(out, " [{}]", image.expected.write_text());
                    }
                    out.push(' ');
                }
                _ => unreachable!("I/O region is only input/output/image"),
            }
        }

        out
    }

    /// Human-readable dump of every node's registers, `ip`, and activity.
    /// For logging only; not parsed back.
    pub fn state(&self) -> String {
        let mut out = String::new();
        for n in &self.nodes {
            match &n.kind {
                NodeKind::T21(t) => {
                    let _ = writeln!(
                        out,
                        "T21({},{}): acc={} bak={} ip={} activity={}",
                        n.x,
                        n.y,
                        t.acc,
                        t.bak,
                        t.ip,
                        activity_name(t.activity)
                    );
                }
                NodeKind::T30(t) => {
                    let _ = writeln!(out, "T30({},{}): len={}/{}", n.x, n.y, t.len(), t.capacity);
                }
                NodeKind::Output(o) => {
                    let _ = writeln!(
                        out,
                        "Output({},{}): received={}/{} wrong={}",
                        n.x,
                        n.y,
                        o.received.len(),
                        o.expected.len(),
                        o.wrong()
                    );
                }
                _ => {}
            }
        }
        out
    }
}

fn activity_name(a: Activity) -> &'static str {
    match a {
        Activity::Idle => "idle",
        Activity::Run => "run",
        Activity::Read => "read",
        Activity::Write => "write",
    }
}

impl Clone for Field {
    /// Deep-copies every node and re-runs finalization, producing an
    /// independent replica (testable property 3: stepping one never
    /// affects the other).
    fn clone(&self) -> Self {
        let mut ret = Field {
            nodes: self.nodes.clone(),
            width: self.width,
            in_nodes_offset: self.in_nodes_offset,
            out_nodes_offset: self.out_nodes_offset,
            nodes_to_sim: Vec::new(),
            halt: self.halt,
        };
        ret.finalize();
        ret
    }
}
