//! CIRC — the LUT-circuit data model.
//!
//! A directed acyclic netlist of LUT nodes: primary inputs, primary outputs,
//! and internal gates each carrying a hex truth table and a structural
//! matrix. Edges are plain `(NodeId, bool)` pairs into a dense node arena —
//! never owning references — so the DAG can't accidentally become cyclic
//! through Rust's ownership graph itself; [`Circuit::update_levels`] is what
//! actually checks for cycles in the *logical* graph.

use std::collections::HashMap;

use crate::matrix::Matrix;
use crate::truth::{self, TruthError};

/// A dense, stable node identifier. Ids are `0..Circuit::node_count()`.
pub type NodeId = u32;

/// Errors raised while building or analyzing a circuit.
#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    /// A node's truth-table hex failed to parse for its declared fan-in count.
    #[error("bad truth table for node {name:?}: {source}")]
    BadTruthTable { name: String, #[source] source: TruthError },
    /// `update_levels` found a cycle reachable from some node.
    #[error("cycle detected at node {0}")]
    CycleDetected(NodeId),
}

/// An edge into the dense node arena. `complemented` is reserved (always
/// `false` today) per the data model's note that edges may later carry a
/// complement bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// The node this edge points to.
    pub target: NodeId,
    /// Reserved complement bit; unused by any operation in this crate.
    pub complemented: bool,
}

/// One circuit node: a primary input, a primary output, an internal LUT
/// gate, or a pass-through node that is both PI and PO.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: String,
    is_pi: bool,
    is_po: bool,
    tt_hex: String,
    matrix: Option<Matrix>,
    /// Inputs in *internal* order — reversed relative to how they were
    /// declared in `create_node`. See that function's doc comment.
    inputs: Vec<Edge>,
    fanout: Vec<NodeId>,
    level: Option<u32>,
}

impl Node {
    /// Stable node id.
    pub fn id(&self) -> NodeId {
        self.id
    }
    /// Declared or synthesized node name.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Whether this node is a primary input.
    pub fn is_pi(&self) -> bool {
        self.is_pi
    }
    /// Whether this node is a primary output.
    pub fn is_po(&self) -> bool {
        self.is_po
    }
    /// Hex truth table as declared (empty for PIs).
    pub fn tt_hex(&self) -> &str {
        &self.tt_hex
    }
    /// The node's structural matrix (`None` for PIs and for placeholders
    /// not yet defined by a `create_node` call).
    pub fn matrix(&self) -> Option<&Matrix> {
        self.matrix.as_ref()
    }
    /// Inputs in internal (reversed) order.
    pub fn inputs(&self) -> &[Edge] {
        &self.inputs
    }
    /// Nodes that consume this node as an input (unordered by convention).
    pub fn fanout(&self) -> &[NodeId] {
        &self.fanout
    }
    /// Memoized level, once `update_levels` has run.
    pub fn level(&self) -> Option<u32> {
        self.level
    }
}

/// `(Nodes, Inputs, Outputs, NameIndex)`: a LUT-circuit netlist.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    nodes: Vec<Node>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    name_index: HashMap<String, NodeId>,
}

impl Circuit {
    /// A fresh, empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes, dense by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Primary input ids, in declaration order.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Primary output ids, in declaration order.
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Looks a node up by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    fn ensure_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.name_index.get(name) {
            return id;
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            id,
            name: name.to_string(),
            is_pi: false,
            is_po: false,
            tt_hex: String::new(),
            matrix: None,
            inputs: Vec::new(),
            fanout: Vec::new(),
            level: None,
        });
        self.name_index.insert(name.to_string(), id);
        id
    }

    /// Declares (or re-references) a primary input. Idempotent on name.
    pub fn create_pi(&mut self, name: &str) -> NodeId {
        let id = self.ensure_node(name);
        if !self.nodes[id as usize].is_pi {
            self.nodes[id as usize].is_pi = true;
            self.inputs.push(id);
        }
        id
    }

    /// Declares (or re-references) a primary output. Idempotent on name. A
    /// node may be both PI and PO (a pass-through).
    pub fn create_po(&mut self, name: &str) -> NodeId {
        let id = self.ensure_node(name);
        if !self.nodes[id as usize].is_po {
            self.nodes[id as usize].is_po = true;
            self.outputs.push(id);
        }
        id
    }

    /// Declares an internal LUT gate: `output_name = LUT tt_hex(input_names...)`.
    ///
    /// Input names are resolved to ids in listed order (creating placeholder
    /// nodes for any name not yet seen), but the *stored* input edge list is
    /// the reverse of that order — this is the load-bearing MSB-first
    /// convention the structural matrix encoding depends on.
    pub fn create_node(
        &mut self,
        tt_hex: &str,
        input_names: &[&str],
        output_name: &str,
    ) -> Result<NodeId, CircuitError> {
        let input_ids: Vec<NodeId> = input_names.iter().map(|n| self.ensure_node(n)).collect();
        let output = self.ensure_node(output_name);

        let bits = truth::hex_to_bits(tt_hex, input_names.len()).map_err(|e| {
            CircuitError::BadTruthTable { name: output_name.to_string(), source: e }
        })?;
        let matrix = structural_matrix(&bits);

        {
            let node = &mut self.nodes[output as usize];
            node.tt_hex = tt_hex.to_string();
            node.matrix = Some(matrix);
        }

        for &input in input_ids.iter().rev() {
            self.nodes[output as usize].inputs.push(Edge { target: input, complemented: false });
            self.nodes[input as usize].fanout.push(output);
        }

        Ok(output)
    }

    /// Computes `level(n) = 0` for PIs, else `1 + max(level(child))`, with
    /// memoization. Detects cycles.
    pub fn update_levels(&mut self) -> Result<(), CircuitError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }
        let n = self.nodes.len();
        let mut marks = vec![Mark::Unvisited; n];
        let mut stack: Vec<(NodeId, usize)> = Vec::new();

        for start in 0..n as NodeId {
            if marks[start as usize] != Mark::Unvisited {
                continue;
            }
            stack.push((start, 0));
            while let Some(&(id, child_idx)) = stack.last() {
                if child_idx == 0 {
                    marks[id as usize] = Mark::InProgress;
                }
                let inputs_len = self.nodes[id as usize].inputs.len();
                if self.nodes[id as usize].is_pi || inputs_len == 0 {
                    self.nodes[id as usize].level = Some(0);
                    marks[id as usize] = Mark::Done;
                    stack.pop();
                    continue;
                }
                if child_idx < inputs_len {
                    let child = self.nodes[id as usize].inputs[child_idx].target;
                    stack.last_mut().unwrap().1 += 1;
                    match marks[child as usize] {
                        Mark::Unvisited => stack.push((child, 0)),
                        Mark::InProgress => return Err(CircuitError::CycleDetected(child)),
                        Mark::Done => {}
                    }
                } else {
                    let max_child_level = self.nodes[id as usize]
                        .inputs
                        .iter()
                        .map(|e| self.nodes[e.target as usize].level.unwrap_or(0))
                        .max()
                        .unwrap_or(0);
                    self.nodes[id as usize].level = Some(1 + max_child_level);
                    marks[id as usize] = Mark::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

/// The 2×2ⁿ structural matrix of an n-input LUT: column `i` is `[1,0]^T` if
/// `bits[i]` is set, else `[0,1]^T`.
pub fn structural_matrix(bits: &[bool]) -> Matrix {
    let mut m = Matrix::zeros(2, bits.len());
    for (i, &b) in bits.iter().enumerate() {
        if b {
            m.set(0, i, 1);
        } else {
            m.set(1, i, 1);
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pi_and_po_are_idempotent() {
        let mut c = Circuit::new();
        let a1 = c.create_pi("a");
        let a2 = c.create_pi("a");
        assert_eq!(a1, a2);
        assert_eq!(c.inputs(), &[a1]);
    }

    #[test]
    fn create_node_reverses_internal_input_order() {
        let mut c = Circuit::new();
        c.create_pi("a");
        c.create_pi("b");
        let g = c.create_node("8", &["a", "b"], "g").unwrap();
        let internal: Vec<NodeId> = c.node(g).inputs().iter().map(|e| e.target).collect();
        let a = *c.nodes().iter().find(|n| n.name() == "a").map(|n| &n.id()).unwrap();
        let b = *c.nodes().iter().find(|n| n.name() == "b").map(|n| &n.id()).unwrap();
        assert_eq!(internal, vec![b, a]);
    }

    #[test]
    fn levels_follow_longest_path_from_pi() {
        let mut c = Circuit::new();
        c.create_pi("a");
        c.create_pi("b");
        c.create_pi("d");
        let g = c.create_node("8", &["a", "b"], "g").unwrap();
        c.create_node("8", &["g", "d"], "h").unwrap();
        c.update_levels().unwrap();
        assert_eq!(c.node(g).level(), Some(1));
        let h = c.nodes().iter().find(|n| n.name() == "h").unwrap();
        assert_eq!(h.level(), Some(2));
    }

    #[test]
    fn bad_hex_length_is_rejected() {
        let mut c = Circuit::new();
        c.create_pi("a");
        c.create_pi("b");
        assert!(c.create_node("", &["a", "b"], "g").is_err());
    }
}
