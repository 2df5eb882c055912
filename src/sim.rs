//! SIM — exhaustive simulator with cone-cutting.
//!
//! Evaluating every node's structural matrix against every `2^n` pattern
//! one node at a time is correct but explodes matrix sizes for deep
//! circuits. Instead, nodes are grouped into "boundaries" — primary
//! outputs and any node with more than one consumer — and each boundary's
//! cone is folded through CHAIN once into a single small truth table,
//! reused across all `2^n` patterns.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::chain::{self, ChainError, Token};
use crate::circuit::{Circuit, NodeId};
use crate::config::SimConfig;
use crate::matrix::ChainMethod;

/// Errors raised while simulating a circuit.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// More primary inputs than the simulator can exhaustively enumerate.
    #[error("simulator supports at most 30 primary inputs, got {0}")]
    TooManyInputs(usize),
    /// CHAIN rejected a cone's token sequence.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Runs exhaustive simulation and returns, for every primary output in
/// declaration order, its canonical `2^n`-length truth-table string.
pub fn simulate(
    circuit: &mut Circuit,
    config: SimConfig,
    method: ChainMethod,
) -> Result<Vec<(NodeId, String)>, SimError> {
    let n = circuit.inputs().len();
    if n > 30 {
        return Err(SimError::TooManyInputs(n));
    }
    circuit.update_levels().expect("circuit must be acyclic by the time it reaches SIM");

    let boundaries = discover_boundaries(circuit, config.cone_limit);
    tracing::debug!(inputs = n, boundaries = boundaries.len(), cone_limit = config.cone_limit, "simulation boundaries discovered");

    let num_patterns = 1usize << n;
    let mut values: HashMap<NodeId, Vec<bool>> = HashMap::new();
    for &pi in circuit.inputs() {
        values.insert(pi, Vec::with_capacity(num_patterns));
    }
    for pattern in (0..num_patterns as u32).rev() {
        for (k, &pi) in circuit.inputs().iter().enumerate() {
            values.get_mut(&pi).unwrap().push((pattern >> k) & 1 != 0);
        }
    }

    let mut computable: Vec<NodeId> = boundaries
        .iter()
        .copied()
        .filter(|&id| !circuit.node(id).is_pi())
        .collect();
    computable.sort_by_key(|&id| circuit.node(id).level().unwrap_or(0));

    for node_id in computable {
        let (tokens, var_order) = cone_tokens(circuit, &boundaries, node_id);
        let matrix = chain::normalize(&tokens, method)?;
        let bits = 1usize << var_order.len();
        let mut out = Vec::with_capacity(num_patterns);
        for pattern_idx in 0..num_patterns {
            let mut idx = 0usize;
            for &var_node in &var_order {
                let bit = values[&var_node][pattern_idx] as usize;
                idx = (idx << 1) + bit;
            }
            out.push(matrix.get(0, bits - idx - 1) != 0);
        }
        values.insert(node_id, out);
    }

    Ok(circuit
        .outputs()
        .iter()
        .map(|&po| {
            let bits = &values[&po];
            let tt: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
            (po, tt)
        })
        .collect())
}

/// Primary outputs, nodes with more than one consumer, and primary inputs
/// are always boundaries. Growing each non-PI boundary's cone under the
/// fan-in budget discovers further boundaries; this repeats to a fixed
/// point since a newly discovered boundary's own cone may uncover more.
fn discover_boundaries(circuit: &Circuit, limit: u32) -> HashSet<NodeId> {
    let mut boundaries: HashSet<NodeId> = HashSet::new();
    for &pi in circuit.inputs() {
        boundaries.insert(pi);
    }
    for node in circuit.nodes() {
        if node.is_po() || node.fanout().len() > 1 {
            boundaries.insert(node.id());
        }
    }

    let mut frontier: Vec<NodeId> = boundaries
        .iter()
        .copied()
        .filter(|&id| !circuit.node(id).is_pi())
        .collect();
    let mut processed: HashSet<NodeId> = HashSet::new();
    while let Some(root) = frontier.pop() {
        if !processed.insert(root) {
            continue;
        }
        for discovered in grow_cone(circuit, root, limit, &boundaries) {
            if boundaries.insert(discovered) {
                frontier.push(discovered);
            }
        }
    }
    boundaries
}

/// Breadth-first cone growth from `root`'s own inputs, stopping a branch
/// either at an existing boundary or once admitting a node would push the
/// cone's total fan-in past `limit`. Nodes where growth stops for the
/// latter reason are reported as newly discovered boundaries.
fn grow_cone(circuit: &Circuit, root: NodeId, limit: u32, boundaries: &HashSet<NodeId>) -> Vec<NodeId> {
    let mut new_boundaries = Vec::new();
    let mut queue: VecDeque<NodeId> = circuit.node(root).inputs().iter().map(|e| e.target).collect();
    let mut fanin = 0u32;
    while let Some(id) = queue.pop_front() {
        if boundaries.contains(&id) {
            continue;
        }
        let fanin_here = circuit.node(id).inputs().len() as u32;
        if fanin + fanin_here > limit {
            new_boundaries.push(id);
            continue;
        }
        fanin += fanin_here;
        for edge in circuit.node(id).inputs() {
            queue.push_back(edge.target);
        }
    }
    new_boundaries
}

/// Preorder token sequence for the cone rooted at `root`, down to (but not
/// through) the nearest boundary on every branch. Boundary nodes other than
/// `root` itself become `Var` tokens, numbered by first encounter within
/// this cone; `var_order[ordinal - 1]` is that variable's node id.
fn cone_tokens(circuit: &Circuit, boundaries: &HashSet<NodeId>, root: NodeId) -> (Vec<Token>, Vec<NodeId>) {
    let mut tokens = Vec::new();
    let mut var_order: Vec<NodeId> = Vec::new();
    let mut var_index: HashMap<NodeId, u32> = HashMap::new();
    let mut stack = vec![(root, true)];
    while let Some((id, is_root)) = stack.pop() {
        if !is_root && boundaries.contains(&id) {
            let ordinal = *var_index.entry(id).or_insert_with(|| {
                var_order.push(id);
                var_order.len() as u32
            });
            tokens.push(Token::Var(ordinal));
            continue;
        }
        let node = circuit.node(id);
        tokens.push(Token::Op(node.matrix().expect("cone node missing structural matrix").clone()));
        for edge in node.inputs().iter().rev() {
            stack.push((edge.target, false));
        }
    }
    (tokens, var_order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_and_or_not() -> Circuit {
        // f = (a & b) | (a & ~c) | (~b & ~c), matching the NORM worked scenario.
        let mut c = Circuit::new();
        c.create_pi("c");
        c.create_pi("b");
        c.create_pi("a");
        c.create_node("1", &["b"], "not_b").unwrap();
        c.create_node("1", &["c"], "not_c").unwrap();
        c.create_node("8", &["a", "b"], "ab").unwrap();
        c.create_node("8", &["a", "not_c"], "anc").unwrap();
        c.create_node("8", &["not_b", "not_c"], "nbnc").unwrap();
        c.create_node("e", &["ab", "anc"], "ab_or_anc").unwrap();
        c.create_node("e", &["ab_or_anc", "nbnc"], "f").unwrap();
        c.create_po("f");
        c
    }

    #[test]
    fn small_circuit_simulates_without_cone_cutting() {
        let mut c = build_and_or_not();
        let result = simulate(&mut c, SimConfig { cone_limit: 6 }, ChainMethod::DynamicProgramming).unwrap();
        assert_eq!(result.len(), 1);
        let hex = crate::truth::bits_to_hex(&crate::truth::parse_binary(&result[0].1).unwrap());
        assert_eq!(hex.to_uppercase(), "8B");
    }

    #[test]
    fn tight_cone_limit_forces_boundary_splitting() {
        let mut c = build_and_or_not();
        let result = simulate(&mut c, SimConfig { cone_limit: 1 }, ChainMethod::DynamicProgramming).unwrap();
        let hex = crate::truth::bits_to_hex(&crate::truth::parse_binary(&result[0].1).unwrap());
        assert_eq!(hex.to_uppercase(), "8B");
    }

    #[test]
    fn fanout_greater_than_one_becomes_a_boundary() {
        let mut c = Circuit::new();
        c.create_pi("a");
        c.create_pi("b");
        let g = c.create_node("8", &["a", "b"], "g").unwrap();
        c.create_node("1", &["g"], "h1").unwrap();
        c.create_node("e", &["g", "a"], "h2").unwrap();
        c.create_po("h1");
        c.create_po("h2");
        c.update_levels().unwrap();
        let boundaries = discover_boundaries(&c, 6);
        assert!(boundaries.contains(&g));
    }

    #[test]
    fn too_many_inputs_is_rejected() {
        let mut c = Circuit::new();
        for i in 0..31 {
            c.create_pi(&format!("x{i}"));
        }
        let err = simulate(&mut c, SimConfig::default(), ChainMethod::Sequence).unwrap_err();
        assert!(matches!(err, SimError::TooManyInputs(31)));
    }
}
