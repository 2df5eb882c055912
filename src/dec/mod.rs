//! DEC — functional decomposer.
//!
//! Turns a truth-table string into a DAG of small LUTs (ideally all
//! 2-input) via several interchangeable strategies — STP-DSD, Strong DSD,
//! Mixed, bi-decomposition, a 6-LUT hybrid, and a Shannon/exact-synthesis
//! fallback — then hands the DAG to [`crate::bench`] for BENCH emission.
//!
//! Structural hashing is owned by an explicit [`DecompositionSession`]
//! rather than the reference implementation's process-wide globals: the
//! node list, the `(func, children) -> id` hash, and the leaf-variable
//! cache all live on one value that a caller resets between independent
//! runs, so two decompositions never cross-contaminate each other's ids.

pub mod bidec;
pub mod dsd;
pub mod exact;
pub mod hybrid66;
pub mod mixed;
pub mod resyn;
pub mod strong_dsd;

use std::collections::HashMap;

use crate::circuit::{Circuit, CircuitError, NodeId as CircuitNodeId};
use crate::config::{DecConfig, DecompositionMode, Fallback};
use crate::truth::{self, TruthError};

/// A node id local to a single [`DecompositionSession`].
pub type DecNodeId = u32;

/// Errors raised while decomposing a truth table.
#[derive(Debug, thiserror::Error)]
pub enum DecError {
    /// The function has more variables than any mode here supports.
    #[error("truth table has {0} variables, which exceeds the supported size")]
    UnsupportedSize(usize),
    /// No decomposition strategy could make progress on an `n`-variable residue.
    #[error("no decomposition found for a {n}-variable residue")]
    DecompositionFailed {
        /// Residue variable count at the point of failure.
        n: usize,
    },
    /// A truth-table string failed to parse.
    #[error(transparent)]
    Truth(#[from] TruthError),
    /// The output circuit model rejected an emitted node.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    /// The input BENCH netlist (for `lut_resyn`) failed to parse.
    #[error(transparent)]
    Bench(#[from] crate::bench::BenchError),
}

/// One node in a decomposition DAG: a leaf referencing an input variable,
/// a constant (empty `func` is never used; constants carry a 1-bit `func`
/// and no children), or a gate with a binary truth table (a `{'0','1'}`
/// string, MSB-first) over its children — also MSB-first, matching the
/// external convention [`crate::circuit::Circuit::create_node`] expects
/// before its own internal reversal.
#[derive(Debug, Clone)]
pub struct DecNode {
    id: DecNodeId,
    func: String,
    children: Vec<DecNodeId>,
    var: Option<u32>,
}

impl DecNode {
    /// This node's id.
    pub fn id(&self) -> DecNodeId {
        self.id
    }
    /// The node's truth table as a binary string (empty for a leaf).
    pub fn func(&self) -> &str {
        &self.func
    }
    /// Children, MSB-first (empty for a leaf or constant).
    pub fn children(&self) -> &[DecNodeId] {
        &self.children
    }
    /// `Some(v)` if this is a leaf for input variable `v` (1-based, 1 = MSB).
    pub fn var(&self) -> Option<u32> {
        self.var
    }
}

/// Owns a decomposition run's structural-hash map, node arena, and
/// leaf-variable cache — the explicit replacement for the reference
/// implementation's `NODE_HASH`/`NODE_LIST`/`INPUT_NODE_CACHE` globals.
#[derive(Debug, Default)]
pub struct DecompositionSession {
    nodes: Vec<DecNode>,
    hash: HashMap<(String, Vec<DecNodeId>), DecNodeId>,
    leaf_cache: HashMap<u32, DecNodeId>,
}

impl DecompositionSession {
    /// A fresh, empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all nodes and caches, for reuse across independent runs.
    /// Variable ids are local to a session, so two decompositions that
    /// don't call this between them would otherwise alias each other's
    /// leaves.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.hash.clear();
        self.leaf_cache.clear();
    }

    /// Looks a node up by id.
    pub fn node(&self, id: DecNodeId) -> &DecNode {
        &self.nodes[id as usize]
    }

    /// All nodes, dense by id.
    pub fn nodes(&self) -> &[DecNode] {
        &self.nodes
    }

    /// Emits (or reuses, by structural hash) a gate node with truth table
    /// `func` over `children`. `func` may also be `"0"`/`"1"` with no
    /// children, for a constant.
    pub fn new_node(&mut self, func: &str, children: &[DecNodeId]) -> DecNodeId {
        let key = (func.to_string(), children.to_vec());
        if let Some(&id) = self.hash.get(&key) {
            return id;
        }
        let id = self.nodes.len() as DecNodeId;
        self.nodes.push(DecNode { id, func: func.to_string(), children: children.to_vec(), var: None });
        self.hash.insert(key, id);
        id
    }

    /// Emits (or reuses) a leaf node for input variable `var` (1-based, 1 = MSB).
    pub fn new_in_node(&mut self, var: u32) -> DecNodeId {
        if let Some(&id) = self.leaf_cache.get(&var) {
            return id;
        }
        let id = self.nodes.len() as DecNodeId;
        self.nodes.push(DecNode { id, func: String::new(), children: Vec::new(), var: Some(var) });
        self.leaf_cache.insert(var, id);
        id
    }
}

/// Runs `mode` over `bits`/`order`, applying `fallback` if the primary
/// mode cannot decompose the residue.
pub(crate) fn run(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
    mode: DecompositionMode,
    fallback: Fallback,
) -> Result<DecNodeId, DecError> {
    tracing::debug!(?mode, n = order.len(), "decomposition run starting");
    let primary = match mode {
        DecompositionMode::StpDsd => dsd::decompose(session, bits, order),
        DecompositionMode::StrongDsd => strong_dsd::decompose(session, bits, order),
        DecompositionMode::Mixed => mixed::decompose(session, bits, order),
        DecompositionMode::BiDec => bidec::decompose(session, bits, order, Fallback::None),
        DecompositionMode::LutHybrid66 => hybrid66::decompose(session, bits, order, fallback),
    };
    match primary {
        Err(DecError::DecompositionFailed { n }) if fallback == Fallback::ShannonPlusExact2Lut => {
            tracing::debug!(n, "primary mode failed, falling back to Shannon/exact");
            exact::shannon_or_exact(session, bits, order)
        }
        other => other,
    }
}

/// Splices a decomposition DAG rooted at `root` into `out`, naming every
/// node from `names` (falling back to a `{prefix}{id}` synthetic name for
/// anything not already present), and returns the circuit id of the root.
/// Memoized by decomposition node id so a shared subexpression is only
/// ever materialized once.
///
/// A leaf whose variable name is already a key in `existing_wires` is
/// resolved to that id directly rather than declared as a fresh primary
/// input — needed when splicing a per-gate decomposition back into a
/// netlist where the "variables" are really existing internal wires.
pub(crate) fn splice(
    session: &DecompositionSession,
    root: DecNodeId,
    var_names: &HashMap<u32, String>,
    existing_wires: &HashMap<String, CircuitNodeId>,
    out: &mut Circuit,
    names: &mut HashMap<DecNodeId, String>,
    memo: &mut HashMap<DecNodeId, CircuitNodeId>,
    prefix: &str,
) -> Result<CircuitNodeId, DecError> {
    if let Some(&cid) = memo.get(&root) {
        return Ok(cid);
    }
    let node = session.node(root);
    let cid = if let Some(v) = node.var {
        let name = var_names.get(&v).cloned().unwrap_or_else(|| format!("x{v}"));
        match existing_wires.get(&name) {
            Some(&id) => id,
            None => out.create_pi(&name),
        }
    } else {
        let mut child_names = Vec::with_capacity(node.children.len());
        for &c in &node.children {
            let ccid = splice(session, c, var_names, existing_wires, out, names, memo, prefix)?;
            child_names.push(out.node(ccid).name().to_string());
        }
        let my_name = names.entry(root).or_insert_with(|| format!("{prefix}{root}")).clone();
        let hex = truth::bits_to_hex(&truth::parse_binary(&node.func)?);
        let refs: Vec<&str> = child_names.iter().map(String::as_str).collect();
        out.create_node(&hex, &refs, &my_name)?
    };
    memo.insert(root, cid);
    Ok(cid)
}

/// Evaluates a decomposition DAG's truth table by brute force over all
/// `2^n` assignments. Useful for checking the DEC round-trip property
/// (`evaluate(D) == F`) without routing through a full [`Circuit`]/NORM
/// pipeline.
pub fn eval(session: &DecompositionSession, root: DecNodeId, order: &[u32]) -> Vec<bool> {
    let n = order.len();
    let mut out = Vec::with_capacity(1 << n);
    for i in 0..(1usize << n) {
        let int_val = (1usize << n) - 1 - i;
        let assignment: HashMap<u32, bool> = order
            .iter()
            .enumerate()
            .map(|(pos, &v)| (v, (int_val >> (n - 1 - pos)) & 1 != 0))
            .collect();
        out.push(eval_node(session, root, &assignment));
    }
    out
}

fn eval_node(session: &DecompositionSession, id: DecNodeId, assignment: &HashMap<u32, bool>) -> bool {
    let node = session.node(id);
    if let Some(v) = node.var {
        return assignment[&v];
    }
    if node.children.is_empty() {
        return node.func == "1";
    }
    let child_vals: Vec<bool> = node.children.iter().map(|&c| eval_node(session, c, assignment)).collect();
    let child_int = child_vals.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize);
    let pos = (1usize << child_vals.len()) - 1 - child_int;
    node.func.as_bytes()[pos] == b'1'
}

/// Splices a decomposition rooted at `root` (over `order` variables) into a
/// fresh BENCH netlist: inputs named `i1..in` (`i1` = MSB), single output
/// `f`. Shared by [`decompose_to_bench`] and any CLI command that builds
/// its root via a mode-specific helper rather than [`run`]'s dispatch.
pub fn bench_from_root(session: &DecompositionSession, order: &[u32], root: DecNodeId) -> Result<String, DecError> {
    let var_names: HashMap<u32, String> = order.iter().map(|&v| (v, format!("i{v}"))).collect();
    let mut out = Circuit::new();
    for &v in order {
        out.create_pi(&var_names[&v]);
    }
    let mut names = HashMap::new();
    names.insert(root, "f".to_string());
    let mut memo = HashMap::new();
    let root_id = splice(session, root, &var_names, &HashMap::new(), &mut out, &mut names, &mut memo, "g")?;
    let root_name = out.node(root_id).name().to_string();
    out.create_po(&root_name);
    Ok(crate::bench::write_bench(&mut out))
}

/// Decomposes a standalone truth table into a BENCH netlist with inputs
/// named `i1..in` (`i1` = MSB) and a single output `f`.
pub fn decompose_to_bench(bits: &[bool], cfg: DecConfig) -> Result<String, DecError> {
    if !truth::is_power_of_two(bits.len()) {
        return Err(TruthError::NotPowerOfTwo(bits.len()).into());
    }
    let n = bits.len().trailing_zeros() as usize;
    if n > 30 {
        return Err(DecError::UnsupportedSize(n));
    }
    let order: Vec<u32> = (1..=n as u32).collect();
    let mut session = DecompositionSession::new();
    let root = run(&mut session, bits, &order, cfg.mode, cfg.fallback)?;
    bench_from_root(&session, &order, root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dedups_structurally_identical_nodes() {
        let mut s = DecompositionSession::new();
        let a = s.new_in_node(1);
        let b = s.new_in_node(2);
        let g1 = s.new_node("1000", &[a, b]);
        let g2 = s.new_node("1000", &[a, b]);
        assert_eq!(g1, g2);
        assert_eq!(s.nodes().len(), 3);
    }

    #[test]
    fn eval_round_trips_a_direct_2lut() {
        let mut s = DecompositionSession::new();
        let a = s.new_in_node(1);
        let b = s.new_in_node(2);
        let root = s.new_node("1000", &[a, b]); // AND
        let bits = eval(&s, root, &[1, 2]);
        assert_eq!(truth::bits_to_binary(&bits), "1000");
    }
}
