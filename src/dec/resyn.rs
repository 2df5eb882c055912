//! `lut_resyn` — per-gate LUT re-synthesis over a whole BENCH netlist.
//!
//! Walks every internal node in ascending-level order, leaves `<= 2`-fanin
//! gates untouched, and decomposes larger ones through [`super::run`].
//! Decomposition variable ids are local to a [`DecompositionSession`], so
//! the session is reset before each gate — otherwise a gate's variable `1`
//! would alias an unrelated earlier gate's variable `1`.

use std::collections::HashMap;

use crate::bench;
use crate::circuit::{Circuit, NodeId as CircuitNodeId};
use crate::config::{DecompositionMode, Fallback};

use super::{splice, DecError, DecompositionSession};

/// Re-synthesizes every `> 2`-fanin LUT in `text` via `mode`/`fallback`,
/// returning the rewritten netlist as BENCH text.
pub fn lut_resyn(text: &str, mode: DecompositionMode, fallback: Fallback) -> Result<String, DecError> {
    let mut circuit = bench::read_bench(text)?;
    circuit.update_levels()?;

    let mut internal: Vec<CircuitNodeId> =
        circuit.nodes().iter().filter(|n| !n.is_pi()).map(|n| n.id()).collect();
    internal.sort_by_key(|&id| (circuit.node(id).level().unwrap_or(0), id));

    let mut out = Circuit::new();
    let mut wires: HashMap<String, CircuitNodeId> = HashMap::new();
    for &pi in circuit.inputs() {
        let name = circuit.node(pi).name().to_string();
        let id = out.create_pi(&name);
        wires.insert(name, id);
    }

    let mut session = DecompositionSession::new();
    for id in internal {
        let node = circuit.node(id);
        let matrix = node.matrix().expect("non-PI node carries a matrix");
        let bits: Vec<bool> = (0..matrix.cols()).map(|c| matrix.get(0, c) != 0).collect();
        let child_names: Vec<String> =
            node.inputs().iter().rev().map(|e| circuit.node(e.target).name().to_string()).collect();

        let out_id = if child_names.len() <= 2 {
            let hex = crate::truth::bits_to_hex(&bits);
            let refs: Vec<&str> = child_names.iter().map(String::as_str).collect();
            out.create_node(&hex, &refs, node.name())?
        } else {
            session.reset();
            let order: Vec<u32> = (1..=child_names.len() as u32).collect();
            let root = super::run(&mut session, &bits, &order, mode, fallback)?;
            let var_names: HashMap<u32, String> =
                order.iter().zip(&child_names).map(|(&v, n)| (v, n.clone())).collect();
            let mut names = HashMap::new();
            names.insert(root, node.name().to_string());
            let mut memo = HashMap::new();
            splice(&session, root, &var_names, &wires, &mut out, &mut names, &mut memo, "g")?
        };
        wires.insert(node.name().to_string(), out_id);
    }

    for &po in circuit.outputs() {
        out.create_po(circuit.node(po).name());
    }

    Ok(bench::write_bench(&mut out))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETLIST: &str = "\
INPUT(a)
INPUT(b)
INPUT(c)
OUTPUT(f)

f = LUT 0x8B ( a, b, c )
";

    #[test]
    fn preserves_small_gates_and_decomposes_larger_ones() {
        let rewritten = lut_resyn(NETLIST, DecompositionMode::StpDsd, Fallback::ShannonPlusExact2Lut).unwrap();
        let circuit = bench::read_bench(&rewritten).unwrap();
        for node in circuit.nodes() {
            if !node.is_pi() {
                assert!(node.inputs().len() <= 2, "node {:?} has {} inputs", node.name(), node.inputs().len());
            }
        }
        assert!(circuit.outputs().iter().any(|&id| circuit.node(id).name() == "f"));
    }

    #[test]
    fn two_input_gate_netlist_is_left_structurally_unchanged() {
        let netlist = "INPUT(a)\nINPUT(b)\nOUTPUT(g)\n\ng = LUT 0x8 ( a, b )\n";
        let rewritten = lut_resyn(netlist, DecompositionMode::StpDsd, Fallback::None).unwrap();
        let circuit = bench::read_bench(&rewritten).unwrap();
        let g = circuit.nodes().iter().find(|n| n.name() == "g").unwrap();
        assert_eq!(g.tt_hex().to_uppercase(), "8");
        assert_eq!(g.inputs().len(), 2);
    }
}
