//! NORM — circuit to canonical row.
//!
//! Walks a [`Circuit`] from a primary output in preorder, emits the token
//! sequence [`crate::chain`] expects, and folds it through CHAIN to obtain
//! the function's canonical truth table. Traversal uses an explicit
//! work-stack (not recursion) so deep circuits can't blow the call stack.

use std::collections::HashMap;

use crate::chain::{self, ChainError, Token};
use crate::circuit::{Circuit, NodeId};
use crate::matrix::ChainMethod;

/// Errors from normalizing a circuit output.
#[derive(Debug, thiserror::Error)]
pub enum NormError {
    /// The requested node is not a primary output.
    #[error("node {0} is not a primary output")]
    NotAnOutput(NodeId),
    /// CHAIN rejected the output's token sequence.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Variable ordinal (1 = MSB) for every primary input, derived from
/// declaration order: the *last*-declared PI is ordinal 1, the first is
/// ordinal `n`. This mirrors the reference normalizer's own convention.
fn variable_order(circuit: &Circuit) -> HashMap<NodeId, u32> {
    let n = circuit.inputs().len() as u32;
    circuit
        .inputs()
        .iter()
        .enumerate()
        .map(|(i, &pi)| (pi, n - i as u32))
        .collect()
}

/// Explicit-stack preorder traversal from `root`, emitting `Var`/`Op`
/// tokens. Children are visited in the node's internal (already-reversed)
/// input order.
fn preorder_tokens(circuit: &Circuit, root: NodeId, order: &HashMap<NodeId, u32>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = circuit.node(id);
        if node.is_pi() {
            tokens.push(Token::Var(order[&id]));
        } else {
            tokens.push(Token::Op(node.matrix().expect("non-PI node missing structural matrix").clone()));
            for edge in node.inputs().iter().rev() {
                stack.push(edge.target);
            }
        }
    }
    tokens
}

/// Normalizes a single primary output into its canonical truth-table string.
pub fn norm_truth_table(
    circuit: &Circuit,
    output: NodeId,
    method: ChainMethod,
) -> Result<String, NormError> {
    if !circuit.node(output).is_po() {
        return Err(NormError::NotAnOutput(output));
    }
    let order = variable_order(circuit);
    let tokens = preorder_tokens(circuit, output, &order);
    Ok(chain::normalize_to_truth_table(&tokens, method)?)
}

/// Normalizes every primary output, in declaration order.
pub fn norm_all_outputs(
    circuit: &Circuit,
    method: ChainMethod,
) -> Result<Vec<(NodeId, String)>, NormError> {
    circuit
        .outputs()
        .iter()
        .map(|&po| norm_truth_table(circuit, po, method).map(|tt| (po, tt)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(order_last_is_msb: &[&str]) -> (Circuit, NodeId) {
        // Builds (a & b) | (a & ~c) | (~b & ~c) and returns (circuit, po).
        // PIs are declared in `order_last_is_msb`'s reverse so the last
        // declared PI becomes the MSB, matching the requested order.
        let mut c = Circuit::new();
        let declare_order: Vec<&str> = order_last_is_msb.iter().rev().copied().collect();
        for name in &declare_order {
            c.create_pi(name);
        }
        c.create_node("1", &["b"], "not_b").unwrap();
        c.create_node("1", &["c"], "not_c").unwrap();
        c.create_node("8", &["a", "b"], "ab").unwrap();
        c.create_node("8", &["a", "not_c"], "anc").unwrap();
        c.create_node("8", &["not_b", "not_c"], "nbnc").unwrap();
        c.create_node("e", &["ab", "anc"], "ab_or_anc").unwrap();
        let root = c
            .create_node("e", &["ab_or_anc", "nbnc"], "f")
            .unwrap();
        c.create_po("f");
        (c, root)
    }

    #[test]
    fn expression_normalizes_to_8b_with_order_cba() {
        let (c, po) = build(&["c", "b", "a"]);
        let tt = norm_truth_table(&c, po, ChainMethod::DynamicProgramming).unwrap();
        let hex = crate::truth::bits_to_hex(&crate::truth::parse_binary(&tt).unwrap());
        assert_eq!(hex.to_uppercase(), "8B");
    }

    #[test]
    fn expression_normalizes_to_d1_with_order_abc() {
        let (c, po) = build(&["a", "b", "c"]);
        let tt = norm_truth_table(&c, po, ChainMethod::DynamicProgramming).unwrap();
        let hex = crate::truth::bits_to_hex(&crate::truth::parse_binary(&tt).unwrap());
        assert_eq!(hex.to_uppercase(), "D1");
    }

    #[test]
    fn non_output_node_is_rejected() {
        let (c, _po) = build(&["c", "b", "a"]);
        let internal_gate = c.nodes().iter().find(|n| n.name() == "ab").unwrap().id();
        assert!(matches!(
            norm_truth_table(&c, internal_gate, ChainMethod::Sequence),
            Err(NormError::NotAnOutput(_))
        ));
    }
}
