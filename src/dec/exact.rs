//! Shannon expansion plus a brute-force exact 2-LUT synthesizer (the `-e`
//! fallback). Never fails: every other DEC mode can bottom out here.
//!
//! For `n > 4`, Shannon-split on the first (MSB) variable and recombine with
//! a 2-input-gate MUX. For `n <= 4`, try every pivot variable's Shannon
//! split recursively and keep whichever candidate added the fewest nodes to
//! the session — a bounded stand-in for true minimum 2-LUT-network
//! synthesis.

use super::dsd;
use super::{DecError, DecNodeId, DecompositionSession};

/// Cofactor of `bits` (an `n`-variable table) on the variable at order
/// position `k` (`0` = MSB), taking the `variable = 1` half when
/// `want_one`, else the `variable = 0` half.
pub(crate) fn cofactor(bits: &[bool], n: usize, k: usize, want_one: bool) -> Vec<bool> {
    let group_len = 1usize << (n - k);
    let half = group_len / 2;
    let num_groups = 1usize << k;
    let mut out = Vec::with_capacity(bits.len() / 2);
    for g in 0..num_groups {
        let base = g * group_len;
        if want_one {
            out.extend_from_slice(&bits[base..base + half]);
        } else {
            out.extend_from_slice(&bits[base + half..base + group_len]);
        }
    }
    out
}

/// Builds `(pivot ∧ pos) ∨ (¬pivot ∧ neg)` from already-decomposed `pos`/`neg`
/// sub-DAGs and a pivot variable, the Shannon-expansion recombination shape.
fn combine_shannon(session: &mut DecompositionSession, pivot: DecNodeId, pos: DecNodeId, neg: DecNodeId) -> DecNodeId {
    let pos_term = session.new_node("1000", &[pivot, pos]);
    let neg_term = session.new_node("0010", &[pivot, neg]);
    session.new_node("1110", &[pos_term, neg_term])
}

fn shannon_split(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
    k: usize,
) -> Result<DecNodeId, DecError> {
    let n = order.len();
    let pivot = session.new_in_node(order[k]);
    let rest_order: Vec<u32> = order.iter().enumerate().filter(|&(i, _)| i != k).map(|(_, &v)| v).collect();
    let pos_bits = cofactor(bits, n, k, true);
    let neg_bits = cofactor(bits, n, k, false);
    let pos = shannon_or_exact(session, &pos_bits, &rest_order)?;
    let neg = shannon_or_exact(session, &neg_bits, &rest_order)?;
    Ok(combine_shannon(session, pivot, pos, neg))
}

/// Brute-force: try every pivot position, build the Shannon-MUX shape for
/// each, and keep the one adding the fewest new session nodes. Not proven
/// minimal, just the smallest of the candidates actually tried.
fn search_2lut_tree(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    let n = order.len();
    let mut best: Option<(usize, DecNodeId)> = None;
    for k in 0..n {
        let before = session.nodes().len();
        let candidate = shannon_split(session, bits, order, k)?;
        let grown = session.nodes().len() - before;
        if best.map_or(true, |(best_grown, _)| grown < best_grown) {
            best = Some((grown, candidate));
        }
    }
    Ok(best.expect("n >= 1 guarantees at least one pivot candidate").1)
}

fn two_input_lut(session: &mut DecompositionSession, bits: &[bool], order: &[u32]) -> DecNodeId {
    let a = session.new_in_node(order[0]);
    let b = session.new_in_node(order[1]);
    let func: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
    session.new_node(&func, &[a, b])
}

/// Decomposes `bits` over `order` into a tree of at-most-2-input LUTs via
/// Shannon expansion, falling back to brute-force pivot search for small
/// residues. Always succeeds.
pub fn shannon_or_exact(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    if let Some(r) = dsd::base_case(session, bits, order) {
        return r;
    }
    let n = order.len();
    if n == 2 {
        return Ok(two_input_lut(session, bits, order));
    }
    if n <= 4 {
        return search_2lut_tree(session, bits, order);
    }
    shannon_split(session, bits, order, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::eval;
    use crate::truth;

    #[test]
    fn two_input_and_is_direct() {
        let bits = truth::parse_binary("1000").unwrap();
        let mut s = DecompositionSession::new();
        let root = shannon_or_exact(&mut s, &bits, &[1, 2]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2])), "1000");
        assert_eq!(s.nodes().len(), 3);
    }

    #[test]
    fn four_variable_residue_round_trips() {
        let bits = truth::parse_binary("0110100110010110").unwrap();
        let mut s = DecompositionSession::new();
        let root = shannon_or_exact(&mut s, &bits, &[1, 2, 3, 4]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2, 3, 4])), "0110100110010110");
    }

    #[test]
    fn five_variable_residue_round_trips_via_plain_shannon() {
        let bits: Vec<bool> = (0..32).map(|i| i % 3 == 0).collect();
        let expected = truth::bits_to_binary(&bits);
        let mut s = DecompositionSession::new();
        let root = shannon_or_exact(&mut s, &bits, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2, 3, 4, 5])), expected);
    }
}
