//! STP-DSD — disjoint support decomposition via structural-matrix block
//! patterns (the default `dsd -f` mode).
//!
//! Partitions a truth table into `L = 2^s` blocks for the smallest `s`
//! that admits one of five recognizable shapes, recurses on the reduced
//! halves, and recombines with a single 2-input gate. The five cases
//! mirror the reference decomposer's `theorem33_case_id` classification.

use super::{DecError, DecNodeId, DecompositionSession};

/// The shape of a recognized cut at block size `2^s`, with the bit
/// vectors callers need to recurse on already extracted.
pub(crate) enum CutCase {
    /// `N=∅, |C|=2`: independent of the low `s` variables. Carries the
    /// reduced truth table over the high `n-s` variables.
    DropLow(Vec<bool>),
    /// `C=∅, |N|=1`: independent of the high `n-s` variables. Carries the
    /// single non-constant block, over the low `s` variables.
    DropHigh(Vec<bool>),
    /// `|C|=1, |N|=1`: AND-like (`invert=false`) or OR-like (`invert=true`)
    /// split. `indicator` (high vars) picks out the non-constant block;
    /// `block` (low vars) is that block's own pattern.
    AndOr { indicator: Vec<bool>, block: Vec<bool>, invert: bool },
    /// `C=∅, |N|=2` complementary: XOR-like split. `indicator` (high vars)
    /// is 1 where the block equals `pattern` (low vars); the full function
    /// is `indicator XNOR pattern`.
    Xor { indicator: Vec<bool>, pattern: Vec<bool> },
}

fn is_complement(a: &[bool], b: &[bool]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x != y)
}

/// Classifies the cut at block size `2^s`, pure and recursion-free so
/// [`mixed`](super::mixed) can reuse it with a different fallback strategy
/// per layer.
pub(crate) fn classify_cut(bits: &[bool], s: usize) -> Option<CutCase> {
    let l = 1usize << s;
    let blocks: Vec<&[bool]> = bits.chunks(l).collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Kind {
        Zero,
        One,
        NonConst(usize),
    }

    let mut distinct_nc: Vec<&[bool]> = Vec::new();
    let mut consts = std::collections::BTreeSet::new();
    let mut kinds = Vec::with_capacity(blocks.len());
    for b in &blocks {
        if b.iter().all(|&x| !x) {
            consts.insert(false);
            kinds.push(Kind::Zero);
        } else if b.iter().all(|&x| x) {
            consts.insert(true);
            kinds.push(Kind::One);
        } else {
            let idx = match distinct_nc.iter().position(|d| d == b) {
                Some(i) => i,
                None => {
                    distinct_nc.push(b);
                    distinct_nc.len() - 1
                }
            };
            kinds.push(Kind::NonConst(idx));
        }
    }

    match (consts.len(), distinct_nc.len()) {
        (2, 0) => {
            let high_bits: Vec<bool> = kinds.iter().map(|k| matches!(k, Kind::One)).collect();
            Some(CutCase::DropLow(high_bits))
        }
        (0, 1) => Some(CutCase::DropHigh(distinct_nc[0].to_vec())),
        (1, 1) => {
            let invert = *consts.iter().next().unwrap();
            let indicator: Vec<bool> = kinds.iter().map(|k| matches!(k, Kind::NonConst(_))).collect();
            Some(CutCase::AndOr { indicator, block: distinct_nc[0].to_vec(), invert })
        }
        (0, 2) if is_complement(distinct_nc[0], distinct_nc[1]) => {
            let indicator: Vec<bool> = kinds.iter().map(|k| matches!(k, Kind::NonConst(0))).collect();
            Some(CutCase::Xor { indicator, pattern: distinct_nc[0].to_vec() })
        }
        _ => None,
    }
}

/// Handles the two terminal shapes every decomposition mode shares: an
/// already-constant residue, and a single-variable residue (identity or
/// NOT). Returns `None` when the residue needs a real cut.
pub(crate) fn base_case(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Option<Result<DecNodeId, DecError>> {
    if bits.iter().all(|&b| b == bits[0]) {
        return Some(Ok(session.new_node(if bits[0] { "1" } else { "0" }, &[])));
    }
    if order.len() == 1 {
        let v = session.new_in_node(order[0]);
        return Some(Ok(if bits[0] { v } else { session.new_node("01", &[v]) }));
    }
    None
}

/// Decomposes `bits` (an `n`-variable truth table, MSB-first) over `order`
/// (variable ids, MSB-first, `order.len() == n`) via pure STP-DSD.
pub fn decompose(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    if let Some(r) = base_case(session, bits, order) {
        return r;
    }
    let n = order.len();
    for s in 1..=n / 2 {
        if let Some(case) = classify_cut(bits, s) {
            let high_n = n - s;
            return match case {
                CutCase::DropLow(high_bits) => decompose(session, &high_bits, &order[..high_n]),
                CutCase::DropHigh(low_bits) => decompose(session, &low_bits, &order[high_n..]),
                CutCase::AndOr { indicator, block, invert } => {
                    let g = decompose(session, &indicator, &order[..high_n])?;
                    let h = decompose(session, &block, &order[high_n..])?;
                    Ok(if invert {
                        session.new_node("1011", &[g, h]) // OR-like: ¬g ∨ h
                    } else {
                        session.new_node("1000", &[g, h]) // AND-like: g ∧ h
                    })
                }
                CutCase::Xor { indicator, pattern } => {
                    let g = decompose(session, &indicator, &order[..high_n])?;
                    let h = decompose(session, &pattern, &order[high_n..])?;
                    Ok(session.new_node("1001", &[g, h])) // g XNOR h
                }
            };
        }
    }
    Err(DecError::DecompositionFailed { n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::eval;
    use crate::truth;

    #[test]
    fn and_of_two_vars_is_recognized_at_s1() {
        let bits = truth::parse_binary("1000").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2])), "1000");
    }

    #[test]
    fn xor_of_two_vars_round_trips() {
        let bits = truth::parse_binary("0110").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2])), "0110");
    }

    #[test]
    fn three_variable_dsd_round_trips() {
        // (a & b) | (a & ~c) | (~b & ~c), same function as norm.rs's test
        // circuit, expected hex 8B with order a=MSB, b, c=LSB.
        let bits = truth::parse_binary("10001011").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2, 3]).unwrap();
        assert_eq!(truth::bits_to_hex(&eval(&s, root, &[1, 2, 3])).to_uppercase(), "8B");
    }

    #[test]
    fn constant_residue_is_a_base_case() {
        let bits = truth::parse_binary("0000").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2]).unwrap();
        assert_eq!(s.node(root).func(), "0");
        assert!(s.node(root).children().is_empty());
    }

    #[test]
    fn single_variable_not_gate() {
        let bits = truth::parse_binary("01").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1])), "01");
    }
}
