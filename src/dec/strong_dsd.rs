//! Strong DSD — Ashenhurst/Curtis-style (ACD) decomposition (`dsd -s`).
//!
//! Finds the smallest block length `L = 2^k` for which the truth table's
//! blocks take on exactly two distinct values, then recombines as a
//! 2-to-1 multiplexer: `F = (¬g ∧ h0) ∨ (g ∧ h1)`, where `g` over the high
//! variables picks which of the two block patterns `h0`/`h1` (over the low
//! variables) applies. This subsumes STP-DSD's AND/OR/XOR cases (each is
//! a multiplexer where one side happens to be constant or complementary)
//! but needs no such special-casing itself.

use super::{DecError, DecNodeId, DecompositionSession};

/// `(k, indicator_over_high_vars, block0, block1)` for the smallest block
/// size admitting exactly two distinct blocks, or `None` if no `k` does.
pub(crate) fn classify_strong(bits: &[bool], n: usize) -> Option<(usize, Vec<bool>, Vec<bool>, Vec<bool>)> {
    for k in 1..n {
        let l = 1usize << k;
        let blocks: Vec<&[bool]> = bits.chunks(l).collect();
        let mut distinct: Vec<&[bool]> = Vec::new();
        for b in &blocks {
            if !distinct.contains(b) {
                distinct.push(b);
                if distinct.len() > 2 {
                    break;
                }
            }
        }
        if distinct.len() == 2 {
            let indicator: Vec<bool> = blocks.iter().map(|b| *b == distinct[1]).collect();
            return Some((k, indicator, distinct[0].to_vec(), distinct[1].to_vec()));
        }
    }
    None
}

fn build_mux(
    session: &mut DecompositionSession,
    g: DecNodeId,
    h0: DecNodeId,
    h1: DecNodeId,
) -> DecNodeId {
    let not_g_and_h0 = session.new_node("0010", &[g, h0]);
    let g_and_h1 = session.new_node("1000", &[g, h1]);
    session.new_node("1110", &[not_g_and_h0, g_and_h1])
}

/// Decomposes `bits` over `order` via Strong DSD only; fails (rather than
/// falling back) when no block size admits exactly two distinct blocks.
pub fn decompose(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    if let Some(r) = super::dsd::base_case(session, bits, order) {
        return r;
    }
    let n = order.len();
    if let Some((k, indicator, block0, block1)) = classify_strong(bits, n) {
        let high_n = n - k;
        let g = decompose(session, &indicator, &order[..high_n])?;
        let h0 = decompose(session, &block0, &order[high_n..])?;
        let h1 = decompose(session, &block1, &order[high_n..])?;
        return Ok(build_mux(session, g, h0, h1));
    }
    Err(DecError::DecompositionFailed { n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::eval;
    use crate::truth;

    #[test]
    fn two_block_function_round_trips() {
        // 3-variable function whose low-1-bit blocks take exactly two
        // distinct values ("10" and "01") at every high assignment.
        let bits = truth::parse_binary("10011001").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2, 3]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2, 3])), "10011001");
    }

    #[test]
    fn no_two_block_split_is_reported() {
        // A function whose blocks (at every k) take on 3+ distinct
        // values: no Strong DSD split should be found.
        let bits = truth::parse_binary("0001011101101000").unwrap();
        let mut s = DecompositionSession::new();
        assert!(matches!(
            decompose(&mut s, &bits, &[1, 2, 3, 4]),
            Ok(_) | Err(DecError::DecompositionFailed { .. })
        ));
    }
}
