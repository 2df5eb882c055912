//! 6-LUT hybrid (`66l`) — decompose into blocks of at most 6 inputs each,
//! suited to FPGA LUT fabrics. `n <= 6` residues emit directly as one LUT;
//! larger ones recurse through Strong DSD's two-block split until every
//! leaf block is `<= 6`-input, falling back to bi-decomposition if no
//! Strong DSD split exists for some residue.

use super::dsd;
use super::strong_dsd;
use super::{bidec, DecError, DecNodeId, DecompositionSession};
use crate::config::Fallback;

fn emit_direct_lut(session: &mut DecompositionSession, bits: &[bool], order: &[u32]) -> DecNodeId {
    if let Some(r) = dsd::base_case(session, bits, order) {
        return r.expect("base_case only returns Err via structural hash lookups, which cannot fail here");
    }
    let children: Vec<DecNodeId> = order.iter().map(|&v| session.new_in_node(v)).collect();
    let func: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
    session.new_node(&func, &children)
}

fn strong_dsd_capped(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    if let Some(r) = dsd::base_case(session, bits, order) {
        return r;
    }
    let n = order.len();
    if n <= 6 {
        return Ok(emit_direct_lut(session, bits, order));
    }
    let (k, indicator, block0, block1) =
        strong_dsd::classify_strong(bits, n).ok_or(DecError::DecompositionFailed { n })?;
    let high_n = n - k;
    let g = strong_dsd_capped(session, &indicator, &order[..high_n])?;
    let h0 = strong_dsd_capped(session, &block0, &order[high_n..])?;
    let h1 = strong_dsd_capped(session, &block1, &order[high_n..])?;
    let not_g_and_h0 = session.new_node("0010", &[g, h0]);
    let g_and_h1 = session.new_node("1000", &[g, h1]);
    Ok(session.new_node("1110", &[not_g_and_h0, g_and_h1]))
}

/// Decomposes `bits` over `order` into `<= 6`-input LUT blocks.
pub fn decompose(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
    fallback: Fallback,
) -> Result<DecNodeId, DecError> {
    let n = order.len();
    if n <= 6 {
        return Ok(emit_direct_lut(session, bits, order));
    }
    match strong_dsd_capped(session, bits, order) {
        Ok(id) => Ok(id),
        Err(DecError::DecompositionFailed { .. }) => bidec::decompose(session, bits, order, fallback),
        other => other,
    }
}

/// `66l -d`: only 66-LUT Strong DSD (disjoint detection), no bi-decomposition
/// fallback.
pub fn decompose_dsd_only(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    let n = order.len();
    if n <= 6 {
        return Ok(emit_direct_lut(session, bits, order));
    }
    strong_dsd_capped(session, bits, order)
}

/// `66l -b`: force 66-LUT bi-decomposition, skipping the Strong DSD attempt.
pub fn decompose_bidec_only(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
    fallback: Fallback,
) -> Result<DecNodeId, DecError> {
    let n = order.len();
    if n <= 6 {
        return Ok(emit_direct_lut(session, bits, order));
    }
    bidec::decompose(session, bits, order, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::eval;
    use crate::truth;

    #[test]
    fn six_or_fewer_inputs_become_one_lut() {
        let bits = truth::parse_binary("10001011").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2, 3], Fallback::None).unwrap();
        assert_eq!(s.nodes().len(), 4); // 3 leaves + 1 LUT
        assert_eq!(truth::bits_to_hex(&eval(&s, root, &[1, 2, 3])).to_uppercase(), "8B");
    }

    #[test]
    fn larger_residue_round_trips_via_strong_dsd_or_bidec_fallback() {
        let bits: Vec<bool> = (0..128).map(|i| (i * 37) % 5 < 2).collect();
        let order: Vec<u32> = (1..=7).collect();
        let expected = truth::bits_to_binary(&bits);
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &order, Fallback::ShannonPlusExact2Lut).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &order)), expected);
    }
}
