//! Mixed mode (`dsd -m`) — per layer, prefer STP-DSD's cut search and fall
//! back to Strong DSD's two-block search within the same layer, recursing
//! into this module's own `decompose` for every sub-part so the preference
//! order holds at every depth, not just the top call.

use super::dsd::{self, CutCase};
use super::strong_dsd;
use super::{DecError, DecNodeId, DecompositionSession};

/// Decomposes `bits` over `order`, trying an STP-DSD cut at each block size
/// first, then a Strong DSD two-block split, before giving up on this
/// residue.
pub fn decompose(
    session: &mut DecompositionSession,
    bits: &[bool],
    order: &[u32],
) -> Result<DecNodeId, DecError> {
    if let Some(r) = dsd::base_case(session, bits, order) {
        return r;
    }
    let n = order.len();

    for s in 1..=n / 2 {
        if let Some(case) = dsd::classify_cut(bits, s) {
            let high_n = n - s;
            return match case {
                CutCase::DropLow(high_bits) => decompose(session, &high_bits, &order[..high_n]),
                CutCase::DropHigh(low_bits) => decompose(session, &low_bits, &order[high_n..]),
                CutCase::AndOr { indicator, block, invert } => {
                    let g = decompose(session, &indicator, &order[..high_n])?;
                    let h = decompose(session, &block, &order[high_n..])?;
                    Ok(if invert {
                        session.new_node("1011", &[g, h])
                    } else {
                        session.new_node("1000", &[g, h])
                    })
                }
                CutCase::Xor { indicator, pattern } => {
                    let g = decompose(session, &indicator, &order[..high_n])?;
                    let h = decompose(session, &pattern, &order[high_n..])?;
                    Ok(session.new_node("1001", &[g, h]))
                }
            };
        }
    }

    if let Some((k, indicator, block0, block1)) = strong_dsd::classify_strong(bits, n) {
        let high_n = n - k;
        let g = decompose(session, &indicator, &order[..high_n])?;
        let h0 = decompose(session, &block0, &order[high_n..])?;
        let h1 = decompose(session, &block1, &order[high_n..])?;
        let not_g_and_h0 = session.new_node("0010", &[g, h0]);
        let g_and_h1 = session.new_node("1000", &[g, h1]);
        return Ok(session.new_node("1110", &[not_g_and_h0, g_and_h1]));
    }

    Err(DecError::DecompositionFailed { n })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dec::eval;
    use crate::truth;

    #[test]
    fn and_prefers_stp_dsd_shape() {
        let bits = truth::parse_binary("1000").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2])), "1000");
    }

    #[test]
    fn falls_back_to_strong_dsd_when_no_cut_recognized() {
        let bits = truth::parse_binary("10011001").unwrap();
        let mut s = DecompositionSession::new();
        let root = decompose(&mut s, &bits, &[1, 2, 3]).unwrap();
        assert_eq!(truth::bits_to_binary(&eval(&s, root, &[1, 2, 3])), "10011001");
    }
}
