//! Multi-thread matrix-chain accelerator, gated behind the `mt-chain`
//! feature. Off by default: [`crate::matrix::matrix_chain_multiply`] alone
//! is always correct; this only changes wall-clock behavior on long chains.
//!
//! Splits a chain into `min(threads, len/2)` contiguous sub-chains (STP is
//! associative but not commutative, so the split must be contiguous, never
//! interleaved), multiplies each sub-chain on its own worker, then
//! recombines the resulting shorter chain with one more DP pass.

use std::thread;

use crate::matrix::{matrix_chain_multiply, ChainMethod, Matrix, MatrixError};

/// Multiplies `chain` using up to `threads` worker threads, falling back to
/// fewer when the chain is too short to keep them all busy.
pub fn matrix_chain_multiply_mt(chain: &[Matrix], threads: usize) -> Result<Matrix, MatrixError> {
    if chain.is_empty() {
        return Err(MatrixError::EmptyChain);
    }
    let worker_count = threads.max(1).min((chain.len() / 2).max(1));
    if worker_count <= 1 || chain.len() < 2 {
        return matrix_chain_multiply(chain, ChainMethod::DynamicProgramming);
    }

    let block_size = chain.len() / worker_count;
    let remainder = chain.len() % worker_count;

    let mut bounds = Vec::with_capacity(worker_count);
    let mut start = 0;
    for i in 0..worker_count {
        let len = block_size + if i < remainder { 1 } else { 0 };
        let end = start + len;
        bounds.push((start, end));
        start = end;
    }

    let partials: Vec<Result<Matrix, MatrixError>> = thread::scope(|scope| {
        let handles: Vec<_> = bounds
            .iter()
            .map(|&(s, e)| {
                let sub_chain = &chain[s..e];
                scope.spawn(move || matrix_chain_multiply(sub_chain, ChainMethod::DynamicProgramming))
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("chain worker panicked")).collect()
    });

    let sub_products: Vec<Matrix> = partials.into_iter().collect::<Result<_, _>>()?;
    matrix_chain_multiply(&sub_products, ChainMethod::DynamicProgramming)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{generate_swap_matrix, power_reducing_matrix};

    fn lut_matrix(bits: &str) -> Matrix {
        let mut m = Matrix::zeros(2, bits.len());
        for (i, c) in bits.chars().enumerate() {
            if c == '1' {
                m.set(0, i, 1);
            } else {
                m.set(1, i, 1);
            }
        }
        m
    }

    #[test]
    fn matches_single_threaded_dp() {
        let chain = vec![
            lut_matrix("1000"),
            generate_swap_matrix(2, 2),
            power_reducing_matrix(2),
            lut_matrix("1110"),
            generate_swap_matrix(2, 2),
        ];
        let expected = matrix_chain_multiply(&chain, ChainMethod::DynamicProgramming).unwrap();
        for threads in [1, 2, 3, 8] {
            let got = matrix_chain_multiply_mt(&chain, threads).unwrap();
            assert_eq!(got, expected, "threads={threads}");
        }
    }

    #[test]
    fn short_chain_falls_back_to_single_threaded() {
        let chain = vec![lut_matrix("10")];
        let got = matrix_chain_multiply_mt(&chain, 8).unwrap();
        assert_eq!(got, lut_matrix("10"));
    }

    #[test]
    fn empty_chain_is_reported() {
        assert!(matches!(matrix_chain_multiply_mt(&[], 4), Err(MatrixError::EmptyChain)));
    }
}
