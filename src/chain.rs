//! CHAIN — symbolic matrix-chain normalizer.
//!
//! Rewrites a preorder token sequence (structural matrices and variable
//! placeholders, as produced by [`crate::norm`] or [`crate::sim`]) into a
//! canonical operator-only chain whose product is the function's structural
//! matrix. See the module-level steps below; each corresponds to one step of
//! the canonicalization algorithm.

use crate::matrix::{
    kronecker_product, matrix_chain_multiply, power_reducing_matrix, generate_swap_matrix,
    ChainMethod, Matrix, MatrixError,
};

/// Errors raised while normalizing a chain.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The input token sequence was empty.
    #[error("cannot normalize an empty chain")]
    EmptyChain,
    /// The underlying algebra kernel rejected a concretized chain.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// One of the three `Special` token kinds named in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// `W(2,2)`, the adjacent-variable swap.
    Swap2,
    /// `I_{dim}`, inserted ahead of an operator to right-align variables.
    IdentityPow2(usize),
    /// `Mr(2)`, collapsing an adjacent duplicate variable pair.
    PowerReduce2,
}

impl Special {
    fn to_matrix(self) -> Matrix {
        match self {
            Special::Swap2 => generate_swap_matrix(2, 2),
            Special::IdentityPow2(dim) => Matrix::identity(dim),
            Special::PowerReduce2 => power_reducing_matrix(2),
        }
    }
}

/// A single chain token: a symbolic variable, a concrete structural matrix,
/// or one of the three rewriting primitives.
#[derive(Debug, Clone)]
pub enum Token {
    /// A variable with 1-based ordinal under the chosen order (1 = MSB).
    Var(u32),
    /// A concrete operator matrix (a circuit node's structural matrix).
    Op(Matrix),
    /// A rewriting primitive inserted by the normalizer itself.
    Special(Special),
}

/// Step 2: right-align variables, threading `Identity(2^c)` prefixes ahead
/// of each original operator token, where `c` is the number of variables
/// already seen strictly to its left. Returns the ops-prefix list (with
/// identities folded in structurally, as a flat token list) and the
/// remaining variable ordinals in their original encounter order.
fn right_align(chain: &[Token]) -> (Vec<Token>, Vec<u32>) {
    let mut ops = Vec::new();
    let mut vars = Vec::new();
    for t in chain {
        match t {
            Token::Var(v) => vars.push(*v),
            Token::Op(m) => {
                if !vars.is_empty() {
                    ops.push(Token::Special(Special::IdentityPow2(1 << vars.len())));
                }
                ops.push(Token::Op(m.clone()));
            }
            Token::Special(_) => {
                // Inputs to normalize() never carry Special tokens; those
                // are only produced by this module's own rewriting.
                unreachable!("raw input chains carry only Var/Op tokens")
            }
        }
    }
    (ops, vars)
}

/// Step 3: insertion-sort the variable tail into ascending ordinal order
/// (ordinal 1 = MSB, leftmost in the final Kronecker product). Every
/// adjacent swap appends a `Swap2` (with an `Identity` prefix when variables
/// already precede it) to `ops`.
fn sort_vars(ops: &mut Vec<Token>, vars: &mut [u32]) {
    for i in 1..vars.len() {
        let mut j = i;
        while j > 0 && vars[j - 1] > vars[j] {
            vars.swap(j - 1, j);
            if j - 1 > 0 {
                ops.push(Token::Special(Special::IdentityPow2(1 << (j - 1))));
            }
            ops.push(Token::Special(Special::Swap2));
            j -= 1;
        }
    }
}

/// Step 4: collapse adjacent duplicate variables. For a run of length `r`
/// starting once the tail is sorted, append `(r-1)` `PowerReduce2` tokens
/// (each prefixed by `Identity(2^c)`, `c` = distinct variables already
/// emitted ahead of the run) and keep one representative of the run.
fn power_reduce(ops: &mut Vec<Token>, vars: &[u32]) -> Vec<u32> {
    let mut reduced = Vec::new();
    let mut i = 0;
    while i < vars.len() {
        let mut j = i + 1;
        while j < vars.len() && vars[j] == vars[i] {
            j += 1;
        }
        let run_len = j - i;
        for _ in 1..run_len {
            if !reduced.is_empty() {
                ops.push(Token::Special(Special::IdentityPow2(1 << reduced.len())));
            }
            ops.push(Token::Special(Special::PowerReduce2));
        }
        reduced.push(vars[i]);
        i = j;
    }
    reduced
}

/// Step 5: concretize. Whenever `Identity(2^c)` is immediately followed by a
/// concrete operator token, fold the pair into `I_{2^c} ⊗ M`; otherwise emit
/// the operator's own concrete matrix.
fn concretize(ops: &[Token]) -> Vec<Matrix> {
    let mut out = Vec::with_capacity(ops.len());
    let mut i = 0;
    while i < ops.len() {
        match &ops[i] {
            Token::Special(Special::IdentityPow2(dim)) => {
                let m = match &ops[i + 1] {
                    Token::Op(m) => m.clone(),
                    Token::Special(s) => s.to_matrix(),
                    Token::Var(_) => unreachable!("vars never re-enter the ops list"),
                };
                out.push(kronecker_product(&Matrix::identity(*dim), &m));
                i += 2;
            }
            Token::Op(m) => {
                out.push(m.clone());
                i += 1;
            }
            Token::Special(s) => {
                out.push(s.to_matrix());
                i += 1;
            }
            Token::Var(_) => unreachable!("vars never re-enter the ops list"),
        }
    }
    out
}

/// Runs the full six-step canonicalization and returns the function's
/// structural matrix (`2 x 2^n`, `n` = number of distinct variables).
pub fn normalize(chain: &[Token], method: ChainMethod) -> Result<Matrix, ChainError> {
    if chain.is_empty() {
        return Err(ChainError::EmptyChain);
    }
    let (mut ops, mut vars) = right_align(chain);
    sort_vars(&mut ops, &mut vars);
    let _reduced = power_reduce(&mut ops, &vars);
    let concrete = concretize(&ops);

    if concrete.is_empty() {
        // A lone variable token with no operator ever seen: the function is
        // the identity on that single variable.
        return Ok(Matrix::identity(2));
    }
    Ok(matrix_chain_multiply(&concrete, method)?)
}

/// Normalizes a chain and reads off the canonical truth-table string (row 0
/// of the resulting structural matrix, left to right).
pub fn normalize_to_truth_table(chain: &[Token], method: ChainMethod) -> Result<String, ChainError> {
    let m = normalize(chain, method)?;
    Ok((0..m.cols()).map(|c| if m.get(0, c) != 0 { '1' } else { '0' }).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::ChainMethod;

    fn lut_matrix(bits: &str) -> Matrix {
        let n = bits.len();
        let mut m = Matrix::zeros(2, n);
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
    fn single_variable_is_identity() {
        let chain = vec![Token::Var(1)];
        let tt = normalize_to_truth_table(&chain, ChainMethod::DynamicProgramming).unwrap();
        assert_eq!(tt, "10");
    }

    #[test]
    fn two_input_and_lut_with_two_distinct_vars() {
        // 2-input AND, hex 8 -> binary "1000".
        let and_mtx = lut_matrix("1000");
        let chain = vec![Token::Op(and_mtx), Token::Var(1), Token::Var(2)];
        let tt = normalize_to_truth_table(&chain, ChainMethod::DynamicProgramming).unwrap();
        assert_eq!(tt, "1000");
    }

    #[test]
    fn swapped_variable_order_reorders_truth_table() {
        // 2-input LUT "1000" (AND) with vars appearing reversed: var 2 then var 1.
        let and_mtx = lut_matrix("1000");
        let chain = vec![Token::Op(and_mtx), Token::Var(2), Token::Var(1)];
        let tt = normalize_to_truth_table(&chain, ChainMethod::DynamicProgramming).unwrap();
        // AND is symmetric, so the canonical row is unchanged either way.
        assert_eq!(tt, "1000");
    }

    #[test]
    fn duplicate_variable_is_power_reduced() {
        // f(x) = x AND x == x: chain has the AND matrix applied to (x1, x1).
        let and_mtx = lut_matrix("1000");
        let chain = vec![Token::Op(and_mtx), Token::Var(1), Token::Var(1)];
        let tt = normalize_to_truth_table(&chain, ChainMethod::DynamicProgramming).unwrap();
        assert_eq!(tt, "10");
    }

    #[test]
    fn sequence_and_dp_agree() {
        let and_mtx = lut_matrix("1000");
        let or_mtx = lut_matrix("1110");
        let chain = vec![
            Token::Op(or_mtx),
            Token::Op(and_mtx.clone()),
            Token::Var(1),
            Token::Var(2),
            Token::Op(and_mtx),
            Token::Var(1),
            Token::Var(3),
        ];
        let seq = normalize_to_truth_table(&chain, ChainMethod::Sequence).unwrap();
        let dp = normalize_to_truth_table(&chain, ChainMethod::DynamicProgramming).unwrap();
        assert_eq!(seq, dp);
    }

    #[test]
    fn five_variable_and_or_chain() {
        // m_d m_c x1 x2 m_d m_c x3 x4 x5, order [x5,x4,x3,x2,x1] => FFFFF888.
        let and_mtx = lut_matrix("1000");
        let or_mtx = lut_matrix("1110");
        let chain = vec![
            Token::Op(or_mtx),
            Token::Op(and_mtx.clone()),
            Token::Var(5),
            Token::Var(4),
            Token::Op(and_mtx),
            Token::Var(3),
            Token::Var(2),
            Token::Var(1),
        ];
        let m = normalize(&chain, ChainMethod::DynamicProgramming).unwrap();
        let bits: Vec<bool> = (0..m.cols()).map(|c| m.get(0, c) != 0).collect();
        let hex = crate::truth::bits_to_hex(&bits);
        assert_eq!(hex.to_uppercase(), "FFFFF888");
    }
}
