//! ALG — the semi-tensor-product algebra kernel.
//!
//! Dense 0/1 integer matrices, Kronecker products, the swap matrix `W(m,n)`,
//! the power-reducing matrix `Mr(k)`, the semi-tensor product itself (two
//! strategies that must agree bit-for-bit), and dynamic-programming
//! matrix-chain multiplication.
//!
//! Structural matrices (the 2×2ⁿ encoding of an n-input LUT's truth table)
//! are built in [`crate::circuit`]; this module only knows about matrices as
//! plain numeric objects.

#![allow(clippy::needless_range_loop)]

use std::fmt;

/// Errors raised by the STP algebra kernel.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    /// Neither `n % p == 0` nor `p % n == 0` holds for the operand shapes.
    #[error("shape mismatch: cannot form a semi-tensor product of a {a_rows}x{a_cols} and a {b_rows}x{b_cols} matrix")]
    ShapeMismatch {
        /// Rows of the left operand.
        a_rows: usize,
        /// Columns of the left operand.
        a_cols: usize,
        /// Rows of the right operand.
        b_rows: usize,
        /// Columns of the right operand.
        b_cols: usize,
    },
    /// A matrix chain had zero elements.
    #[error("matrix chain is empty")]
    EmptyChain,
}

/// A dense, value-typed, rectangular matrix of small non-negative integers.
///
/// Structural matrices are always 0/1; intermediate products along a chain
/// can transiently take other small values (e.g. inside the copy-method
/// accumulation) before the chain is fully concretized. No operation aliases
/// its inputs: everything here returns a freshly allocated `Matrix`.
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl Matrix {
    /// Builds a matrix from row-major data. Panics if `data.len() != rows*cols`
    /// (a programming error per spec §7, not a recoverable one).
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<i64>) -> Self {
        assert_eq!(rows * cols, data.len(), "row-major data length mismatch");
        Self { rows, cols, data }
    }

    /// Builds a matrix from nested row vectors.
    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let r = rows.len();
        let c = rows.first().map_or(0, |row| row.len());
        let mut data = Vec::with_capacity(r * c);
        for row in rows {
            assert_eq!(row.len(), c, "ragged row in Matrix::from_rows");
            data.extend_from_slice(row);
        }
        Self { rows: r, cols: c, data }
    }

    /// A `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0; rows * cols] }
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Element access.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> i64 {
        self.data[r * self.cols + c]
    }

    /// Element mutation.
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: i64) {
        self.data[r * self.cols + c] = v;
    }

    /// A column slice `[c0, c1)`, returned as a new matrix.
    pub fn column_slice(&self, c0: usize, c1: usize) -> Self {
        let mut out = Self::zeros(self.rows, c1 - c0);
        for r in 0..self.rows {
            for c in c0..c1 {
                out.set(r, c - c0, self.get(r, c));
            }
        }
        out
    }

    /// Adds `other` (scaled by `scale`) into this matrix at column offset
    /// `col_off`, in place. Used by the copy-method STP accumulation.
    fn add_scaled_into(&mut self, other: &Matrix, scale: i64, col_off: usize) {
        if scale == 0 {
            return;
        }
        for r in 0..other.rows {
            for c in 0..other.cols {
                let v = self.get(r, col_off + c) + scale * other.get(r, c);
                self.set(r, col_off + c, v);
            }
        }
    }

    /// Ordinary matrix product. Panics on shape mismatch (a programming
    /// error at call sites that already validated compatible dimensions).
    pub fn matmul(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, other.rows, "matmul shape mismatch");
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0 {
                    continue;
                }
                for j in 0..other.cols {
                    let v = out.get(i, j) + a * other.get(k, j);
                    out.set(i, j, v);
                }
            }
        }
        out
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix[{}x{}]", self.rows, self.cols)?;
        for r in 0..self.rows {
            for c in 0..self.cols {
                write!(f, "{} ", self.get(r, c))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

/// `A ⊗ B`, the Kronecker product.
///
/// When either operand is `1x1`, the scalar product collapses to a plain
/// scale of the other operand; in the structural-matrix setting that scalar
/// is always `1`, so the result is the other operand unchanged.
pub fn kronecker_product(a: &Matrix, b: &Matrix) -> Matrix {
    if a.rows == 1 && a.cols == 1 {
        let s = a.get(0, 0);
        let mut out = b.clone();
        if s != 1 {
            for v in out.data.iter_mut() {
                *v *= s;
            }
        }
        return out;
    }
    if b.rows == 1 && b.cols == 1 {
        let s = b.get(0, 0);
        let mut out = a.clone();
        if s != 1 {
            for v in out.data.iter_mut() {
                *v *= s;
            }
        }
        return out;
    }

    let mut out = Matrix::zeros(a.rows * b.rows, a.cols * b.cols);
    for i in 0..a.rows {
        for j in 0..a.cols {
            let aij = a.get(i, j);
            if aij == 0 {
                continue;
            }
            for k in 0..b.rows {
                for l in 0..b.cols {
                    out.set(i * b.rows + k, j * b.cols + l, aij * b.get(k, l));
                }
            }
        }
    }
    out
}

/// `W(m,n)`: the `mn x mn` swap matrix with `W(m,n)*(x⊗y) = y⊗x` for `x` of
/// length `m`, `y` of length `n`. Row `i*n+j` has its single 1 at column
/// `j*m+i`.
pub fn generate_swap_matrix(m: usize, n: usize) -> Matrix {
    let mut w = Matrix::zeros(m * n, m * n);
    for i in 0..m {
        for j in 0..n {
            w.set(i * n + j, j * m + i, 1);
        }
    }
    w
}

/// `Mr(k)`: the `k^2 x k` power-reducing matrix with `Mr(k)*x = x⊗x` for any
/// standard basis column `x` of length `k`.
pub fn power_reducing_matrix(k: usize) -> Matrix {
    let mut mr = Matrix::zeros(k * k, k);
    for i in 0..k {
        mr.set(i * k + i, i, 1);
    }
    mr
}

/// Which of the two equivalent STP strategies to run. `Copy` is the default:
/// it avoids materializing the tensored operands that `Native` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StpStrategy {
    /// `(A ⊗ I_{t/n}) · (B ⊗ I_{t/p})`, `t = lcm(n,p)`.
    Native,
    /// Block-replication accumulation, no tensored operands materialized.
    Copy,
}

/// The semi-tensor product `A ⋉ B`, using the copy-method strategy.
pub fn semi_tensor_product(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    semi_tensor_product_with(a, b, StpStrategy::Copy)
}

/// The semi-tensor product `A ⋉ B`, with an explicit strategy choice. Both
/// strategies must agree bit-for-bit for any valid shape pair (spec §8).
pub fn semi_tensor_product_with(
    a: &Matrix,
    b: &Matrix,
    strategy: StpStrategy,
) -> Result<Matrix, MatrixError> {
    let (n, p) = (a.cols, b.rows);
    if n % p != 0 && p % n != 0 {
        return Err(MatrixError::ShapeMismatch {
            a_rows: a.rows,
            a_cols: a.cols,
            b_rows: b.rows,
            b_cols: b.cols,
        });
    }
    match strategy {
        StpStrategy::Native => Ok(semi_tensor_product_native(a, b)),
        StpStrategy::Copy => Ok(semi_tensor_product_copy(a, b)),
    }
}

fn semi_tensor_product_native(a: &Matrix, b: &Matrix) -> Matrix {
    let t = lcm(a.cols, b.rows);
    let ia = Matrix::identity(t / a.cols);
    let ib = Matrix::identity(t / b.rows);
    let lhs = kronecker_product(a, &ia);
    let rhs = kronecker_product(b, &ib);
    lhs.matmul(&rhs)
}

fn semi_tensor_product_copy(a: &Matrix, b: &Matrix) -> Matrix {
    let (n, p) = (a.cols, b.rows);
    if n % p == 0 {
        let t = n / p;
        let mut out = Matrix::zeros(a.rows, t * b.cols);
        for i in 0..b.cols {
            for j in 0..p {
                let bij = b.get(j, i);
                if bij == 0 {
                    continue;
                }
                let block = a.column_slice(j * t, (j + 1) * t);
                out.add_scaled_into(&block, bij, i * t);
            }
        }
        out
    } else {
        // p % n == 0: symmetric case on rows.
        let t = p / n;
        let mut out = Matrix::zeros(a.rows * t, b.cols);
        for ar in 0..a.rows {
            for c in 0..t {
                for br in 0..n {
                    let aval = a.get(ar, br);
                    if aval == 0 {
                        continue;
                    }
                    let row = br * t + c;
                    for col in 0..b.cols {
                        let v = out.get(ar * t + c, col) + aval * b.get(row, col);
                        out.set(ar * t + c, col, v);
                    }
                }
            }
        }
        out
    }
}

/// How a [`matrix_chain_multiply`] call should parenthesize its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMethod {
    /// Multiply strictly left to right.
    Sequence,
    /// Dynamic-programming parenthesization minimizing the cost model below.
    DynamicProgramming,
}

/// The op-count cost model for fusing shapes `(m,n)` and `(p,q)`, derived
/// from the reference implementation's `complexity_analysis`: `3*m*n*q` when
/// `n` divides evenly (n is the larger operand dimension), `3*m*p*q` in the
/// symmetric case. Both reduce to `3*m*max(n,p)*q`.
fn chain_cost(m: usize, n: usize, p: usize, q: usize) -> (u64, usize, usize) {
    if n % p == 0 {
        (3 * (m as u64) * (n as u64) * (q as u64), m, n * q / p)
    } else {
        (3 * (m as u64) * (p as u64) * (q as u64), m * p / n, q)
    }
}

/// Multiplies a chain `M_1 ⋉ M_2 ⋉ … ⋉ M_k` with the requested method. Both
/// methods must produce bit-identical results for any valid chain.
pub fn matrix_chain_multiply(
    chain: &[Matrix],
    method: ChainMethod,
) -> Result<Matrix, MatrixError> {
    if chain.is_empty() {
        return Err(MatrixError::EmptyChain);
    }
    if chain.len() == 1 {
        return Ok(chain[0].clone());
    }
    match method {
        ChainMethod::Sequence => {
            let mut acc = chain[0].clone();
            for m in &chain[1..] {
                acc = semi_tensor_product(&acc, m)?;
            }
            Ok(acc)
        }
        ChainMethod::DynamicProgramming => matrix_chain_multiply_dp(chain),
    }
}

#[derive(Clone, Copy)]
struct DpCell {
    cost: u64,
    split: usize,
    rows: usize,
    cols: usize,
}

fn matrix_chain_multiply_dp(chain: &[Matrix]) -> Result<Matrix, MatrixError> {
    let len = chain.len();
    let mut dp = vec![
        vec![
            DpCell { cost: 0, split: 0, rows: 0, cols: 0 };
            len
        ];
        len
    ];
    for i in 0..len {
        dp[i][i] = DpCell { cost: 0, split: i, rows: chain[i].rows(), cols: chain[i].cols() };
    }
    for l in 2..=len {
        for i in 0..=len - l {
            let j = i + l - 1;
            let mut best = DpCell { cost: u64::MAX, split: i, rows: 0, cols: 0 };
            for k in i..j {
                let left = dp[i][k];
                let right = dp[k + 1][j];
                let (c, rows, cols) = chain_cost(left.rows, left.cols, right.rows, right.cols);
                let total = left.cost + right.cost + c;
                if total < best.cost || (total == best.cost && k < best.split) {
                    best = DpCell { cost: total, split: k, rows, cols };
                }
            }
            dp[i][j] = best;
        }
    }
    evaluate_dp(chain, &dp, 0, len - 1)
}

fn evaluate_dp(
    chain: &[Matrix],
    dp: &[Vec<DpCell>],
    i: usize,
    j: usize,
) -> Result<Matrix, MatrixError> {
    if i == j {
        return Ok(chain[i].clone());
    }
    let k = dp[i][j].split;
    let left = evaluate_dp(chain, dp, i, k)?;
    let right = evaluate_dp(chain, dp, k + 1, j)?;
    semi_tensor_product(&left, &right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(values: &[i64]) -> Matrix {
        Matrix::from_row_major(values.len(), 1, values.to_vec())
    }

    #[test]
    fn kron_with_scalar_is_identity() {
        let one = Matrix::from_row_major(1, 1, vec![1]);
        let b = Matrix::from_rows(&[vec![1, 2], vec![3, 4]]);
        assert_eq!(kronecker_product(&one, &b), b);
    }

    #[test]
    fn swap_matrix_swaps_basis_columns() {
        // x = e0 (len 2), y = e1 (len 2): x⊗y should map to y⊗x under W(2,2).
        let x = col(&[1, 0]);
        let y = col(&[0, 1]);
        let xy = kronecker_product(&x, &y);
        let yx = kronecker_product(&y, &x);
        let w = generate_swap_matrix(2, 2);
        assert_eq!(w.matmul(&xy), yx);
    }

    #[test]
    fn power_reduce_duplicates_a_basis_column() {
        let x = col(&[1, 0]);
        let mr = power_reducing_matrix(2);
        let xx = kronecker_product(&x, &x);
        assert_eq!(mr.matmul(&x), xx);
    }

    #[test]
    fn stp_methods_agree() {
        let a = Matrix::from_rows(&[vec![1, 0, 0, 0], vec![0, 1, 1, 1]]);
        let b = Matrix::from_rows(&[vec![1, 1, 0, 1], vec![0, 0, 1, 0]]);
        let native = semi_tensor_product_with(&a, &b, StpStrategy::Native).unwrap();
        let copy = semi_tensor_product_with(&a, &b, StpStrategy::Copy).unwrap();
        assert_eq!(native, copy);
        assert_eq!(native.rows(), 2);
        assert_eq!(native.cols(), 8);
    }

    #[test]
    fn stp_is_associative() {
        let a = Matrix::from_rows(&[vec![1, 0], vec![0, 1]]);
        let b = col(&[1, 0]);
        let c = col(&[0, 1]);
        let lhs = semi_tensor_product(&semi_tensor_product(&a, &b).unwrap(), &c).unwrap();
        let rhs = semi_tensor_product(&a, &semi_tensor_product(&b, &c).unwrap()).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn chain_methods_agree() {
        let chain = vec![
            Matrix::from_rows(&[vec![1, 0, 0, 0], vec![0, 1, 1, 1]]),
            col(&[1, 1]),
            col(&[0, 1]),
        ];
        let seq = matrix_chain_multiply(&chain, ChainMethod::Sequence).unwrap();
        let dp = matrix_chain_multiply(&chain, ChainMethod::DynamicProgramming).unwrap();
        assert_eq!(seq, dp);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let a = Matrix::from_rows(&[vec![1, 0, 1]]);
        let b = Matrix::from_rows(&[vec![1, 0]]);
        assert!(matches!(
            semi_tensor_product(&a, &b),
            Err(MatrixError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_chain_is_reported() {
        assert!(matches!(
            matrix_chain_multiply(&[], ChainMethod::Sequence),
            Err(MatrixError::EmptyChain)
        ));
    }
}
