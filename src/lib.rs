//! Crate root: public surface and module map for the semi-tensor-product
//! (STP) Boolean-function engine.
//!
//! This module is the single canonical entry point for downstream users of
//! the library. It re-exports the per-subsystem types most callers need so
//! that `use stp::{Matrix, Circuit, DecompositionSession, ...}` covers the
//! common cases, while each submodule remains independently usable for
//! anything more specific.
//!
//! ## Subsystems
//!
//! - [`matrix`] (ALG) — dense 0/1 matrices, Kronecker product, the swap and
//!   power-reducing matrices, and chain multiplication under both the
//!   native and copy-based semi-tensor-product strategies.
//! - [`chain`] — the symbolic token chain and its six-step canonicalization
//!   pipeline (right-align, sort, power-reduce, concretize, fold, evaluate).
//! - [`mc_accel`] — optional multithreaded chain-multiplication accelerator,
//!   behind the `mt-chain` feature; off by default.
//! - [`truth`] — truth-table string/hex parsing shared by DEC and the CLI.
//! - [`circuit`] (CIRC) — the LUT-circuit DAG data model.
//! - [`norm`] (NORM) — PO-to-CHAIN traversal.
//! - [`sim`] (SIM) — exhaustive pattern simulation with cone cutting.
//! - [`bench`] (BENCH) — BENCH netlist reader/writer.
//! - [`dec`] (DEC) — functional decomposition into small-LUT DAGs.
//! - [`config`] — explicit run configuration, replacing the reference
//!   implementation's process-global flags.
//!
//! ## Invariants
//!
//! - All arithmetic here is plain integer/boolean logic; there is no
//!   unsafe code anywhere in this crate.
//! - Every decomposition run owns its own [`dec::DecompositionSession`].
//!   Nothing in this crate keeps cross-run mutable state at module scope —
//!   two decompositions never contaminate each other's structural hash.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// ALG — dense 0/1 matrices and semi-tensor-product chain multiplication.
pub mod matrix;
/// Explicit run configuration (decomposition mode, fallback, sim limits).
pub mod config;
/// CHAIN — symbolic token chain and its canonicalization pipeline.
pub mod chain;
/// Multithreaded chain-multiplication accelerator (`mt-chain` feature).
#[cfg(feature = "mt-chain")]
pub mod mc_accel;
/// Truth-table string/hex conversions shared by DEC and the CLI.
pub mod truth;
/// CIRC — the LUT-circuit data model.
pub mod circuit;
/// NORM — PO-to-CHAIN traversal.
pub mod norm;
/// SIM — exhaustive pattern simulator with cone cutting.
pub mod sim;
/// BENCH — netlist reader/writer.
pub mod bench;
/// DEC — functional decomposer.
pub mod dec;

pub use crate::bench::{read_bench, write_bench, BenchError};
pub use crate::chain::{ChainError, Token};
pub use crate::circuit::{Circuit, CircuitError, Node, NodeId};
pub use crate::config::{DecConfig, DecompositionMode, Fallback, SimConfig};
pub use crate::dec::{DecError, DecompositionSession};
pub use crate::matrix::{ChainMethod, Matrix, MatrixError, StpStrategy};
pub use crate::norm::NormError;
pub use crate::sim::SimError;
pub use crate::truth::TruthError;
