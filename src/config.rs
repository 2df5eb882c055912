//! Configuration surface.
//!
//! The reference implementation threads its choices through process-global
//! flags. Here they are explicit values passed by the caller, matching the
//! design direction in the decomposer's own notes: no hidden state, no
//! globals to reset between runs.

pub use crate::matrix::{ChainMethod, StpStrategy};

/// Which decomposition family a DEC run should attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionMode {
    /// Disjoint support decomposition via structural-matrix block patterns.
    StpDsd,
    /// Smallest-block Ashenhurst/Curtis-style decomposition.
    StrongDsd,
    /// STP-DSD first, Strong DSD fallback per layer.
    Mixed,
    /// AND/OR/XOR bi-decomposition over variable partitions.
    BiDec,
    /// 6-input-LUT-oriented hybrid mode.
    LutHybrid66,
}

/// What to do when the primary decomposition mode cannot make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Fail with `DecompositionFailed`.
    None,
    /// Shannon-expand and fall back to an exact small-LUT synthesizer.
    ShannonPlusExact2Lut,
}

/// Tunables for [`crate::sim`]'s cone-cutting simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Maximum total fan-in before a growing cone is cut at a new boundary.
    pub cone_limit: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { cone_limit: 6 }
    }
}

/// Top-level run configuration for a single DEC invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecConfig {
    /// Decomposition family to attempt.
    pub mode: DecompositionMode,
    /// Behavior when `mode` cannot decompose the residual function.
    pub fallback: Fallback,
}

impl Default for DecConfig {
    fn default() -> Self {
        Self { mode: DecompositionMode::StpDsd, fallback: Fallback::None }
    }
}
