#![deny(missing_docs)]

//! Matching-pursuit re-expression of ill-conditioned trajectory bases.
//!
//! When the overlap matrix of a [`fms_core::BasisCollection`] becomes nearly
//! singular, [`MatchingPursuit`] greedily selects a subset of its trajectories
//! that reproduces the wavefunction within a fidelity threshold and culls the
//! rest.

/// Reduction thresholds and their defaults.
pub mod config;
/// Greedy selection, coefficient fit and commit.
pub mod pursuit;

pub use config::ReductionConfig;
pub use pursuit::{MatchingPursuit, ReductionReport, Termination};
