//! Deterministic environment services consumed by the combat rules.
mod rng;

pub use rng::{PcgRng, RngOracle, compute_seed};
