//! Shared helpers for the simulation engine.

pub mod batch_pacer;
pub mod converter;
pub mod random;

pub use batch_pacer::BatchPacer;
pub use random::RandomSource;
