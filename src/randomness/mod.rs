//! Random bit and basis generation.
//!
//! Classical draws come from a seeded ChaCha generator. Quantum draws
//! try a hardware service, then the in-process circuit simulator, then
//! fall back to the classical generator, logging each step.

mod classical;
mod source;

pub use classical::ClassicalRng;
pub use source::{Draw, RandomSource, RngMode, Tier};
