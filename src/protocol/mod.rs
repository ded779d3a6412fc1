//! Classical post-processing of a BB84 exchange.
//!
//! ```text
//! sift → qber → policy → reconcile → amplify
//! ```
//!
//! Reconciliation and amplification are deliberate simplifications:
//! the reconciler forces equality and the amplifier truncates. Their
//! outputs feed illustrative metrics, not real key material.

mod amplification;
mod policy;
mod reconciliation;
mod sifting;

pub use amplification::{amplify, PrivacyAmplification, DEFAULT_AMPLIFICATION_FACTOR};
pub use policy::{PolicyViolation, SecurityPolicy, DEFAULT_QBER_THRESHOLD};
pub use reconciliation::{apply as apply_error_correction, reconcile, ErrorCorrection, Reconciled};
pub use sifting::{qber, sift, SiftedKeys};
