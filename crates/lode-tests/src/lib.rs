//! Consensus test suite for the lode engine.
//!
//! This crate holds the cross-module scenarios: full chains of mined blocks
//! with real transaction graphs, driven through the public API the way an
//! embedding application would. `tests/e2e.rs` follows the happy paths;
//! `tests/adversarial.rs` attempts to break every admission rule and checks
//! that rejection never perturbs chain state.

pub mod helpers;
