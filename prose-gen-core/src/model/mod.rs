//! N-gram model construction and sentence generation.
//!
//! The model layer has two halves:
//! - `ngram_model`: the trained context table, built once from a corpus,
//!   read-only afterwards, plus the generation loop
//! - `state`: per-context transition counts accumulated during training and
//!   the normalized probability distribution they become

/// Fixed-order n-gram model (`order >= 1`).
///
/// Handles corpus ingestion, transition counting, probability
/// normalization, weighted sentence generation, and the binary model cache.
pub mod ngram_model;

/// Per-context transition counts and normalized distributions.
///
/// Counting is internal to training; the resulting `Distribution` is exposed
/// read-only for inspection and sampling.
mod state;

pub use state::Distribution;
