//! Word-level n-gram sentence generation library.
//!
//! This crate builds a statistical language model from a corpus of plain-text
//! lines and generates novel sentences from it:
//! - A punctuation-aware word tokenizer with sentence-boundary markers
//! - A corpus adapter producing restartable token sequences
//! - A fixed-order n-gram model with weighted random generation
//!
//! Training is a single pass that turns observed transition counts into
//! per-context probability distributions; generation walks those
//! distributions until the end-of-sentence marker is drawn.

/// Crate-wide error type and result alias.
pub mod error;

/// Model configuration (order, boundary markers, sentence-end characters).
pub mod config;

/// Line-to-symbol tokenization with sentence-boundary insertion.
pub mod tokenizer;

/// Corpus adapter over in-memory lines or plain-text files.
pub mod corpus;

/// N-gram model construction and sentence generation.
pub mod model;
