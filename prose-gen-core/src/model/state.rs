use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tokenizer::Symbol;

/// Accumulates transition occurrences for a single context during training.
///
/// Conceptually a node in a Markov chain whose outgoing edges are weighted by
/// their number of observations. States exist only while counting; once the
/// corpus pass finishes each one is frozen into a `Distribution`.
///
/// ## Invariants
/// - Every recorded transition has an occurrence count >= 1
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct State {
	/// Outgoing transitions indexed by the next symbol.
	/// The value represents how many times this transition was observed.
	transitions: HashMap<Symbol, usize>,
}

impl State {
	/// Records an occurrence of a transition toward `next`.
	pub(crate) fn add_transition(&mut self, next: &str) {
		*self.transitions.entry(next.to_owned()).or_insert(0) += 1;
	}

	/// Merges another state into this one by summing occurrence counts.
	///
	/// Used when partial count tables built in parallel are combined; the
	/// sums are order-independent, so merged results match a sequential pass.
	pub(crate) fn merge(&mut self, other: Self) {
		for (next, occurrences) in other.transitions {
			*self.transitions.entry(next).or_insert(0) += occurrences;
		}
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Freezes the counts into a normalized distribution.
	///
	/// Each count divides by the context total; entries are sorted by symbol
	/// so sampling walks a consistent order and equal counts always produce
	/// equal distributions.
	pub(crate) fn into_distribution(self) -> Distribution {
		let total: usize = self.transitions.values().sum();
		let mut entries: Vec<(Symbol, f64)> = self
			.transitions
			.into_iter()
			.map(|(next, occurrences)| (next, occurrences as f64 / total as f64))
			.collect();
		entries.sort_by(|a, b| a.0.cmp(&b.0));
		Distribution { entries }
	}
}

/// Probability distribution over the next symbol for one context.
///
/// ## Invariants
/// - Probabilities are positive and sum to 1.0 within floating tolerance
/// - Entries are sorted by symbol and never change after construction
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Distribution {
	entries: Vec<(Symbol, f64)>,
}

impl Distribution {
	/// Probability of `symbol` being the next token, if it was ever observed.
	pub fn probability(&self, symbol: &str) -> Option<f64> {
		self.entries
			.iter()
			.find(|(candidate, _)| candidate.as_str() == symbol)
			.map(|(_, probability)| *probability)
	}

	/// Number of distinct continuations.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` when the distribution has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(symbol, probability)` pairs in sampling order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.entries
			.iter()
			.map(|(symbol, probability)| (symbol.as_str(), *probability))
	}

	/// Samples the next symbol by inverse CDF over the entries.
	///
	/// Draws a uniform value in [0, 1) and walks the entries accumulating
	/// probability mass; the first entry whose cumulative mass reaches the
	/// draw wins. Returns `None` only for an empty distribution, which
	/// training never produces.
	pub(crate) fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		let draw: f64 = rng.random();

		let mut mass = 0.0;
		let mut fallback = None;
		for (symbol, probability) in &self.entries {
			mass += probability;
			if mass >= draw {
				return Some(symbol);
			}
			fallback = Some(symbol.as_str());
		}

		// Rounding can leave the cumulative mass a hair under the draw; the
		// last entry absorbs the remainder.
		fallback
	}
}
