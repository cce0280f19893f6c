use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ProseGenError, Result};

/// Configuration for building an n-gram model.
///
/// # Invariants (enforced by `validate`)
/// - `order` is >= 1 (an order of 1 predicts from an empty context)
/// - `start_token` and `end_token` are distinct literals that the tokenizer
///   can never produce from real text, so they cannot collide with the
///   learned vocabulary
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelConfig {
	/// The order of the model (number of symbols in each n-gram window).
	pub order: usize,

	/// Reserved symbol used to left-pad the context before any real token.
	pub start_token: String,

	/// Reserved symbol inserted after sentence-ending punctuation and used
	/// to terminate generation.
	pub end_token: String,

	/// Punctuation characters that close a sentence.
	pub sentence_end: HashSet<char>,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			order: 4,
			start_token: "<s>".to_owned(),
			end_token: "</s>".to_owned(),
			sentence_end: ['.', '!', '?'].into_iter().collect(),
		}
	}
}

impl ModelConfig {
	/// Returns the default configuration with a different order.
	pub fn with_order(order: usize) -> Self {
		Self { order, ..Self::default() }
	}

	/// Validates the invariants required for training.
	///
	/// # Errors
	/// Returns `ProseGenError::Configuration` if the order is 0, a marker
	/// literal is a possible tokenizer output, or the two markers are equal.
	pub fn validate(&self) -> Result<()> {
		if self.order < 1 {
			return Err(ProseGenError::Configuration("order must be >= 1".to_owned()));
		}
		check_marker(&self.start_token, "start_token")?;
		check_marker(&self.end_token, "end_token")?;
		if self.start_token == self.end_token {
			return Err(ProseGenError::Configuration(
				"start_token and end_token must differ".to_owned(),
			));
		}
		Ok(())
	}
}

/// Rejects marker literals the tokenizer could emit from real text.
///
/// Tokenizer outputs are lowercased words without punctuation, single
/// punctuation characters, and the empty core of an all-punctuation word. A
/// safe marker therefore needs at least two characters, at least one ASCII
/// punctuation character, and no whitespace.
fn check_marker(token: &str, name: &str) -> Result<()> {
	let safe = token.chars().count() >= 2
		&& token.chars().any(|c| c.is_ascii_punctuation())
		&& !token.chars().any(char::is_whitespace);
	if !safe {
		return Err(ProseGenError::Configuration(format!(
			"{name} {token:?} could collide with corpus vocabulary"
		)));
	}
	Ok(())
}
