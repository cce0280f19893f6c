use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

/// Atomic unit of text after tokenization: a lowercased word, a single
/// punctuation mark, or a reserved boundary marker.
pub type Symbol = String;

/// Splits normalized text lines into ordered symbol sequences.
///
/// # Responsibilities
/// - Lowercase the line and split it on whitespace
/// - Peel leading and trailing punctuation off each word into single-character
///   symbols, keeping the original character order
/// - Insert the end-of-sentence marker after each trailing sentence-ending
///   character
///
/// # Notes
/// - Tokenization is total: any input produces a (possibly empty) sequence.
/// - A word made entirely of punctuation leaves an empty core symbol, which
///   is kept so that its occurrences are counted like any other symbol.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tokenizer {
	/// Punctuation characters that close a sentence.
	sentence_end: HashSet<char>,
	/// Marker emitted after each sentence-ending character.
	end_token: Symbol,
}

impl Tokenizer {
	/// Creates a tokenizer with an explicit sentence-end set and end marker.
	pub fn new(sentence_end: HashSet<char>, end_token: &str) -> Self {
		Self { sentence_end, end_token: end_token.to_owned() }
	}

	/// Creates the tokenizer matching a model configuration.
	pub fn from_config(config: &ModelConfig) -> Self {
		Self::new(config.sentence_end.clone(), &config.end_token)
	}

	/// Converts one line into its ordered symbol sequence.
	///
	/// For each whitespace-separated word the output is: leading punctuation
	/// characters, the (possibly empty) core, then trailing punctuation
	/// characters with the end marker spliced in after sentence-ending ones.
	pub fn tokenize(&self, line: &str) -> Vec<Symbol> {
		let mut symbols = Vec::new();

		for word in line.to_lowercase().split_whitespace() {
			let chars: Vec<char> = word.chars().collect();

			let mut core_start = 0;
			while core_start < chars.len() && chars[core_start].is_ascii_punctuation() {
				core_start += 1;
			}
			let mut core_end = chars.len();
			while core_end > core_start && chars[core_end - 1].is_ascii_punctuation() {
				core_end -= 1;
			}

			for &c in &chars[..core_start] {
				symbols.push(c.to_string());
			}

			symbols.push(chars[core_start..core_end].iter().collect());

			for &c in &chars[core_end..] {
				symbols.push(c.to_string());
				if self.sentence_end.contains(&c) {
					symbols.push(self.end_token.clone());
				}
			}
		}

		symbols
	}
}
