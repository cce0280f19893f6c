use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Distribution, State};
use crate::config::ModelConfig;
use crate::corpus::Corpus;
use crate::error::{ProseGenError, Result};
use crate::tokenizer::Symbol;

/// Ordered window of the `order - 1` symbols preceding a prediction point.
/// Empty for an order-1 model.
pub type Context = Vec<Symbol>;

/// Fixed-order n-gram model over word-level symbols.
///
/// # Responsibilities
/// - Build the context table from a corpus in a single counting pass,
///   then normalize counts into per-context probability distributions
/// - Generate whole sentences by weighted random sampling until the
///   end-of-sentence marker is drawn
/// - Cache a trained model to disk and load it back
///
/// # Invariants
/// - The table is immutable once training returns; generation only reads it
/// - Every stored context has at least one observed continuation
/// - Each distribution's probabilities sum to 1.0 within floating tolerance
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NGramModel {
	config: ModelConfig,
	table: HashMap<Context, Distribution>,
}

impl NGramModel {
	/// Trains a model from the corpus in one sequential pass.
	///
	/// Each line is left-padded with `order - 1` start markers, then an
	/// order-wide window slides over it counting (context, next symbol)
	/// observations into a local accumulator. After the pass the counts for
	/// every context divide by that context's total.
	///
	/// # Errors
	/// - `Configuration` if the config fails validation
	/// - `EmptyCorpus` if no line produced a single observation
	pub fn train(corpus: &Corpus, config: ModelConfig) -> Result<Self> {
		config.validate()?;
		info!(
			"training order-{} model over {} corpus lines",
			config.order,
			corpus.len()
		);
		let counts = accumulate(corpus.token_lines(), config.order, &config.start_token);
		Self::from_counts(counts, config)
	}

	/// Trains a model using one worker thread per chunk of corpus lines.
	///
	/// Workers build partial count tables that merge by summing occurrences,
	/// so the result is identical to `train` on the same corpus. Worth it
	/// for book-sized corpora; small inputs can stay on `train`.
	pub fn train_parallel(corpus: &Corpus, config: ModelConfig) -> Result<Self> {
		config.validate()?;

		let lines = corpus.raw_lines();
		let chunks = num_cpus::get() * 4;
		let chunk_size = lines.len().div_ceil(chunks).max(1);
		info!(
			"training order-{} model over {} corpus lines ({} lines per chunk)",
			config.order,
			lines.len(),
			chunk_size
		);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			let tokenizer = corpus.tokenizer().clone();
			let order = config.order;
			let start_token = config.start_token.clone();

			thread::spawn(move || {
				let token_lines = chunk.iter().map(|line| tokenizer.tokenize(line));
				let partial = accumulate(token_lines, order, &start_token);
				tx.send(partial).expect("failed to send partial counts");
			});
		}
		drop(tx);

		let mut counts: HashMap<Context, State> = HashMap::new();
		for partial in rx.iter() {
			for (context, state) in partial {
				counts.entry(context).or_default().merge(state);
			}
		}

		Self::from_counts(counts, config)
	}

	/// Normalizes a finished count accumulator into the final table.
	fn from_counts(counts: HashMap<Context, State>, config: ModelConfig) -> Result<Self> {
		if counts.is_empty() {
			return Err(ProseGenError::EmptyCorpus);
		}

		let table: HashMap<Context, Distribution> = counts
			.into_iter()
			.filter(|(_, state)| !state.is_empty())
			.map(|(context, state)| (context, state.into_distribution()))
			.collect();
		info!("learned {} contexts", table.len());

		Ok(Self { config, table })
	}

	/// The order of the model.
	pub fn order(&self) -> usize {
		self.config.order
	}

	/// Number of distinct contexts in the table.
	pub fn len(&self) -> usize {
		self.table.len()
	}

	/// Returns `true` when the table holds no contexts.
	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// Looks up the learned distribution for a context, if any.
	pub fn distribution(&self, context: &[Symbol]) -> Option<&Distribution> {
		self.table.get(context)
	}

	/// Iterates over every `(context, distribution)` pair in the table.
	pub fn distributions(&self) -> impl Iterator<Item = (&[Symbol], &Distribution)> {
		self.table
			.iter()
			.map(|(context, distribution)| (context.as_slice(), distribution))
	}

	/// Generates one sentence using a thread-local random source.
	///
	/// Calls are independent: the model is only read, so callers may invoke
	/// this from as many threads as they like.
	pub fn generate(&self) -> Result<String> {
		self.generate_with(&mut rand::rng())
	}

	/// Generates one sentence, drawing randomness from `rng`.
	///
	/// The context starts as `order - 1` start markers; each step samples the
	/// next symbol from the current context's distribution, slides the
	/// window, and appends to the sentence until the end marker is drawn.
	/// The end marker itself is never part of the output.
	///
	/// # Errors
	/// `DataSparsity` when the current context is absent from the table. No
	/// internal retry happens; callers decide whether to attempt a fresh
	/// generation.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
		let mut context: Context =
			vec![self.config.start_token.clone(); self.config.order - 1];
		let mut sentence = String::new();
		let mut saw_word = false;

		loop {
			let distribution = self
				.table
				.get(context.as_slice())
				.ok_or_else(|| ProseGenError::DataSparsity(context.join(" ")))?;

			// Training never stores an empty distribution, so a failed draw
			// can only mean the table was tampered with between runs.
			let symbol = match distribution.sample(rng) {
				Some(symbol) => symbol.to_owned(),
				None => return Err(ProseGenError::DataSparsity(context.join(" "))),
			};

			if self.config.order > 1 {
				context.remove(0);
				context.push(symbol.clone());
			}

			if symbol == self.config.end_token {
				break;
			}
			push_symbol(&mut sentence, &symbol, &mut saw_word);
		}

		Ok(sentence)
	}

	/// Writes the model to `path` as a compact binary cache.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let bytes = postcard::to_stdvec(self)?;
		fs::write(&path, bytes)
			.map_err(|err| ProseGenError::io(err, Some(path.as_ref().to_path_buf())))
	}

	/// Loads a model previously written by `save`.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = fs::read(&path)
			.map_err(|err| ProseGenError::io(err, Some(path.as_ref().to_path_buf())))?;
		Ok(postcard::from_bytes(&bytes)?)
	}
}

/// Counts (context, next symbol) observations across all token lines.
///
/// Pure accumulation: the returned map is the only state, so partial tables
/// built over disjoint line chunks can merge into the same totals a single
/// pass would produce.
fn accumulate<I>(token_lines: I, order: usize, start_token: &str) -> HashMap<Context, State>
where
	I: IntoIterator<Item = Vec<Symbol>>,
{
	let mut counts: HashMap<Context, State> = HashMap::new();

	for tokens in token_lines {
		let mut padded: Vec<Symbol> = vec![start_token.to_owned(); order - 1];
		padded.extend(tokens);

		// Windows exist only past the padding, so an empty line contributes
		// nothing.
		for i in (order - 1)..padded.len() {
			let context = padded[i + 1 - order..i].to_vec();
			counts.entry(context).or_default().add_transition(&padded[i]);
		}
	}

	counts
}

/// Appends one generated symbol to the sentence under construction.
///
/// Punctuation symbols attach directly to the preceding text; word symbols
/// are space-separated and the first real one is capitalized. Empty symbols
/// (from all-punctuation words kept at tokenization) render as a bare
/// separator.
fn push_symbol(sentence: &mut String, symbol: &str, saw_word: &mut bool) {
	if is_punctuation_symbol(symbol) {
		sentence.push_str(symbol);
		return;
	}

	if !sentence.is_empty() {
		sentence.push(' ');
	}
	if !*saw_word && !symbol.is_empty() {
		*saw_word = true;
		sentence.push_str(&capitalize(symbol));
	} else {
		sentence.push_str(symbol);
	}
}

fn is_punctuation_symbol(symbol: &str) -> bool {
	let mut chars = symbol.chars();
	matches!(
		(chars.next(), chars.next()),
		(Some(c), None) if c.is_ascii_punctuation()
	)
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
		None => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tokenizer::Tokenizer;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn corpus(lines: &[&str], config: &ModelConfig) -> Corpus {
		Corpus::new(
			lines.iter().map(|line| (*line).to_owned()).collect(),
			Tokenizer::from_config(config),
		)
	}

	fn context(symbols: &[&str]) -> Context {
		symbols.iter().map(|s| (*s).to_owned()).collect()
	}

	#[test]
	fn shared_context_splits_probability_evenly() {
		let config = ModelConfig::with_order(2);
		let model =
			NGramModel::train(&corpus(&["The cat sat.", "The cat ran."], &config), config.clone())
				.expect("train");

		let distribution = model
			.distribution(&context(&["cat"]))
			.expect("context should be present");
		assert_eq!(distribution.len(), 2);
		assert_eq!(distribution.probability("sat"), Some(0.5));
		assert_eq!(distribution.probability("ran"), Some(0.5));
	}

	#[test]
	fn every_distribution_sums_to_one() {
		let config = ModelConfig::with_order(3);
		let model = NGramModel::train(
			&corpus(
				&["the cat sat on the mat.", "a dog ran!", "wait... what?"],
				&config,
			),
			config.clone(),
		)
		.expect("train");

		for (_, distribution) in model.distributions() {
			let total: f64 = distribution.iter().map(|(_, p)| p).sum();
			assert!((total - 1.0).abs() < 1e-9, "sum was {total}");
		}
	}

	#[test]
	fn training_twice_yields_equal_models() {
		let config = ModelConfig::with_order(2);
		let data = corpus(&["the cat sat.", "the cat ran.", "a dog barked!"], &config);
		let first = NGramModel::train(&data, config.clone()).expect("train");
		let second = NGramModel::train(&data, config.clone()).expect("train");
		assert_eq!(first, second);
	}

	#[test]
	fn parallel_training_matches_sequential() {
		let config = ModelConfig::with_order(3);
		let data = corpus(
			&[
				"the cat sat on the mat.",
				"the dog sat on the rug.",
				"a bird flew over the mat.",
				"the cat ran away!",
			],
			&config,
		);
		let sequential = NGramModel::train(&data, config.clone()).expect("train");
		let parallel = NGramModel::train_parallel(&data, config.clone()).expect("train");
		assert_eq!(sequential, parallel);
	}

	#[test]
	fn unigram_model_has_a_single_empty_context() {
		let config = ModelConfig::with_order(1);
		let model = NGramModel::train(&corpus(&["a b.", "c d."], &config), config.clone())
			.expect("train");
		assert_eq!(model.len(), 1);
		let distribution = model.distribution(&[]).expect("empty context");
		assert!(distribution.probability("a").is_some());
		assert!(distribution.probability("</s>").is_some());
	}

	#[test]
	fn empty_corpus_fails_fast() {
		let config = ModelConfig::with_order(2);
		let err = NGramModel::train(&corpus(&[], &config), config.clone())
			.expect_err("training should fail");
		assert!(matches!(err, ProseGenError::EmptyCorpus));
	}

	#[test]
	fn whitespace_only_corpus_fails_fast() {
		let config = ModelConfig::with_order(2);
		let err = NGramModel::train(&corpus(&["   ", "\t"], &config), config.clone())
			.expect_err("training should fail");
		assert!(matches!(err, ProseGenError::EmptyCorpus));
	}

	#[test]
	fn invalid_config_is_rejected_before_counting() {
		let config = ModelConfig::with_order(0);
		let err = NGramModel::train(&corpus(&["fine."], &config), config.clone())
			.expect_err("training should fail");
		assert!(matches!(err, ProseGenError::Configuration(_)));
	}

	#[test]
	fn generation_follows_a_single_chain_deterministically() {
		let config = ModelConfig::with_order(2);
		let model = NGramModel::train(&corpus(&["the cat sat."], &config), config.clone())
			.expect("train");

		let mut rng = StdRng::seed_from_u64(11);
		let sentence = model.generate_with(&mut rng).expect("generate");
		assert_eq!(sentence, "The cat sat.");
	}

	#[test]
	fn generation_renders_punctuation_and_empty_symbols() {
		// "!?" is an all-punctuation word: its empty core is kept in training
		// and renders as a bare separator between "!?" and "ok".
		let config = ModelConfig::with_order(2);
		let model = NGramModel::train(&corpus(&["hmm !? ok."], &config), config.clone())
			.expect("train");

		let mut rng = StdRng::seed_from_u64(3);
		let sentence = model.generate_with(&mut rng).expect("generate");
		assert_eq!(sentence, "Hmm!?  ok.");
	}

	#[test]
	fn generation_terminates_when_every_line_ends_a_sentence() {
		let config = ModelConfig::with_order(2);
		let model = NGramModel::train(
			&corpus(
				&["the cat sat.", "the dog ran!", "a cat ran home."],
				&config,
			),
			config.clone(),
		)
		.expect("train");

		for seed in 0..32 {
			let mut rng = StdRng::seed_from_u64(seed);
			let sentence = model.generate_with(&mut rng).expect("generate");
			assert!(!sentence.contains("</s>"));
			assert!(!sentence.is_empty());
		}
	}

	#[test]
	fn unseen_context_raises_data_sparsity() {
		// The single line never ends a sentence, so generation walks off the
		// end of the learned windows and lands on a context with no entry.
		let config = ModelConfig::with_order(5);
		let model = NGramModel::train(&corpus(&["the cat"], &config), config.clone())
			.expect("train");

		let mut rng = StdRng::seed_from_u64(1);
		let err = model
			.generate_with(&mut rng)
			.expect_err("generation should fail");
		assert!(matches!(err, ProseGenError::DataSparsity(_)));
	}

	#[test]
	fn saved_model_loads_back_equal() {
		let config = ModelConfig::with_order(2);
		let model = NGramModel::train(&corpus(&["the cat sat."], &config), config.clone())
			.expect("train");

		let dir = tempfile::tempdir().expect("tempdir");
		let path = dir.path().join("model.bin");
		model.save(&path).expect("save");
		let loaded = NGramModel::load(&path).expect("load");
		assert_eq!(model, loaded);
	}
}
