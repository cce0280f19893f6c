use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProseGenError, Result};
use crate::tokenizer::{Symbol, Tokenizer};

/// Corpus adapter turning normalized text lines into token sequences.
///
/// The corpus owns its lines and a tokenizer; `token_lines` hands out a fresh
/// lazy iterator on every call, so training passes can restart without
/// re-reading files. Nothing here mutates after construction.
#[derive(Clone, Debug)]
pub struct Corpus {
	lines: Vec<String>,
	tokenizer: Tokenizer,
}

impl Corpus {
	/// Wraps already-loaded lines.
	pub fn new(lines: Vec<String>, tokenizer: Tokenizer) -> Self {
		Self { lines, tokenizer }
	}

	/// Reads one or more plain-text files, one corpus line per text line.
	///
	/// Files are read whole, in the order given.
	///
	/// # Errors
	/// Returns `ProseGenError::Io` with the offending path on read failure.
	pub fn from_files<P: AsRef<Path>>(paths: &[P], tokenizer: Tokenizer) -> Result<Self> {
		let mut lines = Vec::new();
		for path in paths {
			let path = path.as_ref();
			let contents = fs::read_to_string(path)
				.map_err(|err| ProseGenError::io(err, Some(path.to_path_buf())))?;
			lines.extend(contents.lines().map(str::to_owned));
		}
		Ok(Self::new(lines, tokenizer))
	}

	/// Number of lines in the corpus.
	pub fn len(&self) -> usize {
		self.lines.len()
	}

	/// Returns `true` when the corpus holds no lines at all.
	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	/// Lazily tokenizes the corpus, one symbol sequence per line.
	///
	/// Each call starts a fresh pass over the lines.
	pub fn token_lines(&self) -> impl Iterator<Item = Vec<Symbol>> + '_ {
		self.lines.iter().map(|line| self.tokenizer.tokenize(line))
	}

	pub(crate) fn raw_lines(&self) -> &[String] {
		&self.lines
	}

	pub(crate) fn tokenizer(&self) -> &Tokenizer {
		&self.tokenizer
	}
}

/// Lists the files with the given extension directly inside `dir`.
///
/// Subdirectories are ignored. Results are sorted so corpus construction is
/// deterministic across runs.
pub fn discover_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
	let dir = dir.as_ref();
	let entries =
		fs::read_dir(dir).map_err(|err| ProseGenError::io(err, Some(dir.to_path_buf())))?;

	let mut files = Vec::new();
	for entry in entries {
		let entry = entry.map_err(|err| ProseGenError::io(err, Some(dir.to_path_buf())))?;
		let path = entry.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ModelConfig;
	use std::io::Write;

	fn tokenizer() -> Tokenizer {
		Tokenizer::from_config(&ModelConfig::default())
	}

	#[test]
	fn token_lines_restart_on_every_call() {
		let corpus = Corpus::new(
			vec!["the cat sat.".to_owned(), "the cat ran.".to_owned()],
			tokenizer(),
		);
		let first: Vec<_> = corpus.token_lines().collect();
		let second: Vec<_> = corpus.token_lines().collect();
		assert_eq!(first, second);
		assert_eq!(first.len(), 2);
		assert_eq!(first[0], vec!["the", "cat", "sat", ".", "</s>"]);
	}

	#[test]
	fn counts_lines() {
		let corpus = Corpus::new(vec!["one.".to_owned(), String::new()], tokenizer());
		assert_eq!(corpus.len(), 2);
		assert!(!corpus.is_empty());
	}

	#[test]
	fn reads_lines_from_files() {
		let dir = tempfile::tempdir().expect("tempdir");
		let path_a = dir.path().join("a.txt");
		let path_b = dir.path().join("b.txt");
		let mut file = fs::File::create(&path_a).expect("create a");
		writeln!(file, "first line.").expect("write a");
		writeln!(file, "second line.").expect("write a");
		fs::write(&path_b, "third line.").expect("write b");

		let corpus = Corpus::from_files(&[path_a, path_b], tokenizer()).expect("load corpus");
		assert_eq!(corpus.len(), 3);
		assert_eq!(corpus.raw_lines()[2], "third line.");
	}

	#[test]
	fn missing_file_reports_its_path() {
		let missing = PathBuf::from("/definitely/not/here.txt");
		let err = Corpus::from_files(&[missing.clone()], tokenizer())
			.expect_err("load should fail");
		assert!(matches!(
			err,
			ProseGenError::Io { path: Some(p), .. } if p == missing
		));
	}

	#[test]
	fn discover_files_filters_and_sorts() {
		let dir = tempfile::tempdir().expect("tempdir");
		fs::write(dir.path().join("b.txt"), "b").expect("write");
		fs::write(dir.path().join("a.txt"), "a").expect("write");
		fs::write(dir.path().join("skip.dat"), "x").expect("write");
		fs::create_dir(dir.path().join("nested.txt")).expect("mkdir");

		let files = discover_files(dir.path(), "txt").expect("discover");
		let names: Vec<_> = files
			.iter()
			.filter_map(|p| p.file_name().and_then(|n| n.to_str()))
			.collect();
		assert_eq!(names, vec!["a.txt", "b.txt"]);
	}
}
