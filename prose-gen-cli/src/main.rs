mod normalize;

use std::fs;
use std::path::Path;

use log::{info, warn};
use prose_gen_core::config::ModelConfig;
use prose_gen_core::corpus::{Corpus, discover_files};
use prose_gen_core::error::ProseGenError;
use prose_gen_core::model::ngram_model::NGramModel;
use prose_gen_core::tokenizer::Tokenizer;

const RAW_DIR: &str = "./data/raw";
const PROCESSED_DIR: &str = "./data/processed";
const MODEL_CACHE: &str = "./data/model.bin";
const SENTENCE_COUNT: usize = 20;
const MAX_RETRIES: usize = 5;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Normalize every raw book into a clean one-sentence-per-line file
    fs::create_dir_all(PROCESSED_DIR)?;
    let mut processed_paths = Vec::new();
    for raw_path in discover_files(RAW_DIR, "utf-8")? {
        let file_name = raw_path
            .file_name()
            .ok_or("raw book path has no file name")?;
        let out_path = Path::new(PROCESSED_DIR).join(file_name);

        let text = fs::read_to_string(&raw_path)?;
        let lines = normalize::normalize_book(&text);
        info!("normalized {} ({} sentences)", raw_path.display(), lines.len());
        fs::write(&out_path, lines.join("\n"))?;
        processed_paths.push(out_path);
    }

    let config = ModelConfig::default();
    let tokenizer = Tokenizer::from_config(&config);

    // Reuse the cached model when one exists for this order, otherwise train
    // from the processed corpus and cache the result for the next run
    let model = match NGramModel::load(MODEL_CACHE) {
        Ok(model) if model.order() == config.order => {
            info!("loaded cached model ({} contexts)", model.len());
            model
        }
        _ => {
            let corpus = Corpus::from_files(&processed_paths, tokenizer)?;
            let model = NGramModel::train_parallel(&corpus, config)?;
            model.save(MODEL_CACHE)?;
            model
        }
    };

    for _ in 0..SENTENCE_COUNT {
        println!("{}", generate_with_retry(&model, MAX_RETRIES)?);
    }

    Ok(())
}

/// Retries whole generations on sparsity failures, up to `retries` times.
///
/// A sparse context aborts only that attempt; the model itself stays valid,
/// so a fresh walk from the start markers usually lands on a denser path.
fn generate_with_retry(
    model: &NGramModel,
    retries: usize,
) -> Result<String, ProseGenError> {
    let mut attempt = 0;
    loop {
        match model.generate() {
            Ok(sentence) => return Ok(sentence),
            Err(ProseGenError::DataSparsity(context)) if attempt < retries => {
                attempt += 1;
                warn!("hit unseen context [{context}], retrying ({attempt}/{retries})");
            }
            Err(err) => return Err(err),
        }
    }
}
