// Standalone tool to encode a whole MIDI corpus into one embeddings file
// Usage: cargo run --bin generate_embeddings -- <corpus-dir> <output.json> [--seed n]

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

use melody_embed_lib::midi::logging;
use melody_embed_lib::Corpus;

#[derive(Parser, Debug)]
#[command(name = "generate_embeddings")]
#[command(about = "Encode every single-track MIDI file under a directory", long_about = None)]
struct Args {
    /// Directory searched recursively for .mid files
    corpus: PathBuf,

    /// Output JSON path
    output: PathBuf,

    /// Shuffle files with this seed (default: directory order)
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress informational messages (only warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.quiet, false);

    info!("Reading MIDI corpus from: {}", args.corpus.display());
    let mut corpus = Corpus::open(&args.corpus)?;
    if let Some(seed) = args.seed {
        corpus.shuffle(&mut StdRng::seed_from_u64(seed));
    }

    let document = corpus.encode_all();
    info!(
        "Encoded {} of {} files into {} embeddings",
        document.files.len(),
        corpus.len(),
        document.embedding_count()
    );

    document
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    info!("Saved to {}", args.output.display());
    info!("   - File size: ~{} KB", fs::metadata(&args.output)?.len() / 1024);

    Ok(())
}
