use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use melody_core::{decode_track, timing::bpm, DecodeOptions, ScanStop};
use midi_to_embed::note::describe;
use midi_to_embed::{find_files, logging, multi_track_files, save_track, EmbeddingDocument, MidiData};

#[derive(Parser, Debug)]
#[command(name = "midi-to-embed")]
#[command(about = "Convert MIDI files to embedding sequences and back", long_about = None)]
struct Cli {
    /// Suppress informational messages (only warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show per-file debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a single-track MIDI file into embeddings
    Encode {
        /// Path to the MIDI file
        midi: PathBuf,

        /// Output file path (default: `<midi-name>.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print output to stdout instead of file
        #[arg(long)]
        stdout: bool,
    },
    /// Decode embeddings into a single-track MIDI file
    Decode {
        /// Embedding document or bare JSON array of vectors
        input: PathBuf,

        /// Output MIDI file path
        #[arg(short, long, default_value = "out.mid")]
        output: PathBuf,

        /// JSON file with decode options (tempo, resolution, velocity)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Tempo in microseconds per quarter note
        #[arg(short, long)]
        tempo: Option<u32>,

        /// Ticks per quarter note
        #[arg(short, long)]
        ppqn: Option<u16>,

        /// Velocity of every note
        #[arg(long)]
        velocity: Option<u8>,
    },
    /// Show how a MIDI file encodes
    Inspect {
        /// Path to the MIDI file
        midi: PathBuf,
    },
    /// List MIDI files under a directory that are not single-track
    Check {
        /// Corpus directory
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Encode { midi, output, stdout } => encode(&midi, output, stdout),
        Commands::Decode {
            input,
            output,
            config,
            tempo,
            ppqn,
            velocity,
        } => {
            let mut options = match config {
                Some(path) => load_options(&path)?,
                None => DecodeOptions::default(),
            };
            options.tempo = tempo.unwrap_or(options.tempo);
            options.resolution = ppqn.unwrap_or(options.resolution);
            options.velocity = velocity.unwrap_or(options.velocity);
            decode(&input, &output, &options)
        }
        Commands::Inspect { midi } => inspect(&midi),
        Commands::Check { dir } => check(&dir),
    }
}

fn encode(midi_path: &Path, output: Option<PathBuf>, stdout: bool) -> Result<()> {
    if !midi_path.exists() {
        anyhow::bail!("MIDI file not found: {}", midi_path.display());
    }
    info!("Processing MIDI file: {}", midi_path.display());

    let midi = MidiData::from_file(midi_path)?;
    let encoded = midi
        .encode()
        .with_context(|| format!("Failed to encode {}", midi_path.display()))?;
    if let ScanStop::UnsupportedMeter { numerator } = encoded.stop {
        warn!("Stopped early at a time signature of {} beats per bar", numerator);
    }

    let document = EmbeddingDocument::new(encoded.embeddings)
        .with_source(midi_path.display().to_string(), midi.resolution());

    if stdout {
        // Print directly to stdout (clean, no logs)
        println!("{}", document.to_json()?);
    } else {
        let output_path = output.unwrap_or_else(|| midi_path.with_extension("json"));
        document.save(&output_path)?;
        info!(
            "Saved {} embeddings to {}",
            document.embeddings.len(),
            output_path.display()
        );
    }

    Ok(())
}

fn load_options(path: &Path) -> Result<DecodeOptions> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid config {}", path.display()))
}

fn decode(input: &Path, output: &Path, options: &DecodeOptions) -> Result<()> {
    let document = EmbeddingDocument::load(input)?;
    info!(
        "Decoding {} embeddings at {:.1} BPM, {} ticks per beat",
        document.embeddings.len(),
        bpm(options.tempo),
        options.resolution
    );

    let track = decode_track(&document.embeddings, options)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    save_track(output, &track, options.resolution)?;

    Ok(())
}

fn inspect(midi_path: &Path) -> Result<()> {
    let midi = MidiData::from_file(midi_path)?;
    println!("file:       {}", midi_path.display());
    println!("resolution: {} ticks per beat", midi.resolution());
    println!("tracks:     {}", midi.track_count());

    let encoded = midi.encode()?;
    println!("stopped:    {:?} at tick {}", encoded.stop, encoded.ticks);
    println!("embeddings: {}", encoded.embeddings.len());
    for (idx, embedding) in encoded.embeddings.iter().enumerate() {
        println!("{:>6}  {}", idx, describe(embedding));
    }

    Ok(())
}

fn check(dir: &Path) -> Result<()> {
    let files = find_files(dir)
        .with_context(|| format!("Failed to search {}", dir.display()))?;
    info!("Checking {} MIDI files", files.len());

    let offenders = multi_track_files(&files);
    for (path, tracks) in &offenders {
        println!("{} ({} tracks)", path.display(), tracks);
    }

    if !offenders.is_empty() {
        warn!("{} of {} files are not single-track", offenders.len(), files.len());
        std::process::exit(1);
    }
    Ok(())
}
