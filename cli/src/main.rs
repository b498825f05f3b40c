// Copyright 2024 Uniquify Contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! Thin command-line front end: parse args, install the logger, call the
//! library, translate its `Result` into a process exit code.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use uniquify::corpus::{self, CorpusSpec};

#[derive(Parser)]
#[command(name = "uniquify", about = "Deduplicate newline-separated records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deduplicate `input` and write distinct records to standard output.
    Run(RunArgs),
    /// Write a synthetic, reproducible corpus to a file.
    GenerateCorpus(GenerateCorpusArgs),
}

#[derive(Parser)]
struct RunArgs {
    input: PathBuf,

    /// Number of worker threads. Defaults to the host's available parallelism.
    #[arg(short, long)]
    workers: Option<NonZeroUsize>,
}

#[derive(Parser)]
struct GenerateCorpusArgs {
    output: PathBuf,

    #[arg(long, default_value_t = 10_000)]
    unique: usize,

    #[arg(long, default_value_t = 1_000_000)]
    lines: usize,

    #[arg(long = "min-len", default_value_t = 1)]
    min_len: usize,

    #[arg(long = "max-len", default_value_t = 120)]
    max_len: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env()?,
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::GenerateCorpus(args) => generate_corpus(args),
    }
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let workers = args.workers.unwrap_or_else(default_worker_count);
    let count = uniquify::uniquify_path(&args.input, workers)?;
    tracing::info!(count, "done");
    Ok(())
}

fn generate_corpus(args: GenerateCorpusArgs) -> anyhow::Result<()> {
    let spec = CorpusSpec {
        unique_count: args.unique,
        total_lines: args.lines,
        min_len: args.min_len,
        max_len: args.max_len,
        seed: args.seed,
    };
    let mut file = std::fs::File::create(&args.output)?;
    corpus::generate(&spec, &mut file)?;
    tracing::info!(path = %args.output.display(), lines = args.lines, "corpus written");
    Ok(())
}

fn default_worker_count() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or_else(|_| {
        NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::new(1).unwrap())
    })
}
