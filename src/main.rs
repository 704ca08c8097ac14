use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, trace};

use chunkagg::config::{default_workers, DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_INTERVAL_MS};
use chunkagg::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "chunkagg", version, about = "Parallel per-key min/max/mean over key:value lines")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate an input file
    Aggregate(AggregateArgs),
    /// Write a random input file
    Generate {
        output: PathBuf,
        #[arg(long, default_value_t = 1_000_000)]
        rows: u64,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct AggregateArgs {
    input: PathBuf,
    /// Lines per parallel unit of work
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE as u64, value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: u64,
    /// Progress refresh cadence in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL_MS, value_parser = clap::value_parser!(u64).range(1..))]
    progress_interval_ms: u64,
    /// Worker threads (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,
    /// Partial maps allowed to queue for the merger
    #[arg(long, default_value_t = 0)]
    channel_capacity: usize,
    #[arg(long)]
    no_progress: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();

    debug!("chunkagg started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

fn aggregate(args: AggregateArgs) -> anyhow::Result<()> {
    let config = PipelineConfig {
        input: args.input,
        chunk_size: usize::try_from(args.chunk_size).context("chunk size does not fit in memory")?,
        progress_interval: Duration::from_millis(args.progress_interval_ms),
        workers: args.workers.unwrap_or_else(default_workers),
        channel_capacity: args.channel_capacity,
        show_progress: !args.no_progress,
    };
    let report = chunkagg::run(&config)?;
    match args.format {
        Format::Text => print!("{}", report.to_text()),
        Format::Json => println!("{}", report.to_json().context("rendering report")?),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Aggregate(args) => aggregate(args),
        Command::Generate { output, rows, seed } => {
            chunkagg::generate::generate(&output, rows, seed).map_err(anyhow::Error::from)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
