use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use chunkline::types::{Format, Mode};

/// Read a file 8 bytes at a time and print the lines it contains.
#[derive(Parser)]
#[command(name = "chunkline", version, about)]
struct Cli {
    /// File to read.
    #[arg(default_value = chunkline::DEFAULT_INPUT)]
    file: PathBuf,

    /// Print each chunk as read instead of reassembled lines.
    #[arg(long)]
    raw: bool,

    /// Machine-readable output: one JSON object per record.
    #[arg(long)]
    json: bool,

    /// More diagnostics on stderr (-v debug, -vv trace). Ignored when CHUNKLINE_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print shell completions for the given shell.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "chunkline", &mut io::stdout());
        return;
    }

    init_logging(cli.verbose);

    let config = chunkline::Config::new(cli.file)
        .mode(if cli.raw { Mode::Raw } else { Mode::Lines })
        .format(if cli.json { Format::Json } else { Format::Text });

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = chunkline::run(&config, &mut out);
    // process::exit skips destructors; lines written before a failure must still land.
    if let Err(e) = out.flush() {
        tracing::warn!("flushing stdout failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!("{e}");
        process::exit(e.exit_code());
    }
}

/// Diagnostics go to stderr with timestamps. `CHUNKLINE_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("CHUNKLINE_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
