use clap::{Parser, Subcommand};
use envcheck::{
  Options, list,
  options::{DEFAULT_INSTANCE_FILENAME, DEFAULT_MAX_SCAN_SIZE, DEFAULT_TEMPLATE_FILENAME},
  scan, write,
};
use std::{error::Error, path::PathBuf, process::ExitCode};

#[derive(Parser)]
#[command(
  name = "envcheck",
  about = "Helps you check your env files",
  version,
  author
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Command {
  /// List all .env.* files and .env.example files and their diffs
  List {
    /// Directory to search (takes precedence over --path)
    dir: Option<PathBuf>,

    /// Path to search for env files
    #[arg(short, long, default_value = ".")]
    path: PathBuf,
  },
  /// Create an env file from an example file
  Create(FileArgs),
  /// Update an env file with missing keys from an example file
  Update(FileArgs),
  /// Scan all text files in a path to identify env vars
  #[command(long_about = "Scan all text files in the specified path to identify \
                          environment variables. Files larger than --max-size \
                          (5MB by default) are skipped.")]
  Scan {
    /// Directory to scan (takes precedence over --path)
    dir: Option<PathBuf>,

    /// Path to scan for env vars
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_SCAN_SIZE)]
    max_size: u64,
  },
}

#[derive(clap::Args)]
struct FileArgs {
  /// Path to the environment file
  #[arg(short, long, default_value = DEFAULT_INSTANCE_FILENAME)]
  env_file: PathBuf,

  /// Path to the example file
  #[arg(short = 'x', long, default_value = DEFAULT_TEMPLATE_FILENAME)]
  example_file: PathBuf,
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    0 => "info",
    1 => "debug",
    _ => "trace",
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
  match command {
    Command::List { dir, path } => {
      let root = dir.unwrap_or(path);
      print!("{}", list::list(root, &Options::default())?);
    }
    Command::Create(args) => {
      print!("{}", write::create(args.env_file, args.example_file)?);
    }
    Command::Update(args) => {
      print!("{}", write::update(args.env_file, args.example_file)?);
    }
    Command::Scan {
      dir,
      path,
      max_size,
    } => {
      let options = Options {
        max_scan_size: max_size,
        ..Options::default()
      };
      for hit in scan::scan(dir.unwrap_or(path), &options)? {
        print!("{}", hit);
      }
    }
  }

  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  match run(cli.command) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("✗ Error: {}", e);
      ExitCode::FAILURE
    }
  }
}
