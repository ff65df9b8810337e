/// Mad Libs: pick a story, fill in its blanks, read the result.
///
/// Usage: madlibs [STORY] [--dir <dir>] [--cache <file>] [--config <file>] [--seed <n>] [--list]
///
/// Without STORY a story is picked at random across every `*.mlb` library
/// in the library directory. Logging goes to stderr; set `RUST_LOG` to see
/// more than warnings.

use clap::Parser;
use madlibs::core::game::{GameError, MadLibs};
use madlibs::core::words::ConsoleWords;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Fill in the blanks of a story picked from your story libraries.",
    long_about = None
)]
struct Cli {
    /// Global story number to play instead of a random one
    story: Option<u32>,

    /// Directory holding the .mlb story libraries
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Story-count cache file (default: strche.dat in the library directory)
    #[arg(long)]
    cache: Option<PathBuf>,

    /// RON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random story choice
    #[arg(long)]
    seed: Option<u64>,

    /// List every story with its number, then exit
    #[arg(short, long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `--help` and `--version` succeed; every usage error exits 1 like any
/// other failure.
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

fn run(cli: Cli) -> Result<(), GameError> {
    let mut builder = MadLibs::builder();
    if let Some(path) = cli.config {
        builder = builder.config_file(path);
    }
    if let Some(dir) = cli.dir {
        builder = builder.library_dir(dir);
    }
    if let Some(cache) = cli.cache {
        builder = builder.cache_path(cache);
    }
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    let mut game = builder.build()?;

    if cli.list {
        for entry in game.catalog()? {
            let file = entry
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("{:>4}  {}  [{}]", entry.global_index, entry.title, file);
        }
        return Ok(());
    }

    let selected = game.select(cli.story)?;
    let mut words = ConsoleWords::stdio();
    let mut stdout = std::io::stdout().lock();
    game.play(&selected, &mut words, &mut stdout)?;
    Ok(())
}
