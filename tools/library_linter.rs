/// Library Linter: checks story libraries for markup problems.
///
/// Usage: library_linter <library_dir|file.mlb> [--ron]

use clap::Parser;
use madlibs::core::library::{
    count_stories, find_library_files, read_library, LIBRARY_EXTENSION,
};
use madlibs::core::parser::{parse_library_with_diagnostics, Diagnostic, ParsedLibrary};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    version,
    about = "Check Mad Libs story libraries for markup problems.",
    long_about = None
)]
struct Cli {
    /// A story library, or a directory of them
    path: PathBuf,

    /// Print every parsed story as RON
    #[arg(long)]
    ron: bool,
}

#[derive(Default)]
struct Report {
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let files = if cli.path.is_file() {
        vec![cli.path.clone()]
    } else {
        match find_library_files(&cli.path, LIBRARY_EXTENSION) {
            Ok(files) => files,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    let mut report = Report::default();
    let mut total_stories = 0;

    for path in &files {
        let text = match read_library(path) {
            Ok(text) => text,
            Err(e) => {
                report.errors.push(e.to_string());
                continue;
            }
        };
        let parsed = parse_library_with_diagnostics(&text);
        println!("  {}: {} stories", path.display(), parsed.stories.len());
        total_stories += parsed.stories.len();

        lint_library(path, &text, &parsed, &mut report);

        if cli.ron {
            match ron::ser::to_string_pretty(&parsed.stories, ron::ser::PrettyConfig::default()) {
                Ok(dump) => println!("{}", dump),
                Err(e) => report
                    .errors
                    .push(format!("{}: could not serialize stories: {}", path.display(), e)),
            }
        }
    }

    println!("\n=== Story Library Lint Report ===\n");

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("All checks passed!");
    }
    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }
    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} libraries, {} stories, {} errors, {} warnings",
        files.len(),
        total_stories,
        report.errors.len(),
        report.warnings.len()
    );

    if report.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn lint_library(path: &Path, text: &str, parsed: &ParsedLibrary, report: &mut Report) {
    let name = path.display();

    for diagnostic in &parsed.diagnostics {
        let message = format!("{}:{}: {}", name, line_of(text, diagnostic.offset()), diagnostic);
        match diagnostic {
            Diagnostic::MalformedEndTag { .. } => report.errors.push(message),
            Diagnostic::UnterminatedPlaceholder { .. } | Diagnostic::EmptyPlaceholder { .. } => {
                report.warnings.push(message)
            }
        }
    }

    // Story selection trusts the end-tag count, so it has to agree with the parse
    let tagged = count_stories(text) as usize;
    if tagged > parsed.stories.len() {
        report.errors.push(format!(
            "{}: {} END STORY tags but only {} stories parsed; later stories can never be played",
            name,
            tagged,
            parsed.stories.len()
        ));
    } else if tagged < parsed.stories.len() {
        report.warnings.push(format!(
            "{}: last story has no END STORY tag and can never be picked",
            name
        ));
    }

    for (i, story) in parsed.stories.iter().enumerate() {
        if story.placeholders.is_empty() {
            report
                .warnings
                .push(format!("{}: story {} '{}' has no blanks", name, i, story.title));
        }

        // Blanks are matched exactly, so near-duplicates are asked for twice
        let mut seen: FxHashMap<&str, &str> = FxHashMap::default();
        for descriptor in &story.placeholders {
            if let Some(other) = seen.insert(descriptor.trim(), descriptor.as_str()) {
                report.warnings.push(format!(
                    "{}: story {} '{}' has blanks '{}' and '{}' that differ only in spacing",
                    name, i, story.title, other, descriptor
                ));
            }
        }
    }
}

/// 1-based line number of a byte offset.
fn line_of(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
