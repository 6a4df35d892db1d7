use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{bail, Result};
use log::{error, warn};
use walkdir::WalkDir;

use mcdc_checker::analysis::{Analyzer, FileAnalysis};
use mcdc_checker::error::AnalyzeError;
use mcdc_checker::report::{render_summary, render_text, MultiFileReport};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Checks whether branch coverage implies masking MC/DC for every decision"
)]
struct Cli {
    /// Source files or directories; directories are scanned recursively for
    /// `.swift` files
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Emit the structured report as JSON
    #[arg(long)]
    json: bool,

    /// Print only the aggregate summary
    #[arg(long)]
    summary: bool,

    /// Maximum decision arity for the exhaustive reorder search
    #[arg(long, value_name = "N", default_value_t = 5)]
    max_reorder_vars: usize,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => simplelog::LevelFilter::Warn,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let files = collect_source_files(&cli.paths)?;
    if files.is_empty() {
        bail!("no source files found under the given paths");
    }

    let analyzer = Analyzer::new(cli.max_reorder_vars);
    let mut analyses: Vec<FileAnalysis> = Vec::new();
    let mut io_failures = 0usize;
    for path in &files {
        match analyzer.analyze_file(path) {
            Ok(analysis) => analyses.push(analysis),
            Err(err @ AnalyzeError::Parse { .. }) => {
                // A malformed file is skipped; findings are not errors and
                // parse failures do not change the exit code.
                warn!("{}", err);
            }
            Err(err @ AnalyzeError::Io { .. }) => {
                error!("{}", err);
                io_failures += 1;
            }
        }
    }

    let report = MultiFileReport::from_analyses(&analyses);
    if cli.json {
        println!("{}", report.to_json()?);
    } else if cli.summary {
        print!("{}", render_summary(&report.summary));
    } else {
        print!("{}", render_text(&analyses));
        println!();
        print!("{}", render_summary(&report.summary));
    }

    if io_failures > 0 {
        bail!("{} file(s) could not be read", io_failures);
    }
    Ok(())
}

/// Expand the positional arguments into the list of files to analyze.
/// Explicit file arguments are taken as-is; directories contribute their
/// `.swift` files, in sorted traversal order.
fn collect_source_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && has_source_extension(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("{}: no such file or directory", path.display());
        }
    }
    Ok(files)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().map(|ext| ext == "swift").unwrap_or(false)
}
