//! dupecat - duplicate file finder
//!
//! Finds files with identical content under a directory by grouping them by
//! size, then by a keyed BLAKE3 fingerprint of their first 1024 bytes. In
//! every duplicate set the first file found is kept and the rest are junk,
//! which can be summarised or deleted.
//!
//! ```no_run
//! use dupecat::duplicates::DuplicateDetector;
//!
//! let mut detector = DuplicateDetector::new("/home/user/Downloads", true);
//! if detector.detect(true).is_ok() {
//!     for junk in detector.junk() {
//!         println!("{}", junk.full_path.display());
//!     }
//! }
//! ```

pub mod actions;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use dialoguer::Confirm;

use crate::actions::delete::{
    delete_batch, validate_preserves_copy, DeleteConfig, DeleteProgressCallback,
};
use crate::analysis::human_size;
use crate::cli::{AnalyseArgs, Cli, Commands, DeleteArgs, OutputFormat, SearchArgs};
use crate::config::Config;
use crate::duplicates::{DetectError, DetectorConfig, DuplicateDetector, IndexSource};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback};

/// Run the command described by `cli`, writing results to stdout.
///
/// Expected-empty outcomes (no files, no duplicates) are reported on stdout
/// and returned as their exit code. Everything else that goes wrong is an
/// error; a [`DetectError`] inside it keeps its specific exit code (see
/// [`ExitCode::from_error`]).
///
/// # Errors
///
/// Returns an error for an invalid path, a bad config file, an interrupted
/// scan, or a failed write to stdout.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(workers) = cli.workers {
        config.workers = usize::from(workers);
    }
    if cli.no_recurse {
        config.recursive = false;
    }
    if cli.no_color {
        config.color = false;
    }
    log::debug!("Effective configuration: {:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Commands::Config = cli.command {
        return print_config(&mut out, &cli, &config);
    }

    let handler = signal::install_handler()?;

    let json = matches!(
        cli.command,
        Commands::Search(SearchArgs {
            output: OutputFormat::Json,
            ..
        })
    );
    let progress = Arc::new(Progress::new(cli.quiet || json));

    let detector_config = DetectorConfig::new(config.recursive)
        .with_workers(config.workers)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress.clone() as Arc<dyn ProgressCallback>);
    let mut detector = DuplicateDetector::with_config(&cli.path, detector_config);
    let text = TextOutput::new(config.color);

    match cli.command {
        Commands::Search(args) => {
            let use_hash = config.use_hash && !args.size_only;
            search(&mut detector, &args, use_hash, &text, &mut out)
        }
        Commands::Analyse(AnalyseArgs { size_only }) => {
            let use_hash = config.use_hash && !size_only;
            analyse(&mut detector, use_hash, &text, &mut out)
        }
        Commands::Delete(args) => {
            let use_hash = config.use_hash && !args.size_only;
            delete(&mut detector, &args, use_hash, &text, &mut out, &progress)
        }
        Commands::Config => Ok(ExitCode::Success),
    }
}

fn print_config<W: Write>(out: &mut W, cli: &Cli, config: &Config) -> Result<ExitCode> {
    let source = cli.config.clone().or_else(Config::default_path);
    match source {
        Some(path) => writeln!(out, "# config file: {}", path.display())?,
        None => writeln!(out, "# config file: <none>")?,
    }
    write!(out, "{}", config.to_toml()?)?;
    Ok(ExitCode::Success)
}

/// Run detection, turning the expected-empty outcomes into exit codes.
///
/// `Ok(None)` means duplicates are available on the detector.
fn detect_or_report<W: Write>(
    detector: &mut DuplicateDetector,
    use_hash: bool,
    text: &TextOutput,
    out: &mut W,
) -> Result<Option<ExitCode>> {
    match detector.detect(use_hash) {
        Ok(_) => Ok(None),
        Err(DetectError::NoFilesFound(path)) => {
            text.write_no_files(out, &path)?;
            Ok(Some(ExitCode::NoFiles))
        }
        Err(DetectError::NoDuplicatesFound) => {
            text.write_no_duplicates(out)?;
            Ok(Some(ExitCode::NoDuplicates))
        }
        Err(e) => Err(e.into()),
    }
}

fn source_of(use_hash: bool) -> IndexSource {
    if use_hash {
        IndexSource::Hash
    } else {
        IndexSource::Size
    }
}

fn search<W: Write>(
    detector: &mut DuplicateDetector,
    args: &SearchArgs,
    use_hash: bool,
    text: &TextOutput,
    out: &mut W,
) -> Result<ExitCode> {
    if args.output == OutputFormat::Json {
        let code = match detector.detect(use_hash) {
            Ok(_) => ExitCode::Success,
            Err(DetectError::NoFilesFound(_)) => ExitCode::NoFiles,
            Err(DetectError::NoDuplicatesFound) => ExitCode::NoDuplicates,
            Err(e) => return Err(e.into()),
        };
        let source = detector.source().unwrap_or(source_of(use_hash));
        JsonOutput::new(&detector.groups(), source, detector.analyse()).write_to(out)?;
        return Ok(code);
    }

    if let Some(code) = detect_or_report(detector, use_hash, text, out)? {
        return Ok(code);
    }
    let groups = detector.groups();
    text.write_groups(out, &groups, source_of(use_hash))?;
    text.write_found(out, groups.len())?;
    Ok(ExitCode::Success)
}

fn analyse<W: Write>(
    detector: &mut DuplicateDetector,
    use_hash: bool,
    text: &TextOutput,
    out: &mut W,
) -> Result<ExitCode> {
    if let Some(code) = detect_or_report(detector, use_hash, text, out)? {
        return Ok(code);
    }
    match detector.analyse() {
        Some(analysis) => text.write_analysis(out, &analysis)?,
        None => text.write_no_duplicates(out)?,
    }
    Ok(ExitCode::Success)
}

fn delete<W: Write>(
    detector: &mut DuplicateDetector,
    args: &DeleteArgs,
    use_hash: bool,
    text: &TextOutput,
    out: &mut W,
    progress: &Progress,
) -> Result<ExitCode> {
    if let Some(code) = detect_or_report(detector, use_hash, text, out)? {
        return Ok(code);
    }

    for group in detector.groups() {
        let all: Vec<_> = group.files.iter().map(|f| f.full_path.clone()).collect();
        validate_preserves_copy(&all[1..], &all)?;
    }

    let junk = detector.junk();
    let reclaimable: u64 = junk.iter().map(|f| f.size).sum();

    if !args.yes {
        // Keep the prompt from interleaving with buffered stdout
        out.flush()?;
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} junk files ({})?",
                junk.len(),
                human_size(reclaimable)
            ))
            .default(false)
            .interact()
            .context("confirmation prompt failed (use --yes when not on a terminal)")?;
        if !confirmed {
            writeln!(out, "Aborted, nothing deleted.")?;
            return Ok(ExitCode::Success);
        }
    }

    let delete_config = if args.trash {
        DeleteConfig::trash()
    } else {
        DeleteConfig::default()
    };
    let result = delete_batch(
        junk,
        &delete_config,
        Some(progress as &dyn DeleteProgressCallback),
    );

    writeln!(out, "{}", result.summary())?;
    for (path, message) in &result.failures {
        writeln!(out, "  failed: {} ({})", path.display(), message)?;
    }

    if result.all_succeeded() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::GeneralError)
    }
}
