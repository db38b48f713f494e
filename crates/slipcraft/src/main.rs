use std::fs::File;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, bail};
use clap::Parser;
use slipcraft_archive::inspect::read_entries;
use slipcraft_archive::{ArchiveEntry, ArchiveFormat, CraftOptions, CraftReport, craft, landing, prepare};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::App;

mod cli;
mod exit_codes;

fn main() {
    let app = App::parse();
    init_tracing(app.verbose);

    let code = match run(&app) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

/// `RUST_LOG` wins; otherwise errors only, or everything down to debug with `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(app: &App) -> Result<()> {
    debug!(?app, "arguments");

    let format: ArchiveFormat = app.archive_type.parse()?;
    let mut options = CraftOptions::default().format(format);
    if let Some(secs) = app.mtime {
        options = options.timestamp(SystemTime::UNIX_EPOCH + Duration::from_secs(secs));
    }

    if app.dry_run {
        return print_plan(app);
    }

    let report = craft(&app.input, &app.relative_path, &app.output, &options)
        .with_context(|| format!("failed to create {format} archive '{}'", app.output.display()))?;

    if app.verify {
        verify(app, &report)?;
    }
    Ok(())
}

fn print_plan(app: &App) -> Result<()> {
    let layout = prepare(&app.input, &app.relative_path)?;
    let landing = landing(&layout)?;

    for entry in layout.entries() {
        match entry {
            ArchiveEntry::Directory { path } => println!("dir   {path}"),
            ArchiveEntry::Symlink { path, target } => println!("link  {path} -> {target}"),
            ArchiveEntry::File { path, source } => {
                println!("file  {path} <- {}", source.display())
            }
        }
    }
    println!("payload lands at {landing} (relative to the extraction root)");
    Ok(())
}

fn verify(app: &App, report: &CraftReport) -> Result<()> {
    let layout = prepare(&app.input, &app.relative_path)?;
    let payload = std::fs::read(&app.input)
        .with_context(|| format!("failed to re-read '{}'", app.input.display()))?;
    let archive = File::open(&report.destination)
        .with_context(|| format!("failed to open '{}'", report.destination.display()))?;
    let entries = read_entries(archive, report.format)?;

    if !layout.matches(&entries, &payload) {
        bail!(
            "'{}' does not match the planned layout ({} entries decoded, {} planned)",
            report.destination.display(),
            entries.len(),
            layout.len()
        );
    }
    info!(entries = entries.len(), "archive verified");
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<slipcraft_archive::Error>() {
        return exit_codes::for_kind(err.kind());
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return exit_codes::IO_ERROR;
    }
    exit_codes::FORMAT_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_their_kind() {
        let err = anyhow::Error::new(slipcraft_archive::Error::UnsupportedFormat("rar".into()))
            .context("failed to create archive");
        assert_eq!(exit_code(&err), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn destination_write_failure_maps_to_io() {
        let err = anyhow::Error::new(slipcraft_archive::Error::Write {
            path: "sub/".into(),
            source: std::io::Error::other("disk full"),
        })
        .context("failed to create zip archive 'out.zip'");
        assert_eq!(exit_code(&err), exit_codes::IO_ERROR);
    }

    #[test]
    fn io_errors_map_to_io() {
        let err = anyhow::Error::new(std::io::Error::other("gone")).context("failed to open");
        assert_eq!(exit_code(&err), exit_codes::IO_ERROR);
    }

    #[test]
    fn verify_mismatch_is_a_format_error() {
        let err = anyhow::anyhow!("does not match the planned layout");
        assert_eq!(exit_code(&err), exit_codes::FORMAT_ERROR);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pwn.sh");
        std::fs::write(&input, "echo hi").unwrap();
        let output = dir.path().join("out.zip");

        let app = App::try_parse_from([
            "slipcraft",
            "--dry-run",
            input.to_str().unwrap(),
            "../../tmp/pwn.sh",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(&app).unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn verify_accepts_fresh_archive() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pwn.sh");
        std::fs::write(&input, "echo hi").unwrap();
        let output = dir.path().join("out.tar");

        let app = App::try_parse_from([
            "slipcraft",
            "-t",
            "tar",
            "--verify",
            input.to_str().unwrap(),
            "../tmp/pwn.sh",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run(&app).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn unknown_archive_type() {
        let app = App::try_parse_from(["slipcraft", "-t", "rar", "in", "../x", "out"]).unwrap();
        let err = run(&app).unwrap_err();
        assert_eq!(exit_code(&err), exit_codes::CONFIG_ERROR);
    }
}
