mod config;
mod list;

use camino::Utf8PathBuf;
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser};
use pkginspect_core::adapters::LocalBuildGatherer;
use pkginspect_core::error::EXIT_INSPECTION_FAILED;
use pkginspect_core::pipeline::run_session;
use pkginspect_core::selection::{SelectionRequest, resolve_selection};
use pkginspect_core::settings::{DEFAULT_WORKDIR, RunSettings};
use pkginspect_core::workdir::{DEFAULT_MODE, expand_workdir};
use pkginspect_core::{InspectError, Registry, ToolInfo, UsageError};
use pkginspect_render::{Destination, dispatch, find_format};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pkginspect",
    version,
    about = "Policy-compliance inspections for a package build or a before/after build pair.",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Configuration file (default: /etc/pkginspect/pkginspect.toml).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// Comma-separated inspections to run, or ALL.
    #[arg(short = 'T', long = "tests", value_name = "LIST", action = ArgAction::Append)]
    tests: Vec<String>,

    /// Comma-separated inspections to skip, or ALL. Cannot be combined with -T.
    #[arg(short = 'E', long = "exclude", value_name = "LIST", action = ArgAction::Append)]
    exclude: Vec<String>,

    /// Comma-separated architectures to restrict to.
    #[arg(short = 'a', long = "arches", value_name = "LIST")]
    arches: Option<String>,

    /// Product release string; skips deriving it from the build ids.
    #[arg(short = 'r', long = "release", value_name = "STR")]
    release: Option<String>,

    /// Write results to FILE instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<Utf8PathBuf>,

    /// Output format (see -l).
    #[arg(short = 'F', long = "format", value_name = "TYPE")]
    format: Option<String>,

    /// List available output formats and inspections.
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Scratch directory root.
    #[arg(short = 'w', long = "workdir", value_name = "PATH")]
    workdir: Option<String>,

    /// Gather the after build into the working directory and stop (implies -k).
    #[arg(short = 'f', long = "fetch-only")]
    fetch_only: bool,

    /// Keep the working directory.
    #[arg(short = 'k', long = "keep")]
    keep: bool,

    /// Verbose diagnostics on stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print help.
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version.
    #[arg(short = 'V', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// After build, or before and after builds.
    #[arg(value_name = "BUILD")]
    builds: Vec<String>,
}

fn main() -> ExitCode {
    let matches = Cli::command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    init_tracing(cli.verbose);

    match real_main(&cli, &matches) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("*** {err}");
            if err.wants_help_hint() {
                eprintln!("*** See `pkginspect --help` for more information.");
            }
            if let Some(path) = err.retained() {
                eprintln!("Keeping working directory: {path}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: &Cli, matches: &ArgMatches) -> Result<u8, InspectError> {
    let registry = Registry::builtin();

    if cli.list {
        print!("{}", list::render_listing(&registry));
        return Ok(0);
    }

    let selection = resolve_selection(&selection_requests(cli, matches), &registry)?;

    let format = cli
        .format
        .as_deref()
        .map(|name| {
            find_format(name)
                .map(|f| f.id)
                .ok_or_else(|| UsageError::UnknownFormat(name.to_string()))
        })
        .transpose()?;

    let config = config::resolve_config(cli.config.as_deref())?;

    let workdir = match cli.workdir.as_deref().or(config.common.workdir.as_deref()) {
        Some(raw) => expand_workdir(raw)?,
        None => Utf8PathBuf::from(DEFAULT_WORKDIR),
    };

    let settings = RunSettings {
        workdir,
        workdir_mode: DEFAULT_MODE,
        builds: cli.builds.clone(),
        release: cli.release.clone(),
        arches: cli.arches.clone(),
        selection,
        fetch_only: cli.fetch_only,
        keep: cli.keep,
        inspection: config.inspection_settings(),
    }
    .normalized();
    debug!(?settings, "resolved run settings");

    let outcome = run_session(
        &settings,
        &registry,
        &LocalBuildGatherer,
        &config.architecture_catalog(),
        tool_info(),
    )?;

    let destination = cli
        .output
        .clone()
        .map_or(Destination::Stdout, Destination::File);
    dispatch(outcome.results.as_ref(), format, &destination)?;

    // stdout carries only the report
    if let Some(path) = &outcome.retained {
        eprintln!("Keeping working directory: {path}");
    }

    Ok(if outcome.failed() {
        EXIT_INSPECTION_FAILED
    } else {
        0
    })
}

/// `-T` and `-E` occurrences in command-line order.
fn selection_requests(cli: &Cli, matches: &ArgMatches) -> Vec<SelectionRequest> {
    let mut ordered: Vec<(usize, SelectionRequest)> = Vec::new();

    if let Some(indices) = matches.indices_of("tests") {
        ordered.extend(
            indices
                .zip(&cli.tests)
                .map(|(i, list)| (i, SelectionRequest::Include(list.clone()))),
        );
    }
    if let Some(indices) = matches.indices_of("exclude") {
        ordered.extend(
            indices
                .zip(&cli.exclude)
                .map(|(i, list)| (i, SelectionRequest::Exclude(list.clone()))),
        );
    }

    ordered.sort_by_key(|(i, _)| *i);
    ordered.into_iter().map(|(_, request)| request).collect()
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "pkginspect".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
