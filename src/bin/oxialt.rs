// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use oxialt::{
    config::{FlavorChoice, Manifest, OracleSettings},
    converge,
    oracle::UpdateAlternatives,
    path::{absolute_path, default_manifest_path, find_oracle},
    plan::{PlanKind, DEFAULT_PRIORITY},
    probe, resolve_link, AlternativeGroup, DesiredState, Disposition, Error, ErrorKind, Oracle,
    Outcome,
};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::{fs::read_to_string, path::PathBuf, process::exit};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "oxialt [options] <oxialt-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Report what would change without running mutating oracle commands.
    #[arg(short = 'n', long, global = true)]
    pub check: bool,

    /// Name of, or path to, the alternatives oracle binary.
    #[arg(long, global = true, value_name = "command")]
    pub oracle: Option<PathBuf>,

    /// Oracle flavor to assume instead of asking the oracle.
    #[arg(long, global = true, value_enum, value_name = "flavor")]
    pub flavor: Option<FlavorArg>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<bool> {
        match self.command {
            Command::Present(ref opts) => {
                let mut desired = DesiredState::present(&opts.name, &opts.path)
                    .with_priority(opts.priority);
                desired.link = opts.link.clone();
                self.run_single(desired)
            }
            Command::Absent(ref opts) => {
                self.run_single(DesiredState::absent(&opts.name, &opts.path))
            }
            Command::Apply(ref opts) => self.run_apply(opts),
            Command::Show(ref opts) => self.run_show(opts),
        }
    }

    fn open_oracle(&self, settings: &OracleSettings) -> Result<UpdateAlternatives, Error> {
        let command = self.oracle.as_ref().or(settings.command.as_ref());
        let bin = find_oracle(command.map(PathBuf::as_path))?;
        let choice = self.flavor.map(FlavorChoice::from).unwrap_or(settings.flavor);

        let oracle = match choice.fixed() {
            Some(flavor) => UpdateAlternatives::new(bin, flavor),
            None => UpdateAlternatives::detect(bin)?,
        };
        info!("use {} oracle at {}", oracle.flavor(), oracle.bin().display());

        Ok(oracle)
    }

    fn run_single(&self, desired: DesiredState) -> Result<bool> {
        let result = self
            .open_oracle(&OracleSettings::default())
            .and_then(|oracle| converge(&oracle, &desired, self.check));

        Response::new(&desired, result).report()
    }

    fn run_apply(&self, opts: &ApplyOptions) -> Result<bool> {
        let manifest = match load_manifest(opts) {
            Ok(manifest) => manifest,
            Err(error) => return Response::failure(None, error).report(),
        };

        let oracle = match self.open_oracle(&manifest.oracle) {
            Ok(oracle) => oracle,
            Err(error) => return Response::failure(None, error).report(),
        };
        let mut failed = false;

        // INVARIANT: Entries are independent, so one failure does not stop the rest.
        for desired in &manifest.alternatives {
            let response = Response::new(desired, converge(&oracle, desired, self.check));
            failed |= response.report()?;
        }

        Ok(failed)
    }

    fn run_show(&self, opts: &ShowOptions) -> Result<bool> {
        match self.show_group(&opts.name) {
            Ok(group) => {
                println!("{}", serde_json::to_string(&group)?);
                Ok(false)
            }
            Err(error) => Response::failure(Some(&opts.name), error).report(),
        }
    }

    fn show_group(&self, name: &str) -> Result<AlternativeGroup, Error> {
        let oracle = self.open_oracle(&OracleSettings::default())?;
        let mut group = probe(&oracle, name)?;
        if group.found {
            group.link = resolve_link(&oracle, name)?;
        }

        Ok(group)
    }
}

fn load_manifest(opts: &ApplyOptions) -> Result<Manifest, Error> {
    let path = match &opts.manifest {
        Some(path) => path.clone(),
        None => default_manifest_path()?,
    };
    let data = read_to_string(&path).map_err(|source| Error::Manifest {
        path: path.clone(),
        source,
    })?;
    let manifest: Manifest = data.parse()?;
    debug!("loaded manifest {}:\n{manifest}", path.display());

    Ok(manifest)
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Make path the selected alternative of a group, installing it if needed.
    #[command(override_usage = "oxialt present [options] <name> <path>")]
    Present(PresentOptions),

    /// Make sure path is not registered as an alternative of a group.
    #[command(override_usage = "oxialt absent [options] <name> <path>")]
    Absent(AbsentOptions),

    /// Reconcile every alternative listed in a manifest.
    #[command(override_usage = "oxialt apply [options]")]
    Apply(ApplyOptions),

    /// Show current state of a group as reported by the oracle.
    #[command(override_usage = "oxialt show [options] <name>")]
    Show(ShowOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PresentOptions {
    /// Generic name of the alternative group.
    #[arg(required = true, value_name = "name")]
    pub name: String,

    /// Absolute path to the real executable the link should point to.
    #[arg(required = true, value_name = "path", value_parser = absolute_path)]
    pub path: String,

    /// Absolute path to the symbolic link, needed to install into a new group.
    #[arg(short, long, value_name = "link", value_parser = absolute_path)]
    pub link: Option<String>,

    /// Priority to install the alternative with.
    #[arg(
        short,
        long,
        value_name = "priority",
        default_value_t = DEFAULT_PRIORITY,
        allow_negative_numbers = true
    )]
    pub priority: i32,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct AbsentOptions {
    /// Generic name of the alternative group.
    #[arg(required = true, value_name = "name")]
    pub name: String,

    /// Absolute path of the alternative to remove.
    #[arg(required = true, value_name = "path", value_parser = absolute_path)]
    pub path: String,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ApplyOptions {
    /// Manifest to read instead of the default one.
    #[arg(short, long, value_name = "path")]
    pub manifest: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ShowOptions {
    /// Generic name of the alternative group.
    #[arg(required = true, value_name = "name")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FlavorArg {
    Auto,
    Debian,
    Redhat,
}

impl From<FlavorArg> for FlavorChoice {
    fn from(flavor: FlavorArg) -> Self {
        match flavor {
            FlavorArg::Auto => Self::Auto,
            FlavorArg::Debian => Self::Debian,
            FlavorArg::Redhat => Self::RedHat,
        }
    }
}

/// Structured result of one reconciliation, printed as one JSON line.
#[derive(Debug, Default, Serialize)]
struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    changed: bool,

    failed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    disposition: Option<Disposition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<PlanKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
}

impl Response {
    fn new(desired: &DesiredState, result: Result<Outcome, Error>) -> Self {
        match result {
            Ok(outcome) => Self {
                name: Some(desired.name.clone()),
                path: Some(desired.path.clone()),
                changed: outcome.changed,
                disposition: Some(outcome.disposition),
                plan: Some(outcome.plan),
                previous: outcome.previous,
                ..Default::default()
            },
            Err(error) => Self {
                path: Some(desired.path.clone()),
                ..Self::failure(Some(&desired.name), error)
            },
        }
    }

    fn failure(name: Option<&str>, error: Error) -> Self {
        let kind = error.kind();
        Self {
            name: name.map(ToString::to_string),
            failed: kind.is_fatal(),
            kind: Some(kind),
            msg: Some(format!("{:#}", anyhow::Error::from(error))),
            ..Default::default()
        }
    }

    /// Print as one JSON line, telling whether the invocation failed.
    fn report(self) -> Result<bool> {
        if let Some(msg) = &self.msg {
            error!("{msg}");
        } else if self.disposition == Some(Disposition::SkippedDryRun) {
            info!("check mode: no oracle command was issued");
        }
        println!("{}", serde_json::to_string(&self)?);

        Ok(self.failed)
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    match run() {
        Ok(false) => exit(0),
        Ok(true) => exit(1),
        Err(error) => {
            error!("{error:?}");
            exit(1);
        }
    }
}

fn run() -> Result<bool> {
    Cli::parse().run()
}
