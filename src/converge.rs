// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! One full reconciliation of an alternative group.
//!
//! Each invocation walks `Start → Probed → Planned`, and ends in one of three
//! terminal states: applied, failed, or skipped under dry-run. No state
//! survives between invocations.

use crate::{
    apply::{apply, ApplyError, Outcome},
    config::ConfigError,
    link::resolve_link,
    oracle::{Oracle, OracleError},
    path::PathError,
    plan::{reconcile, DesiredState},
    probe::{probe, ProbeError},
};

use serde::Serialize;
use std::{io::Error as IoError, path::PathBuf};
use tracing::{debug, instrument};

/// Bring alternative group of `desired` state into that state.
///
/// Resolves the group's link through the oracle only when a new candidate
/// must be installed and the caller did not supply one.
///
/// # Errors
///
/// - Return [`Error::Probe`] if current state cannot be determined.
/// - Return [`Error::Oracle`] if link resolution cannot run the oracle.
/// - Return [`Error::Apply`] if the plan fails or cannot be carried out.
#[instrument(
    skip(oracle, desired),
    fields(name = %desired.name, path = %desired.path),
    level = "debug"
)]
pub fn converge(oracle: &impl Oracle, desired: &DesiredState, dry_run: bool) -> Result<Outcome> {
    let mut group = probe(oracle, &desired.name)?;

    if desired.link.is_none() && group.found && desired.needs_install(&group) {
        group.link = resolve_link(oracle, &desired.name)?;
    }

    let plan = reconcile(desired, &group);
    debug!("plan for {:?}: {plan:?}", desired.name);

    Ok(apply(oracle, desired, &plan, group.current, dry_run)?)
}

/// Machine-distinguishable error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Alternative group not registered yet.
    ///
    /// Informational only. An unregistered group is a normal snapshot, so
    /// [`Error::kind`] never returns this kind.
    NotFound,

    /// Oracle report had an unexpected shape.
    Parse,

    /// Installation required, but no link path given.
    MissingLink,

    /// Oracle could not be run, or rejected a command.
    OracleExecution,

    /// Desired state could not be loaded.
    Config,
}

impl ErrorKind {
    /// Whether this kind should end the invocation with failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// All possible error types for reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Current state could not be determined.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Plan could not be carried out.
    #[error(transparent)]
    Apply(#[from] ApplyError),

    /// Oracle could not be run.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Desired state could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Manifest file could not be read.
    #[error("cannot read manifest {}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    /// Oracle binary or configuration directory could not be located.
    #[error(transparent)]
    Path(#[from] PathError),
}

impl Error {
    /// Classify error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Probe(ProbeError::Parse { .. }) => ErrorKind::Parse,
            Self::Probe(ProbeError::Oracle(_)) => ErrorKind::OracleExecution,
            Self::Apply(ApplyError::MissingLink { .. }) => ErrorKind::MissingLink,
            Self::Apply(ApplyError::Oracle(_)) => ErrorKind::OracleExecution,
            Self::Oracle(_) => ErrorKind::OracleExecution,
            Self::Config(_) | Self::Manifest { .. } => ErrorKind::Config,
            Self::Path(PathError::NoConfigDir) => ErrorKind::Config,
            Self::Path(_) => ErrorKind::OracleExecution,
        }
    }
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
