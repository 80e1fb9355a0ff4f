// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Plan execution.
//!
//! Carries out a [`Plan`] by issuing oracle commands in a fixed order. The
//! first failing command aborts the rest. Nothing is retried.
//!
//! # Known Limitation
//!
//! [`Plan::InstallAndSelect`] takes two oracle commands. If the install goes
//! through but the select does not, the new candidate stays registered while
//! the invocation reports failure. The oracle offers no transaction to roll
//! that back.

use crate::{
    oracle::{Oracle, OracleError},
    plan::{DesiredState, Plan, PlanFailure, PlanKind},
};

use serde::Serialize;
use tracing::{info, instrument, warn};

/// Where an invocation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Nothing to do.
    Unchanged,

    /// Oracle commands were issued and all succeeded.
    Applied,

    /// Oracle commands would have been issued, but dry-run was requested.
    SkippedDryRun,
}

/// Result of applying a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Whether oracle state changed, or would have under dry-run.
    pub changed: bool,

    /// Terminal state of the invocation.
    pub disposition: Disposition,

    /// Plan that was carried out.
    pub plan: PlanKind,

    /// Selection before the plan was carried out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
}

impl Outcome {
    fn new(disposition: Disposition, plan: &Plan, previous: Option<String>) -> Self {
        Self {
            changed: disposition != Disposition::Unchanged,
            disposition,
            plan: plan.kind(),
            previous,
        }
    }
}

/// Apply `plan` to reach `desired` state through the oracle.
///
/// The `previous` selection is only carried through to the [`Outcome`].
///
/// # Errors
///
/// - Return [`ApplyError::MissingLink`] if the plan is
///   [`Plan::Fail`] because no link path is known.
/// - Return [`ApplyError::Oracle`] if any oracle command fails.
#[instrument(
    skip(oracle, desired, previous),
    fields(name = %desired.name, path = %desired.path),
    level = "debug"
)]
pub fn apply(
    oracle: &impl Oracle,
    desired: &DesiredState,
    plan: &Plan,
    previous: Option<String>,
    dry_run: bool,
) -> Result<Outcome> {
    let DesiredState { name, path, .. } = desired;

    match plan {
        Plan::Fail(PlanFailure::MissingLink) => {
            return Err(ApplyError::MissingLink {
                name: name.clone(),
                path: path.clone(),
            });
        }
        Plan::NoOp => {
            info!("alternative group {name:?} already converged on {path:?}");
            return Ok(Outcome::new(Disposition::Unchanged, plan, previous));
        }
        _ if dry_run => {
            if let Plan::InstallAndSelect { link, priority } = plan {
                warn!(
                    "dry-run: would install {path:?} into {name:?} behind {link:?} \
                     at priority {priority}"
                );
            }
            info!("dry-run: skip {:?} of {path:?} for {name:?}", plan.kind());
            return Ok(Outcome::new(Disposition::SkippedDryRun, plan, previous));
        }
        // INVARIANT: Selection presumes prior installation.
        Plan::InstallAndSelect { link, priority } => {
            oracle.install(link, name, path, *priority)?;
            oracle.set(name, path)?;
        }
        Plan::SelectOnly => oracle.set(name, path)?,
        Plan::Remove => oracle.remove(name, path)?,
    }

    Ok(Outcome::new(Disposition::Applied, plan, previous))
}

/// Plan execution error types.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// Candidate must be installed, but no link path is known.
    #[error(
        "cannot install {path:?} into alternative group {name:?}: missing link for installation"
    )]
    MissingLink { name: String, path: String },

    /// Oracle command failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Friendly result alias :3
type Result<T, E = ApplyError> = std::result::Result<T, E>;
