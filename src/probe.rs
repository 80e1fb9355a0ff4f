// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Current state of an alternative group.
//!
//! An __alternative group__ is a named slot, e.g., "java" or "editor", that
//! has one selection among several registered candidate paths. Oxialt never
//! stores groups. Each invocation rebuilds an [`AlternativeGroup`] snapshot
//! from the oracle's display report, and throws it away afterwards.
//!
//! # Display Report Layout
//!
//! With `LC_ALL=C`, the Debian oracle reports a group like so:
//!
//! ```text
//! vim - manual mode
//!   link best version is /usr/bin/vim.basic
//!   link currently points to /usr/bin/vim.basic
//!   link vim is /usr/bin/vim
//! /usr/bin/vim.basic - priority 30
//! /usr/bin/vim.tiny - priority 10
//! ```
//!
//! The RedHat oracle is close enough, except that candidate lines may carry a
//! family: `/usr/lib/jvm/java-17/bin/java - family java-17 priority 1700`.
//!
//! Only two kinds of line matter: the one naming the current selection, and
//! the candidate lines. Everything else is ignored.

use crate::oracle::{Oracle, OracleError};

use serde::Serialize;
use tracing::{debug, instrument};

const CURRENT_PREFIX: &str = "link currently points to ";

/// Snapshot of an alternative group as reported by the oracle.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeGroup {
    /// Name of the group.
    pub name: String,

    /// Whether the oracle knows about the group at all.
    pub found: bool,

    /// Currently selected candidate path.
    pub current: Option<String>,

    /// Registered candidates in report order.
    pub candidates: Vec<Candidate>,

    /// Symbolic link of the group, if resolved through the oracle.
    pub link: Option<String>,
}

impl AlternativeGroup {
    /// Group that the oracle has never heard of.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Check if `path` is a registered candidate.
    pub fn has_candidate(&self, path: &str) -> bool {
        self.candidates.iter().any(|candidate| candidate.path == path)
    }

    /// Check if `path` is the current selection.
    pub fn is_current(&self, path: &str) -> bool {
        self.current.as_deref() == Some(path)
    }
}

/// Registered candidate of an alternative group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Path to the concrete executable.
    pub path: String,

    /// Priority used by the oracle's automatic selection.
    pub priority: i32,
}

impl Candidate {
    pub fn new(path: impl Into<String>, priority: i32) -> Self {
        Self {
            path: path.into(),
            priority,
        }
    }
}

/// Probe current state of alternative group `name`.
///
/// A failing display report means the group is not registered yet. That is
/// the expected state before the first candidate gets installed, so it is
/// reported through [`AlternativeGroup::found`] instead of an error.
///
/// # Errors
///
/// - Return [`ProbeError::Oracle`] if the oracle cannot be run.
/// - Return [`ProbeError::Parse`] if the oracle succeeded, but its report
///   does not look like a display report.
#[instrument(skip(oracle), level = "debug")]
pub fn probe(oracle: &impl Oracle, name: &str) -> Result<AlternativeGroup> {
    let report = oracle.display(name)?;
    if !report.is_success() {
        debug!("group {name:?} not registered: {}", report.diagnostic());
        return Ok(AlternativeGroup::not_found(name));
    }

    parse_display(name, &report.stdout)
}

/// Parse display report of alternative group `name`.
///
/// # Errors
///
/// - Return [`ProbeError::Parse`] if no current selection is reported, or a
///   candidate line has a malformed priority.
pub fn parse_display(name: &str, report: &str) -> Result<AlternativeGroup> {
    let mut group = AlternativeGroup {
        name: name.into(),
        found: true,
        ..Default::default()
    };

    for line in report.lines() {
        if group.current.is_none() {
            if let Some(current) = line.trim_start().strip_prefix(CURRENT_PREFIX) {
                group.current = Some(current.trim_end().to_string());
                continue;
            }
        }

        if let Some(candidate) = parse_candidate(line) {
            let candidate = candidate.map_err(|reason| ProbeError::Parse {
                name: name.into(),
                reason,
            })?;

            // INVARIANT: Candidate paths are unique within a group.
            if !group.has_candidate(&candidate.path) {
                group.candidates.push(candidate);
            }
        }
    }

    if group.current.is_none() {
        return Err(ProbeError::Parse {
            name: name.into(),
            reason: format!("no {:?} line in display report", CURRENT_PREFIX.trim_end()),
        });
    }

    debug!(
        "group {name:?} points to {:?} with {} candidates",
        group.current,
        group.candidates.len()
    );

    Ok(group)
}

// Candidate lines start at column zero with an absolute path, and come in two
// shapes: "<path> - priority <n>" or "<path> - family <f> priority <n>".
fn parse_candidate(line: &str) -> Option<Result<Candidate, String>> {
    if !line.starts_with('/') {
        return None;
    }

    let (path, priority) = match line.rsplit_once(" - priority ") {
        Some(split) => split,
        None => {
            let (path, family) = line.rsplit_once(" - family ")?;
            let (_, priority) = family.rsplit_once(" priority ")?;
            (path, priority)
        }
    };

    let priority = priority.trim();
    Some(
        priority
            .parse::<i32>()
            .map(|priority| Candidate::new(path.trim_end(), priority))
            .map_err(|_| format!("bad priority {priority:?} for candidate {path:?}")),
    )
}

/// Probe error types.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Oracle succeeded, but its report did not have the expected shape.
    #[error("unexpected display report for alternative group {name:?}: {reason}")]
    Parse { name: String, reason: String },

    /// Oracle could not be run.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Friendly result alias :3
type Result<T, E = ProbeError> = std::result::Result<T, E>;
