// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Desired state and reconciliation planning.
//!
//! Given what the caller wants ([`DesiredState`]) and what the oracle
//! reports ([`AlternativeGroup`]), [`reconcile`] decides the smallest set of
//! oracle commands that closes the gap. Planning is pure. It never talks to
//! the oracle, which keeps every decision testable without one.

use crate::probe::AlternativeGroup;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Priority given to newly installed candidates by default.
pub const DEFAULT_PRIORITY: i32 = 50;

/// Whether a candidate should be selected or gone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Candidate must be registered and selected.
    #[default]
    Present,

    /// Candidate must not be registered.
    Absent,
}

/// What one alternative group should look like.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DesiredState {
    /// Name of alternative group.
    pub name: String,

    /// Candidate path to select or remove.
    pub path: String,

    /// Symbolic link of the group, required to install into a new group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Priority to install the candidate with.
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Whether candidate should be present or absent.
    #[serde(default, rename = "state")]
    pub action: Action,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl DesiredState {
    /// Candidate `path` must be selected for group `name`.
    pub fn present(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            link: None,
            priority: DEFAULT_PRIORITY,
            action: Action::Present,
        }
    }

    /// Candidate `path` must not be registered for group `name`.
    pub fn absent(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            action: Action::Absent,
            ..Self::present(name, path)
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Check if reaching this state from `group` means installing a new
    /// candidate.
    pub fn needs_install(&self, group: &AlternativeGroup) -> bool {
        self.action == Action::Present
            && !group.is_current(&self.path)
            && !group.has_candidate(&self.path)
    }
}

/// Oracle commands needed to reach desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Already converged.
    NoOp,

    /// Install candidate behind `link`, then select it.
    InstallAndSelect { link: String, priority: i32 },

    /// Select an already registered candidate.
    SelectOnly,

    /// Deregister candidate.
    Remove,

    /// Desired state cannot be reached.
    Fail(PlanFailure),
}

impl Plan {
    /// Check if plan would mutate oracle state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::InstallAndSelect { .. } | Self::SelectOnly | Self::Remove
        )
    }

    /// Short name of plan variant.
    pub fn kind(&self) -> PlanKind {
        match self {
            Self::NoOp => PlanKind::NoOp,
            Self::InstallAndSelect { .. } => PlanKind::InstallAndSelect,
            Self::SelectOnly => PlanKind::SelectOnly,
            Self::Remove => PlanKind::Remove,
            Self::Fail(_) => PlanKind::Fail,
        }
    }
}

/// Variant of [`Plan`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    NoOp,
    InstallAndSelect,
    SelectOnly,
    Remove,
    Fail,
}

/// Reason a plan cannot be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFailure {
    /// Candidate must be installed, but no link path is known.
    MissingLink,
}

impl Display for PlanFailure {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MissingLink => fmt.write_str("missing link for installation"),
        }
    }
}

/// Decide how to bring `group` to `desired` state.
///
/// The link used for installation is the caller's, or failing that the one
/// resolved into [`AlternativeGroup::link`]. Priority only matters when
/// installing.
pub fn reconcile(desired: &DesiredState, group: &AlternativeGroup) -> Plan {
    match desired.action {
        Action::Present => {
            if group.is_current(&desired.path) {
                return Plan::NoOp;
            }

            if group.has_candidate(&desired.path) {
                return Plan::SelectOnly;
            }

            match desired.link.as_ref().or(group.link.as_ref()) {
                Some(link) => Plan::InstallAndSelect {
                    link: link.clone(),
                    priority: desired.priority,
                },
                None => Plan::Fail(PlanFailure::MissingLink),
            }
        }
        Action::Absent => {
            if group.has_candidate(&desired.path) {
                Plan::Remove
            } else {
                Plan::NoOp
            }
        }
    }
}
