// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Reconcile `update-alternatives` selections against a desired state.
//!
//! The alternatives tool is treated as an __oracle__: it is the only thing
//! that knows the current state of an alternative group, and the only thing
//! allowed to change it. Oxialt asks it what the group looks like, decides
//! which of its commands need to run, and then runs them.
//!
//! Every invocation flows through the same pipeline:
//!
//! 1. [`probe`] the group through the oracle's display report.
//! 2. [`resolve_link`] if an install is needed but no link was given.
//! 3. [`reconcile`] desired state against the snapshot into a [`Plan`].
//! 4. [`apply`] the plan, or skip it under dry-run.
//!
//! [`converge`] strings all of the above together.

pub mod apply;
pub mod config;
pub mod converge;
pub mod link;
pub mod oracle;
pub mod path;
pub mod plan;
pub mod probe;

pub use apply::{apply, Disposition, Outcome};
pub use converge::{converge, Error, ErrorKind};
pub use link::resolve_link;
pub use oracle::{Oracle, OracleFlavor, Report};
pub use plan::{reconcile, Action, DesiredState, Plan};
pub use probe::{probe, AlternativeGroup, Candidate};
