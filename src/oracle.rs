// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Alternatives oracle abstraction.
//!
//! The __oracle__ is the external alternatives management tool, e.g.,
//! `update-alternatives` from dpkg, or `alternatives` from chkconfig on
//! RedHat-like systems. Oxialt never reads or writes the alternatives
//! database itself. All state comes from the oracle's reports, and all
//! mutation goes through the oracle's commands.
//!
//! # Flavors
//!
//! The two common oracle implementations mostly agree on their command line
//! interface, but only the Debian one provides the `--query` operation. This
//! difference is modeled explicitly through [`OracleFlavor`], so callers ask
//! the oracle what it can do instead of guessing from whether a command
//! happened to fail.
//!
//! # Read versus Write
//!
//! Read operations ([`Oracle::display`] and [`Oracle::query`]) hand back the
//! raw [`Report`] regardless of exit status, because a failing display is a
//! legitimate answer ("group not registered"). Mutating operations turn a
//! non-zero exit status into [`OracleError::Execution`] right away.

pub mod update_alternatives;

pub use update_alternatives::UpdateAlternatives;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
};

/// Layer of indirection for alternatives oracle access.
pub trait Oracle {
    /// Which oracle implementation this is.
    fn flavor(&self) -> OracleFlavor;

    /// Report the current configuration of alternative group `name`.
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Spawn`] if the oracle cannot be run at all.
    fn display(&self, name: &str) -> Result<Report>;

    /// Machine-oriented report of alternative group `name`.
    ///
    /// Only meaningful when [`OracleFlavor::supports_query`] holds.
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Spawn`] if the oracle cannot be run at all.
    fn query(&self, name: &str) -> Result<Report>;

    /// Register `path` as a candidate of group `name` behind `link`.
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Spawn`] if the oracle cannot be run at all.
    /// - Return [`OracleError::Execution`] if the oracle rejects the command.
    fn install(&self, link: &str, name: &str, path: &str, priority: i32) -> Result<()>;

    /// Select registered candidate `path` as current for group `name`.
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Spawn`] if the oracle cannot be run at all.
    /// - Return [`OracleError::Execution`] if the oracle rejects the command.
    fn set(&self, name: &str, path: &str) -> Result<()>;

    /// Deregister candidate `path` from group `name`.
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Spawn`] if the oracle cannot be run at all.
    /// - Return [`OracleError::Execution`] if the oracle rejects the command.
    fn remove(&self, name: &str, path: &str) -> Result<()>;
}

/// Known oracle implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleFlavor {
    /// `update-alternatives` shipped with dpkg.
    Debian,

    /// `alternatives` shipped with chkconfig.
    RedHat,
}

impl OracleFlavor {
    /// Determine flavor from the oracle's `--version` output.
    pub fn from_version_banner(banner: &str) -> Self {
        if banner.contains("Debian") || banner.contains("dpkg") {
            Self::Debian
        } else {
            Self::RedHat
        }
    }

    /// Whether the oracle understands `--query`.
    pub fn supports_query(&self) -> bool {
        matches!(self, Self::Debian)
    }
}

impl Display for OracleFlavor {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Debian => fmt.write_str("debian"),
            Self::RedHat => fmt.write_str("redhat"),
        }
    }
}

/// Captured result of one oracle invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    /// Exit code, absent if the oracle was killed by a signal.
    pub status: Option<i32>,

    /// Everything written to standard output.
    pub stdout: String,

    /// Everything written to standard error.
    pub stderr: String,
}

impl Report {
    /// Successful report with given standard output.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed report with given exit code and standard error.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Standard output and standard error merged into one diagnostic message.
    pub fn diagnostic(&self) -> String {
        let mut message = String::new();

        if !self.stderr.is_empty() {
            message.push_str(format!("stderr: {}", self.stderr).as_str());
        }

        if !self.stdout.is_empty() {
            if !message.is_empty() && !message.ends_with('\n') {
                message.push('\n');
            }
            message.push_str(format!("stdout: {}", self.stdout).as_str());
        }

        // INVARIANT: Chomp trailing newlines.
        message.trim_end_matches(['\r', '\n']).to_string()
    }

    /// Turn a failed report of `command` into [`OracleError::Execution`].
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Execution`] if the report is not a success.
    pub fn check(self, command: impl Into<String>) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        Err(OracleError::Execution {
            command: command.into(),
            status: self.status,
            output: self.diagnostic(),
        })
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "termination by signal".into(),
    }
}

/// Oracle error types.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Oracle binary could not be started.
    #[error("failed to run {command:?}")]
    Spawn {
        command: String,
        #[source]
        source: IoError,
    },

    /// Oracle ran, but rejected the command.
    #[error("command {command:?} failed with {}:\n{output}", describe_status(.status))]
    Execution {
        command: String,
        status: Option<i32>,
        output: String,
    },
}

/// Friendly result alias :3
pub type Result<T, E = OracleError> = std::result::Result<T, E>;
