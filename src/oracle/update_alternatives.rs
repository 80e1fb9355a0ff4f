// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Oracle backed by the real alternatives binary.

use crate::oracle::{Oracle, OracleError, OracleFlavor, Report, Result};

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info, instrument};

/// Oracle access through a child process of `update-alternatives` or
/// `alternatives`.
#[derive(Debug, Clone)]
pub struct UpdateAlternatives {
    bin: PathBuf,
    flavor: OracleFlavor,
}

impl UpdateAlternatives {
    /// Construct new oracle with a known flavor.
    pub fn new(bin: impl Into<PathBuf>, flavor: OracleFlavor) -> Self {
        Self {
            bin: bin.into(),
            flavor,
        }
    }

    /// Construct new oracle, and determine its flavor from `--version`.
    ///
    /// # Errors
    ///
    /// - Return [`OracleError::Spawn`] if the binary cannot be run.
    #[instrument(skip(bin), level = "debug")]
    pub fn detect(bin: impl Into<PathBuf>) -> Result<Self> {
        let bin = bin.into();
        let report = syscall(&bin, ["--version"])?;
        let flavor = OracleFlavor::from_version_banner(&report.stdout);
        debug!("{} looks like the {flavor} oracle", bin.display());

        Ok(Self { bin, flavor })
    }

    /// Path to oracle binary.
    pub fn bin(&self) -> &Path {
        self.bin.as_path()
    }

    fn syscall_checked(&self, args: &[&str]) -> Result<()> {
        info!("{}", command_line(&self.bin, args));
        syscall(&self.bin, args)?.check(command_line(&self.bin, args))?;

        Ok(())
    }
}

impl Oracle for UpdateAlternatives {
    fn flavor(&self) -> OracleFlavor {
        self.flavor
    }

    #[instrument(skip(self), level = "debug")]
    fn display(&self, name: &str) -> Result<Report> {
        syscall(&self.bin, ["--display", name])
    }

    #[instrument(skip(self), level = "debug")]
    fn query(&self, name: &str) -> Result<Report> {
        syscall(&self.bin, ["--query", name])
    }

    fn install(&self, link: &str, name: &str, path: &str, priority: i32) -> Result<()> {
        let priority = priority.to_string();
        self.syscall_checked(&["--install", link, name, path, priority.as_str()])
    }

    fn set(&self, name: &str, path: &str) -> Result<()> {
        self.syscall_checked(&["--set", name, path])
    }

    fn remove(&self, name: &str, path: &str) -> Result<()> {
        self.syscall_checked(&["--remove", name, path])
    }
}

// INVARIANT: Always run oracle under C locale so its reports stay parseable.
fn syscall(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<Report> {
    let args = args
        .into_iter()
        .map(|arg| arg.as_ref().to_os_string())
        .collect::<Vec<_>>();
    let line = command_line(cmd.as_ref(), &args);
    debug!("run {line}");

    let output = Command::new(cmd.as_ref())
        .args(&args)
        .env("LC_ALL", "C")
        .output()
        .map_err(|source| OracleError::Spawn {
            command: line.clone(),
            source,
        })?;

    let report = Report {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(output.stdout.as_slice()).into_owned(),
        stderr: String::from_utf8_lossy(output.stderr.as_slice()).into_owned(),
    };
    debug!("{line} exited with {:?}", report.status);

    Ok(report)
}

fn command_line(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> String {
    let mut line = cmd.as_ref().to_string_lossy().into_owned();
    for arg in args {
        line.push(' ');
        line.push_str(arg.as_ref().to_string_lossy().as_ref());
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_line_joins_arguments() {
        let line = command_line(
            "/usr/bin/update-alternatives",
            ["--install", "/usr/bin/vim", "vim", "/usr/bin/vim.nox", "40"],
        );
        assert_eq!(
            line,
            "/usr/bin/update-alternatives --install /usr/bin/vim vim /usr/bin/vim.nox 40"
        );
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let oracle = UpdateAlternatives::new(
            "/nonexistent/oxialt/update-alternatives",
            OracleFlavor::Debian,
        );
        let result = oracle.display("vim");
        assert!(matches!(result, Err(OracleError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_mutation_is_execution_error() {
        // `false` ignores its arguments and always exits with 1.
        let oracle = UpdateAlternatives::new("false", OracleFlavor::Debian);
        let result = oracle.set("vim", "/usr/bin/vim.tiny");
        match result {
            Err(OracleError::Execution { command, status, .. }) => {
                assert_eq!(command, "false --set vim /usr/bin/vim.tiny");
                assert_eq!(status, Some(1));
            }
            other => panic!("expected execution error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_display_is_not_an_error() -> anyhow::Result<()> {
        let oracle = UpdateAlternatives::new("false", OracleFlavor::Debian);
        let report = oracle.display("vim")?;
        assert!(!report.is_success());

        Ok(())
    }
}
