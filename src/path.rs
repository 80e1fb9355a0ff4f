// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, i.e., the manifest and the oracle binary.

use std::{
    env::{self, JoinPathsError},
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

/// Oracle binary names to look for, in order of preference.
pub const ORACLE_NAMES: [&str; 2] = ["update-alternatives", "alternatives"];

// Administrative binaries are often missing from an unprivileged PATH.
const SBIN_DIRS: [&str; 3] = ["/sbin", "/usr/sbin", "/usr/local/sbin"];

/// Determine default absolute path to alternatives manifest.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/oxialt/alternatives.toml`.
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoConfigDir`] if configuration directory cannot be
///   determined.
pub fn default_manifest_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("oxialt").join("alternatives.toml"))
        .ok_or(PathError::NoConfigDir)
}

/// Locate oracle binary.
///
/// A `command` containing a path separator is taken as is. A bare `command`
/// is searched for through `$PATH` and the usual sbin directories. Without
/// any `command`, each of [`ORACLE_NAMES`] is searched for in turn.
///
/// # Errors
///
/// - Return [`PathError::OracleNotFound`] if no executable matches.
/// - Return [`PathError::SearchPath`] if the search path cannot be joined.
pub fn find_oracle(command: Option<&Path>) -> Result<PathBuf> {
    let paths = search_path()?;
    match command {
        Some(command) if command.components().count() > 1 => Ok(command.to_path_buf()),
        Some(command) => find_in(command, &paths).ok_or_else(|| PathError::OracleNotFound {
            names: command.display().to_string(),
        }),
        None => ORACLE_NAMES
            .iter()
            .find_map(|name| find_in(name, &paths))
            .ok_or_else(|| PathError::OracleNotFound {
                names: ORACLE_NAMES.join(", "),
            }),
    }
}

/// Accept only absolute paths.
///
/// Shaped to act as a clap value parser.
///
/// # Errors
///
/// - Return message if `value` is relative.
pub fn absolute_path(value: &str) -> std::result::Result<String, String> {
    if Path::new(value).is_absolute() {
        Ok(value.into())
    } else {
        Err(format!("{value:?} is not an absolute path"))
    }
}

// $PATH with the sbin directories appended, joined back into one search path.
fn search_path() -> Result<OsString> {
    let mut dirs = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect::<Vec<_>>())
        .unwrap_or_default();

    for sbin in SBIN_DIRS.map(PathBuf::from) {
        if !dirs.contains(&sbin) {
            dirs.push(sbin);
        }
    }

    Ok(env::join_paths(dirs)?)
}

fn find_in(name: impl AsRef<OsStr>, paths: &OsStr) -> Option<PathBuf> {
    which::which_in_global(name, Some(paths))
        .ok()
        .and_then(|mut found| found.next())
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's configuration directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::config_dir`](https://docs.rs/dirs/latest/dirs/fn.config_dir.html)
    #[error("cannot determine absolute path to user's configuration directory")]
    NoConfigDir,

    /// No oracle binary could be found.
    #[error("cannot find alternatives oracle on PATH (looked for {names})")]
    OracleNotFound { names: String },

    /// Search path could not be put back together.
    #[error(transparent)]
    SearchPath(#[from] JoinPathsError),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    #[test_case("/usr/bin/vim", true; "absolute")]
    #[test_case("usr/bin/vim", false; "relative")]
    #[test_case("", false; "empty")]
    #[test]
    fn absolute_path_parser(value: &str, expect: bool) {
        pretty_assertions::assert_eq!(absolute_path(value).is_ok(), expect);
    }

    #[test]
    fn explicit_path_is_taken_as_is() -> anyhow::Result<()> {
        let path = find_oracle(Some(Path::new("/opt/bin/update-alternatives")))?;
        assert_eq!(path, PathBuf::from("/opt/bin/update-alternatives"));

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn find_executable_on_search_path() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = env::current_dir()?;
        std::fs::write(dir.join("oxialt-plain-file"), "")?;
        let exec = dir.join("oxialt-test-oracle");
        std::fs::write(&exec, "#!/bin/sh\n")?;
        std::fs::set_permissions(&exec, std::fs::Permissions::from_mode(0o755))?;
        env::set_var("PATH", env::join_paths(["/nonexistent/oxialt".into(), dir])?);

        assert_eq!(find_oracle(Some(Path::new("oxialt-test-oracle")))?, exec);
        assert!(matches!(
            find_oracle(Some(Path::new("oxialt-plain-file"))),
            Err(PathError::OracleNotFound { .. })
        ));

        Ok(())
    }

    #[test]
    fn sbin_dirs_are_searched() -> anyhow::Result<()> {
        let paths = search_path()?;
        let dirs = env::split_paths(&paths).collect::<Vec<_>>();
        for sbin in SBIN_DIRS {
            assert!(dirs.contains(&PathBuf::from(sbin)));
        }

        Ok(())
    }

    #[sealed_test(env = [("PATH", "/nonexistent/oxialt")])]
    fn missing_bare_command_is_not_found() {
        let result = find_oracle(Some(Path::new("oxialt-no-such-oracle")));
        assert!(matches!(result, Err(PathError::OracleNotFound { .. })));
    }
}
