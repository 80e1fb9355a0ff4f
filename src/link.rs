// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link path resolution.
//!
//! Installing a new candidate requires the path of the group's symbolic link.
//! When the caller does not supply one, an existing group can still tell us
//! through the oracle's query report:
//!
//! ```text
//! Name: vim
//! Link: /usr/bin/vim
//! Status: auto
//! Best: /usr/bin/vim.basic
//! Value: /usr/bin/vim.basic
//! ```
//!
//! Only the Debian oracle can be queried. Other flavors resolve nothing.

use crate::oracle::{Oracle, Result};

use tracing::{debug, instrument, warn};

/// Resolve symbolic link path of alternative group `name` through the oracle.
///
/// Yields nothing if the oracle cannot be queried, the query fails, or the
/// report lacks a `Link:` line. None of these are errors: the caller decides
/// whether a missing link matters.
///
/// # Errors
///
/// - Return [`OracleError::Spawn`](crate::oracle::OracleError::Spawn) if the
///   oracle cannot be run.
#[instrument(skip(oracle), level = "debug")]
pub fn resolve_link(oracle: &impl Oracle, name: &str) -> Result<Option<String>> {
    if !oracle.flavor().supports_query() {
        debug!("{} oracle cannot be queried for links", oracle.flavor());
        return Ok(None);
    }

    let report = oracle.query(name)?;
    if !report.is_success() {
        warn!("cannot query alternative group {name:?}: {}", report.diagnostic());
        return Ok(None);
    }

    let link = parse_query_link(&report.stdout);
    debug!("group {name:?} links through {link:?}");

    Ok(link)
}

/// Extract link path from the oracle's query report.
pub fn parse_query_link(report: &str) -> Option<String> {
    report
        .lines()
        .find(|line| line.starts_with("Link:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{OracleFlavor, Report};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    struct QueryOnly {
        flavor: OracleFlavor,
        report: Report,
        queried: Cell<bool>,
    }

    impl QueryOnly {
        fn new(flavor: OracleFlavor, report: Report) -> Self {
            Self {
                flavor,
                report,
                queried: Cell::new(false),
            }
        }
    }

    impl Oracle for QueryOnly {
        fn flavor(&self) -> OracleFlavor {
            self.flavor
        }

        fn display(&self, _: &str) -> Result<Report> {
            unreachable!("link resolution never displays")
        }

        fn query(&self, _: &str) -> Result<Report> {
            self.queried.set(true);
            Ok(self.report.clone())
        }

        fn install(&self, _: &str, _: &str, _: &str, _: i32) -> Result<()> {
            unreachable!("link resolution never mutates")
        }

        fn set(&self, _: &str, _: &str) -> Result<()> {
            unreachable!("link resolution never mutates")
        }

        fn remove(&self, _: &str, _: &str) -> Result<()> {
            unreachable!("link resolution never mutates")
        }
    }

    const QUERY: &str = indoc! {"
        Name: vim
        Link: /usr/bin/vim
        Slaves:
         vim.1.gz /usr/share/man/man1/vim.1.gz
        Status: auto
        Best: /usr/bin/vim.basic
        Value: /usr/bin/vim.basic

        Alternative: /usr/bin/vim.basic
        Priority: 30
    "};

    #[test]
    fn parse_link_line() {
        assert_eq!(parse_query_link(QUERY), Some("/usr/bin/vim".into()));
    }

    #[test]
    fn parse_without_link_line() {
        assert_eq!(parse_query_link("Name: vim\nStatus: auto\n"), None);
        assert_eq!(parse_query_link("Link:\n"), None);
    }

    #[test]
    fn resolve_through_debian_oracle() -> anyhow::Result<()> {
        let oracle = QueryOnly::new(OracleFlavor::Debian, Report::success(QUERY));
        assert_eq!(resolve_link(&oracle, "vim")?, Some("/usr/bin/vim".into()));
        assert!(oracle.queried.get());

        Ok(())
    }

    #[test]
    fn redhat_oracle_is_never_queried() -> anyhow::Result<()> {
        let oracle = QueryOnly::new(OracleFlavor::RedHat, Report::success(QUERY));
        assert_eq!(resolve_link(&oracle, "vim")?, None);
        assert!(!oracle.queried.get());

        Ok(())
    }

    #[test]
    fn failed_query_resolves_nothing() -> anyhow::Result<()> {
        let oracle = QueryOnly::new(
            OracleFlavor::Debian,
            Report::failure(2, "update-alternatives: error: no alternatives for vim\n"),
        );
        assert_eq!(resolve_link(&oracle, "vim")?, None);

        Ok(())
    }
}
