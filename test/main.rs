// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use oxialt::{
    oracle::{OracleError, Result},
    Oracle, OracleFlavor, Report,
};
use std::{cell::RefCell, collections::BTreeMap};

/// In-memory alternatives database that answers like the real oracle.
///
/// Reports are rendered as text and go through the same parsing as real
/// oracle output.
pub(crate) struct FakeOracle {
    flavor: OracleFlavor,
    groups: RefCell<BTreeMap<String, FakeGroup>>,
    mutations: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct FakeGroup {
    pub(crate) link: String,
    pub(crate) current: Option<String>,
    pub(crate) candidates: Vec<(String, i32)>,
}

impl FakeOracle {
    pub(crate) fn new(flavor: OracleFlavor) -> Self {
        Self {
            flavor,
            groups: RefCell::new(BTreeMap::new()),
            mutations: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Make every call of given mutating command fail.
    pub(crate) fn failing_on(mut self, command: &'static str) -> Self {
        self.fail_on = Some(command);
        self
    }

    /// Seed group with candidates, selecting the first one.
    pub(crate) fn with_group(
        self,
        name: &str,
        link: &str,
        candidates: impl IntoIterator<Item = (&'static str, i32)>,
    ) -> Self {
        let candidates = candidates
            .into_iter()
            .map(|(path, priority)| (path.to_string(), priority))
            .collect::<Vec<_>>();
        let group = FakeGroup {
            link: link.into(),
            current: candidates.first().map(|(path, _)| path.clone()),
            candidates,
        };
        self.groups.borrow_mut().insert(name.into(), group);
        self
    }

    pub(crate) fn group(&self, name: &str) -> Option<FakeGroup> {
        self.groups.borrow().get(name).cloned()
    }

    pub(crate) fn mutations(&self) -> Vec<String> {
        self.mutations.borrow().clone()
    }

    fn mutate(&self, command: &'static str, line: String) -> Result<()> {
        self.mutations.borrow_mut().push(line.clone());
        if self.fail_on == Some(command) {
            return Err(OracleError::Execution {
                command: line,
                status: Some(2),
                output: format!("stderr: update-alternatives: error: {command} refused"),
            });
        }

        Ok(())
    }

    fn render_display(&self, name: &str, group: &FakeGroup) -> String {
        let mut report = String::new();
        let current = group.current.as_deref().unwrap_or_default();
        match self.flavor {
            OracleFlavor::Debian => {
                report.push_str(&format!("{name} - manual mode\n"));
                report.push_str(&format!("  link currently points to {current}\n"));
                report.push_str(&format!("  link {name} is {}\n", group.link));
                for (path, priority) in &group.candidates {
                    report.push_str(&format!("{path} - priority {priority}\n"));
                }
            }
            OracleFlavor::RedHat => {
                report.push_str(&format!("{name} - status is manual.\n"));
                report.push_str(&format!(" link currently points to {current}\n"));
                for (path, priority) in &group.candidates {
                    report.push_str(&format!("{path} - family {name} priority {priority}\n"));
                }
            }
        }

        report
    }
}

impl Oracle for FakeOracle {
    fn flavor(&self) -> OracleFlavor {
        self.flavor
    }

    fn display(&self, name: &str) -> Result<Report> {
        Ok(match self.groups.borrow().get(name) {
            Some(group) => Report::success(self.render_display(name, group)),
            None => Report::failure(
                2,
                format!("update-alternatives: error: no alternatives for {name}\n"),
            ),
        })
    }

    fn query(&self, name: &str) -> Result<Report> {
        if self.flavor != OracleFlavor::Debian {
            return Ok(Report::failure(2, "alternatives: unknown option --query\n"));
        }

        Ok(match self.groups.borrow().get(name) {
            Some(group) => Report::success(format!(
                "Name: {name}\nLink: {}\nStatus: manual\nValue: {}\n",
                group.link,
                group.current.as_deref().unwrap_or_default()
            )),
            None => Report::failure(
                2,
                format!("update-alternatives: error: no alternatives for {name}\n"),
            ),
        })
    }

    fn install(&self, link: &str, name: &str, path: &str, priority: i32) -> Result<()> {
        self.mutate("install", format!("--install {link} {name} {path} {priority}"))?;

        let mut groups = self.groups.borrow_mut();
        let group = groups.entry(name.into()).or_default();
        group.link = link.into();
        group.candidates.retain(|(existing, _)| existing != path);
        group.candidates.push((path.into(), priority));
        if group.current.is_none() {
            group.current = Some(path.into());
        }

        Ok(())
    }

    fn set(&self, name: &str, path: &str) -> Result<()> {
        self.mutate("set", format!("--set {name} {path}"))?;

        let mut groups = self.groups.borrow_mut();
        match groups.get_mut(name) {
            Some(group) if group.candidates.iter().any(|(existing, _)| existing == path) => {
                group.current = Some(path.into());
                Ok(())
            }
            _ => Err(OracleError::Execution {
                command: format!("--set {name} {path}"),
                status: Some(2),
                output: format!(
                    "stderr: update-alternatives: error: \
                     alternative {path} for {name} not registered"
                ),
            }),
        }
    }

    fn remove(&self, name: &str, path: &str) -> Result<()> {
        self.mutate("remove", format!("--remove {name} {path}"))?;

        let mut groups = self.groups.borrow_mut();
        let Some(group) = groups.get_mut(name) else {
            return Ok(());
        };

        group.candidates.retain(|(existing, _)| existing != path);
        if group.current.as_deref() == Some(path) {
            group.current = group
                .candidates
                .iter()
                .max_by_key(|(_, priority)| *priority)
                .map(|(path, _)| path.clone());
        }

        if group.candidates.is_empty() {
            groups.remove(name);
        }

        Ok(())
    }
}
