// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the alternatives manifest to simplify the process of
//! deserialization. File I/O is left to the caller to figure out.

use crate::{
    oracle::OracleFlavor,
    plan::DesiredState,
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Alternatives manifest layout.
///
/// A manifest lists alternative groups in their desired state, and may tell
/// Oxialt which oracle to use for them.
///
/// # General Layout
///
/// ```toml
/// [oracle]
/// command = "update-alternatives"
/// flavor = "auto"
///
/// [[alternative]]
/// name = "java"
/// path = "$JAVA_HOME/bin/java"
/// link = "/usr/bin/java"
/// priority = 50
/// state = "present"
/// ```
///
/// Every entry is reconciled on its own, in listed order.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Manifest {
    /// Oracle settings.
    #[serde(default)]
    pub oracle: OracleSettings,

    /// Desired state of each alternative group.
    #[serde(default, rename = "alternative")]
    pub alternatives: Vec<DesiredState>,
}

impl FromStr for Manifest {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut manifest: Manifest = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on all path fields.
        if let Some(command) = manifest.oracle.command.take() {
            manifest.oracle.command = Some(expand(command.to_string_lossy().as_ref())?.into());
        }

        for desired in &mut manifest.alternatives {
            desired.path = expand(&desired.path)?;
            require_absolute("path", &desired.path)?;

            if let Some(link) = desired.link.take() {
                let link = expand(&link)?;
                require_absolute("link", &link)?;
                desired.link = Some(link);
            }
        }

        Ok(manifest)
    }
}

impl Display for Manifest {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Oracle settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct OracleSettings {
    /// Name of, or path to, the oracle binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathBuf>,

    /// Oracle flavor to assume.
    #[serde(default)]
    pub flavor: FlavorChoice,
}

/// How to pick the oracle flavor.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorChoice {
    /// Ask the oracle through `--version`.
    #[default]
    Auto,

    /// Assume the dpkg oracle.
    Debian,

    /// Assume the chkconfig oracle.
    RedHat,
}

impl FlavorChoice {
    /// Fixed flavor, if one was chosen.
    pub fn fixed(&self) -> Option<OracleFlavor> {
        match self {
            Self::Auto => None,
            Self::Debian => Some(OracleFlavor::Debian),
            Self::RedHat => Some(OracleFlavor::RedHat),
        }
    }
}

fn expand(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)
        .map_err(ConfigError::ShellExpansion)?
        .into_owned())
}

fn require_absolute(field: &'static str, value: &str) -> Result<()> {
    if !Path::new(value).is_absolute() {
        return Err(ConfigError::RelativePath {
            field,
            value: value.into(),
        });
    }

    Ok(())
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Path field is not absolute.
    #[error("{field} {value:?} must be an absolute path")]
    RelativePath { field: &'static str, value: String },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
