// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Docsync persists a small record of what the user wants mirrored, and where
//! it should be mirrored to. The record is stored as JSON:
//!
//! ```text
//! {
//!     "docs_base": "~/docs",
//!     "repos": [
//!         "docs-a",
//!         "docs-b"
//!     ]
//! }
//! ```
//!
//! Every save overwrites the whole file. There is no merging with whatever
//! was persisted before.

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use std::{
    collections::BTreeSet,
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    str::FromStr,
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// Sync configuration layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Base directory that selected repositories are mirrored into.
    #[serde(default)]
    pub docs_base: String,

    /// Names of repositories selected for mirroring.
    #[serde(default, rename = "repos")]
    pub selected_repos: BTreeSet<String>,
}

impl SyncConfig {
    /// Construct new sync configuration.
    pub fn new(
        docs_base: impl Into<String>,
        selected_repos: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            docs_base: docs_base.into(),
            selected_repos: selected_repos.into_iter().map(Into::into).collect(),
        }
    }

    /// Load configuration at target path, or fallback to default.
    ///
    /// A missing or unparsable configuration file is treated as a first run,
    /// not as an error.
    #[instrument(skip(path), level = "debug")]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match load_config(path) {
            Ok(config) => config,
            Err(ConfigError::Missing { path }) => {
                debug!("no configuration at {:?}, assume first run", path.display());
                Self::default()
            }
            Err(error) => {
                warn!("ignore unusable configuration: {error}");
                Self::default()
            }
        }
    }

    /// Docs base directory with shell expansion performed on it.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ShellExpansion`] if expansion fails.
    pub fn expanded_docs_base(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            shellexpand::full(self.docs_base.as_str())?.into_owned(),
        ))
    }

    /// Check if repository is selected for mirroring.
    pub fn is_selected(&self, name: impl AsRef<str>) -> bool {
        self.selected_repos.contains(name.as_ref())
    }
}

impl FromStr for SyncConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for SyncConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)
            .map_err(ConfigError::Serialize)?;

        fmt.write_str(String::from_utf8_lossy(&buffer).as_ref())
    }
}

/// Load sync configuration from target path.
///
/// # Errors
///
/// - Return [`ConfigError::Missing`] if configuration file does not exist.
/// - Return [`ConfigError::Io`] if configuration file cannot be read.
/// - Return [`ConfigError::Deserialize`] if configuration is not valid JSON.
pub fn load_config(path: impl AsRef<Path>) -> Result<SyncConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => ConfigError::Missing {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    })?;

    data.parse()
}

/// Save sync configuration to target path.
///
/// Writes to a temporary file next to the target first, flushes it to disk,
/// and then renames it over the target. Readers never observe a partially
/// written configuration. An existing target keeps its permissions, and a
/// new one is created readable by everyone but writable only by its owner.
///
/// # Errors
///
/// - Return [`ConfigError::Io`] if configuration cannot be written.
/// - Return [`ConfigError::Serialize`] if configuration cannot be serialized.
#[instrument(skip(path, config), level = "debug")]
pub fn save_config(path: impl AsRef<Path>, config: &SyncConfig) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut payload = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut payload, formatter);
    config.serialize(&mut serializer)?;
    payload.push(b'\n');

    // INVARIANT: Temporary file must live on the same file system as target.
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(parent).map_err(io_error)?;
    file.write_all(&payload).map_err(io_error)?;

    // INVARIANT: Temporary files are created private, so fix up mode before rename.
    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        file.as_file().set_permissions(permissions).map_err(io_error)?;
    }

    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|error| io_error(error.error))?;

    info!("save configuration to {:?}", path.display());

    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("{} not found", .path.display())]
    Missing { path: PathBuf },

    /// Configuration file cannot be read or written.
    #[error("failed to access configuration {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to deserialize configuration.
    #[error("failed to deserialize configuration")]
    Deserialize(#[source] serde_json::Error),

    /// Failed to serialize configuration.
    #[error("failed to serialize configuration")]
    Serialize(#[from] serde_json::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
