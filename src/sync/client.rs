// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External version-control client.
//!
//! Docsync never speaks any version-control protocol itself. Cloning and
//! pulling is delegated to an external client binary, Git by default, that
//! runs as a child process. Only the exit status and standard error of that
//! child process are consulted.

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Command,
};
use tracing::{debug, instrument};

/// Layer of indirection for version-control operations.
pub trait VcsClient {
    /// Clone repository at remote URL into target directory.
    ///
    /// # Errors
    ///
    /// - Return [`ClientError::Failed`] if client exits with non-zero status.
    /// - Return [`ClientError::Spawn`] if client cannot be invoked at all.
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()>;

    /// Pull latest changes for repository already checked out at target
    /// directory.
    ///
    /// # Errors
    ///
    /// - Return [`ClientError::Failed`] if client exits with non-zero status.
    /// - Return [`ClientError::Spawn`] if client cannot be invoked at all.
    fn pull(&self, target: &Path) -> Result<()>;
}

/// Version-control client backed by the Git binary.
#[derive(Debug, Clone)]
pub struct GitBinary {
    program: OsString,
}

impl GitBinary {
    /// Construct new client that invokes target program.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &OsStr {
        self.program.as_os_str()
    }
}

impl Default for GitBinary {
    fn default() -> Self {
        Self::new("git")
    }
}

impl VcsClient for GitBinary {
    #[instrument(skip(self), level = "debug")]
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        let args = [OsStr::new("clone"), OsStr::new(url), target.as_os_str()];
        syscall_non_interactive(&self.program, args)
    }

    #[instrument(skip(self), level = "debug")]
    fn pull(&self, target: &Path) -> Result<()> {
        let args = [OsStr::new("-C"), target.as_os_str(), OsStr::new("pull")];
        syscall_non_interactive(&self.program, args)
    }
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<()> {
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|source| ClientError::Spawn {
            program: cmd.as_ref().to_os_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    if !stdout.is_empty() {
        debug!("stdout: {}", chomp(&stdout));
    }

    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    if !output.status.success() {
        let code = output.status.code();

        // INVARIANT: Failure always carries a diagnostic, even with silent stderr.
        let diagnostic = match chomp(&stderr) {
            message if message.trim().is_empty() => {
                format!("exited with status {}", exit_code(&code))
            }
            message => message.to_string(),
        };

        return Err(ClientError::Failed {
            program: cmd.as_ref().to_os_string(),
            code,
            diagnostic,
        });
    }

    // INVARIANT: Git reports progress through stderr even on success.
    if !stderr.is_empty() {
        debug!("stderr: {}", chomp(&stderr));
    }

    Ok(())
}

fn chomp(message: &str) -> &str {
    message.trim_end_matches(['\r', '\n'])
}

/// Client error types.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client ran, but exited with non-zero status.
    #[error("command {program:?} failed with status {}: {diagnostic}", exit_code(.code))]
    Failed {
        program: OsString,
        code: Option<i32>,
        diagnostic: String,
    },

    /// Client could not be invoked.
    #[error("cannot invoke {program:?}: {source}")]
    Spawn {
        program: OsString,
        #[source]
        source: std::io::Error,
    },
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown".into(),
    }
}

/// Friendly result alias :3
type Result<T, E = ClientError> = std::result::Result<T, E>;
