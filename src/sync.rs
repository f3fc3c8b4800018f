// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository sync reconciliation.
//!
//! Syncing brings every selected repository in the docs base directory up to
//! date with its remote. Each repository is mirrored into a folder whose name
//! is derived from its URL, see [`resolve_folder_name`]. If that folder does
//! not exist yet, the repository is cloned into it. Otherwise, the latest
//! changes are pulled into the existing checkout.
//!
//! # Outcomes
//!
//! A sync run never aborts half way through because of a single repository.
//! Every repository gets processed exactly once, and produces exactly one
//! [`SyncOutcome`]:
//!
//! ```text
//! NotStarted -> {Cloning | Pulling} -> {Succeeded | Failed}
//! ```
//!
//! Only the pre-flight checks short-circuit a run: nothing selected, no docs
//! base directory configured, or a docs base directory that cannot be
//! created. None of these touch the file system or invoke the client.
//!
//! # See Also
//!
//! 1. [`VcsClient`]
//! 2. [`Catalog`]

pub mod client;

pub use client::{ClientError, GitBinary, VcsClient};

use crate::{catalog::Catalog, config::SyncConfig, path::resolve_folder_name};

use indicatif::ProgressBar;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Drive sync runs over a set of selected repositories.
#[derive(Debug)]
pub struct Orchestrator<C = GitBinary>
where
    C: VcsClient,
{
    client: C,
    bar: ProgressBar,
}

impl<C> Orchestrator<C>
where
    C: VcsClient,
{
    /// Construct new orchestrator around version-control client.
    pub fn new(client: C) -> Self {
        Self {
            client,
            bar: ProgressBar::hidden(),
        }
    }

    /// Report progress through target progress bar.
    ///
    /// The bar advances once per repository processed.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.bar = bar;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Sync selected repositories into docs base directory.
    ///
    /// Repositories are processed in the order given. Names are looked up in
    /// the catalog to obtain their remote URL. The docs base directory is
    /// created along with any missing parents, but only once both pre-flight
    /// checks pass.
    ///
    /// Returns one outcome per selected repository, or a single outcome if
    /// a pre-flight check failed.
    pub fn sync(
        &self,
        selected: impl IntoIterator<Item = impl AsRef<str>>,
        catalog: &Catalog,
        docs_base: impl AsRef<Path>,
    ) -> Vec<SyncOutcome> {
        let selected = selected
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect::<Vec<_>>();

        info!("starting sync process");
        let outcomes = self.reconcile(&selected, catalog, docs_base.as_ref());
        self.bar.finish_and_clear();

        outcomes
    }

    /// Sync selection and docs base of target configuration.
    ///
    /// Same as [`Orchestrator::sync`], except that the docs base path gets
    /// shell expanded first. The pre-flight checks keep their order, so an
    /// empty selection is reported even if expansion would fail. A docs base
    /// path that cannot be expanded is reported as unavailable.
    pub fn sync_config(&self, config: &SyncConfig, catalog: &Catalog) -> Vec<SyncOutcome> {
        if config.selected_repos.is_empty() {
            return self.sync(&config.selected_repos, catalog, "");
        }

        match config.expanded_docs_base() {
            Ok(docs_base) => self.sync(&config.selected_repos, catalog, docs_base),
            Err(error) => {
                self.bar.finish_and_clear();
                vec![SyncOutcome::DestinationUnavailable {
                    docs_base: PathBuf::from(&config.docs_base),
                    diagnostic: error.to_string(),
                }]
            }
        }
    }

    fn reconcile(
        &self,
        selected: &[String],
        catalog: &Catalog,
        docs_base: &Path,
    ) -> Vec<SyncOutcome> {
        if selected.is_empty() {
            return vec![SyncOutcome::NothingSelected];
        }

        if docs_base.as_os_str().is_empty() {
            return vec![SyncOutcome::NoDestination];
        }

        // INVARIANT: mkdirp is happy with anything already at docs base, even a file.
        let prepared = match mkdirp::mkdirp(docs_base) {
            Ok(_) if docs_base.is_dir() => Ok(()),
            Ok(_) => Err(String::from("not a directory")),
            Err(error) => Err(error.to_string()),
        };

        match prepared {
            Ok(_) => debug!("docs base ready at {:?}", docs_base.display()),
            Err(diagnostic) => {
                return vec![SyncOutcome::DestinationUnavailable {
                    docs_base: docs_base.to_path_buf(),
                    diagnostic,
                }]
            }
        }

        self.bar.set_length(selected.len() as u64);
        let mut outcomes = Vec::with_capacity(selected.len());
        for name in selected {
            self.bar.set_message(name.clone());
            let outcome = self.sync_repo(name, catalog, docs_base);
            outcomes.push(SyncOutcome::Repo(outcome));
            self.bar.inc(1);
        }

        self.log(|| info!("sync completed"));

        outcomes
    }

    #[instrument(skip(self, catalog, docs_base), level = "debug")]
    fn sync_repo(&self, name: &str, catalog: &Catalog, docs_base: &Path) -> RepoOutcome {
        let Some(entry) = catalog.get(name) else {
            return RepoOutcome::failed(name, None, SyncFailure::CatalogEntryMissing);
        };

        let url = entry.repo_url.as_str();
        if url.is_empty() {
            return RepoOutcome::failed(name, None, SyncFailure::MissingUrl);
        }

        let Some(folder) = resolve_folder_name(url) else {
            return RepoOutcome::failed(
                name,
                None,
                SyncFailure::UnresolvableFolder { url: url.into() },
            );
        };

        self.log(|| info!("syncing {name}"));
        let target = docs_base.join(folder);
        let exists = match target.try_exists() {
            Ok(exists) => exists,
            Err(error) => {
                return RepoOutcome::failed(name, None, SyncFailure::Unexpected(error.to_string()))
            }
        };

        let (action, result) = if exists {
            self.log(|| info!("pulling latest changes for {name}"));
            (SyncAction::Pull, self.client.pull(&target))
        } else {
            self.log(|| info!("cloning {url} to {}", target.display()));
            (SyncAction::Clone, self.client.clone_repo(url, &target))
        };

        RepoOutcome {
            repo_name: name.into(),
            action: Some(action),
            result: result.map_err(SyncFailure::from),
        }
    }

    // INVARIANT: Never draw log lines over the progress bar.
    fn log(&self, emit: impl FnOnce()) {
        self.bar.suspend(emit);
    }
}

/// Action taken to sync a repository.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Repository was not mirrored yet.
    Clone,

    /// Repository already mirrored, so fetch and merge latest changes.
    Pull,
}

impl Display for SyncAction {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Clone => fmt.write_str("clone"),
            Self::Pull => fmt.write_str("pull"),
        }
    }
}

/// Result of a sync run, or of a single repository within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No repositories were selected, so there is nothing to do.
    NothingSelected,

    /// No docs base directory was configured.
    NoDestination,

    /// Docs base directory could not be created.
    DestinationUnavailable {
        docs_base: PathBuf,
        diagnostic: String,
    },

    /// Repository was processed.
    Repo(RepoOutcome),
}

impl SyncOutcome {
    /// Check if outcome represents a successfully synced repository.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Repo(outcome) if outcome.result.is_ok())
    }

    /// Repository outcome, if any.
    pub fn as_repo(&self) -> Option<&RepoOutcome> {
        match self {
            Self::Repo(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl Display for SyncOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NothingSelected => fmt.write_str("no repositories selected"),
            Self::NoDestination => fmt.write_str("no docs base path specified"),
            Self::DestinationUnavailable {
                docs_base,
                diagnostic,
            } => write!(
                fmt,
                "cannot create docs base {:?}: {diagnostic}",
                docs_base.display()
            ),
            Self::Repo(outcome) => Display::fmt(outcome, fmt),
        }
    }
}

/// Outcome of syncing a single repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOutcome {
    /// Name of repository as selected.
    pub repo_name: String,

    /// Action taken, or `None` if repository failed before one was chosen.
    pub action: Option<SyncAction>,

    /// Whether or not the action succeeded.
    pub result: std::result::Result<(), SyncFailure>,
}

impl RepoOutcome {
    fn failed(name: impl Into<String>, action: Option<SyncAction>, failure: SyncFailure) -> Self {
        Self {
            repo_name: name.into(),
            action,
            result: Err(failure),
        }
    }
}

impl Display for RepoOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let name = &self.repo_name;
        match (&self.result, self.action) {
            (Ok(()), Some(action)) => write!(fmt, "successfully synced {name} ({action})"),
            (Ok(()), None) => write!(fmt, "successfully synced {name}"),
            (Err(failure), Some(action)) => write!(fmt, "failed to {action} {name}: {failure}"),
            (Err(failure), None) => write!(fmt, "cannot sync {name}: {failure}"),
        }
    }
}

/// Reasons a single repository failed to sync.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncFailure {
    /// Selected repository has no catalog entry.
    #[error("no catalog data found")]
    CatalogEntryMissing,

    /// Catalog entry has no remote URL.
    #[error("no URL found")]
    MissingUrl,

    /// No folder name can be derived from remote URL.
    #[error("cannot derive folder name from {url:?}")]
    UnresolvableFolder { url: String },

    /// Client ran, but reported failure.
    #[error("{0}")]
    ClientInvocationFailed(String),

    /// Anything else that went wrong along the way.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<ClientError> for SyncFailure {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Failed { diagnostic, .. } => Self::ClientInvocationFailed(diagnostic),
            error @ ClientError::Spawn { .. } => Self::Unexpected(error.to_string()),
        }
    }
}
