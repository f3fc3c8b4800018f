// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Local mirror of curated documentation repositories.
//!
//! Docsync tracks a user-selected subset of the repositories listed in a CSV
//! catalog, and keeps each of them mirrored under a single docs base
//! directory. The first sync of a repository clones it. Every sync after that
//! pulls its latest changes.
//!
//! All cloning and pulling is delegated to an external version-control client
//! (Git by default). Docsync only decides _what_ to run, _where_ to run it,
//! and reports how each run went.
//!
//! # Layout
//!
//! 1. [`catalog`]: load known repositories from CSV.
//! 2. [`config`]: persist the selection and docs base directory as JSON.
//! 3. [`path`]: map repository URLs to folder names.
//! 4. [`sync`]: reconcile selected repositories with the docs base directory.

pub mod catalog;
pub mod config;
pub mod path;
pub mod sync;

pub use catalog::{load_catalog, Catalog, CatalogError, RepoEntry};
pub use config::{load_config, save_config, ConfigError, SyncConfig};
pub use path::{default_catalog_path, default_config_path, resolve_folder_name};
pub use sync::{
    ClientError, GitBinary, Orchestrator, RepoOutcome, SyncAction, SyncFailure, SyncOutcome,
    VcsClient,
};
