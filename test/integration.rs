// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{git_available, RepoFixture};

use anyhow::Result;
use docsync::{
    load_catalog, save_config, Catalog, GitBinary, Orchestrator, SyncAction, SyncConfig,
    SyncFailure, SyncOutcome,
};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn action_and_result(outcome: &SyncOutcome) -> (Option<SyncAction>, bool) {
    let repo = outcome.as_repo().expect("repository outcome");
    (repo.action, repo.result.is_ok())
}

#[test]
fn mirror_clone_then_pull() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let scratch = TempDir::new()?;
    let upstream = RepoFixture::new(scratch.path().join("upstream/docs-a"))?;
    upstream.stage_and_commit("README.md", "# Docs A\n")?;

    let catalog_path = scratch.path().join("repos.csv");
    fs::write(
        &catalog_path,
        format!("name,repo_url,description\ndocs-a,{},Guides for A\n", upstream.url()),
    )?;

    let config_path = scratch.path().join(".meta");
    let docs_base = scratch.path().join("out");
    save_config(
        &config_path,
        &SyncConfig::new(docs_base.to_string_lossy(), ["docs-a"]),
    )?;

    let catalog = load_catalog(&catalog_path)?;
    let config = SyncConfig::load_or_default(&config_path);
    let orchestrator = Orchestrator::new(GitBinary::default());

    let first = orchestrator.sync(&config.selected_repos, &catalog, config.expanded_docs_base()?);
    assert_eq!(first.len(), 1);
    assert_eq!(action_and_result(&first[0]), (Some(SyncAction::Clone), true));
    assert_eq!(
        fs::read_to_string(docs_base.join("docs-a/README.md"))?,
        "# Docs A\n"
    );

    upstream.stage_and_commit("guide.md", "# Guide\n")?;

    let second = orchestrator.sync(&config.selected_repos, &catalog, config.expanded_docs_base()?);
    assert_eq!(second.len(), 1);
    assert_eq!(action_and_result(&second[0]), (Some(SyncAction::Pull), true));
    assert_eq!(
        fs::read_to_string(docs_base.join("docs-a/guide.md"))?,
        "# Guide\n"
    );

    Ok(())
}

#[test]
fn mirror_reports_failed_clone_and_continues() -> Result<()> {
    if !git_available() {
        return Ok(());
    }

    let scratch = TempDir::new()?;
    let upstream = RepoFixture::new(scratch.path().join("upstream/docs-b"))?;
    upstream.stage_and_commit("README.md", "# Docs B\n")?;

    let missing = scratch.path().join("upstream/docs-missing");
    let catalog_path = scratch.path().join("repos.csv");
    fs::write(
        &catalog_path,
        format!(
            "name,repo_url\ndocs-missing,file://{}\ndocs-b,{}\n",
            missing.display(),
            upstream.url()
        ),
    )?;

    let catalog = Catalog::load_or_empty(&catalog_path)?;
    let docs_base = scratch.path().join("out");
    let orchestrator = Orchestrator::new(GitBinary::default());

    let outcomes = orchestrator.sync(["docs-missing", "ghost", "docs-b"], &catalog, &docs_base);
    assert_eq!(outcomes.len(), 3);

    let failed = outcomes[0].as_repo().expect("repository outcome");
    assert_eq!(failed.action, Some(SyncAction::Clone));
    match &failed.result {
        Err(SyncFailure::ClientInvocationFailed(diagnostic)) => assert!(!diagnostic.is_empty()),
        result => panic!("expected client failure, got {result:?}"),
    }

    let ghost = outcomes[1].as_repo().expect("repository outcome");
    assert_eq!(ghost.result, Err(SyncFailure::CatalogEntryMissing));

    assert_eq!(action_and_result(&outcomes[2]), (Some(SyncAction::Clone), true));
    assert!(docs_base.join("docs-b/README.md").is_file());

    Ok(())
}

#[test]
fn mirror_without_client_binary() -> Result<()> {
    let scratch = TempDir::new()?;
    let catalog = Catalog::from_iter([docsync::RepoEntry {
        name: "docs-a".into(),
        repo_url: "https://git.example/org/docs-a".into(),
        ..Default::default()
    }]);
    let orchestrator = Orchestrator::new(GitBinary::new("docsync-no-such-client-binary"));

    let outcomes = orchestrator.sync(["docs-a"], &catalog, scratch.path());
    let repo = outcomes[0].as_repo().expect("repository outcome");
    assert_eq!(repo.action, Some(SyncAction::Clone));
    assert!(matches!(repo.result, Err(SyncFailure::Unexpected(_))));
    assert!(!scratch.path().join("docs-a").exists());

    Ok(())
}
