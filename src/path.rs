// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where docsync reads its catalog and configuration from, and
//! which folder a given repository gets mirrored into under the docs base
//! directory.

use std::path::PathBuf;
use url::Url;

/// Path segment marking a "browse at ref" view of a repository.
const TREE_MARKER: &str = "tree";

/// Default path to repository catalog.
///
/// Relative to the current working directory. Does not check if the path
/// returned actually exists.
pub fn default_catalog_path() -> PathBuf {
    PathBuf::from("repos.csv")
}

/// Default path to persisted sync configuration.
///
/// Relative to the current working directory. Does not check if the path
/// returned actually exists.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(".meta")
}

/// Resolve folder name to mirror a repository into from its URL.
///
/// Takes the path component of the URL, strips leading and trailing
/// separators, and splits it into segments, ignoring empty ones. If a segment
/// equals `tree`, then the segment right before it is the folder name. This
/// recovers the repository name out of URLs like
/// `https://host/org/repo/tree/main/docs`. Otherwise, the last segment is the
/// folder name.
///
/// Input that cannot be parsed as an absolute URL, e.g., scp-like
/// `git@host:org/repo.git`, is treated as a bare path.
///
/// Returns `None` when no usable folder name exists: the path has no
/// segments, `tree` is the very first segment, or the chosen segment is `.`
/// or `..`.
pub fn resolve_folder_name(repo_url: impl AsRef<str>) -> Option<String> {
    let repo_url = repo_url.as_ref();
    let path = match Url::parse(repo_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => repo_url.to_string(),
    };

    let segments = path
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();

    let folder = match segments.iter().position(|segment| *segment == TREE_MARKER) {
        Some(0) => return None,
        Some(index) => segments[index - 1],
        None => segments.last().copied()?,
    };

    // INVARIANT: Never let a folder name escape the docs base directory.
    if matches!(folder, "." | "..") {
        return None;
    }

    Some(folder.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("https://host/org/repo", Some("repo"); "repository root")]
    #[test_case("https://host/org/repo/", Some("repo"); "trailing slash")]
    #[test_case("https://host/org/repo/tree/main/docs", Some("repo"); "tree view")]
    #[test_case("https://host/org/repo/tree/main/docs/", Some("repo"); "tree view trailing slash")]
    #[test_case("https://host/org/repo.git", Some("repo.git"); "git suffix kept")]
    #[test_case("https://host/org//repo", Some("repo"); "empty inner segment")]
    #[test_case("https://host/org/repo?ref=main#readme", Some("repo"); "query and fragment")]
    #[test_case("git@host:org/repo.git", Some("repo.git"); "scp like")]
    #[test_case("org/repo", Some("repo"); "bare path")]
    #[test_case("https://host/", None; "no path segments")]
    #[test_case("https://host", None; "no path at all")]
    #[test_case("", None; "empty url")]
    #[test_case("https://host/tree/main", None; "tree without repository")]
    #[test_case("https://host/org/..", None; "parent directory")]
    #[test]
    fn resolve_folder_name_cases(url: &str, expect: Option<&str>) {
        pretty_assertions::assert_eq!(resolve_folder_name(url), expect.map(ToString::to_string));
    }

    #[test]
    fn trailing_slash_matches_no_trailing_slash() {
        pretty_assertions::assert_eq!(
            resolve_folder_name("https://git.example/org/docs-a/"),
            resolve_folder_name("https://git.example/org/docs-a"),
        );
    }
}
