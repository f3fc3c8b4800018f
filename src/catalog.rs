// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository catalog.
//!
//! The __catalog__ is a CSV file listing every documentation repository that
//! docsync knows how to mirror. The header row must contain at least a `name`
//! column and a `repo_url` column. Any other column is kept around as opaque
//! metadata for the entry.
//!
//! ```text
//! name,repo_url,description
//! docs-a,https://git.example/org/docs-a,Guides for A
//! docs-b,https://git.example/org/b/tree/main/docs,Reference for B
//! ```

use csv::{ReaderBuilder, StringRecord, Trim};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, instrument, warn};

/// Single repository listed in the catalog.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RepoEntry {
    /// Unique name of the repository.
    pub name: String,

    /// Remote URL to clone repository from.
    pub repo_url: String,

    /// Remaining catalog columns keyed by header name.
    pub metadata: BTreeMap<String, String>,
}

/// Mapping of repository names to catalog entries.
///
/// Iterates in ascending name order.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Catalog {
    entries: BTreeMap<String, RepoEntry>,
}

impl Catalog {
    /// Load catalog at target path.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::Missing`] if catalog file does not exist.
    /// - Return [`CatalogError::MissingColumn`] if header lacks a required
    ///   column.
    /// - Return [`CatalogError::Csv`] if catalog cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_catalog(path)
    }

    /// Load catalog at target path, or fallback to empty catalog if missing.
    ///
    /// A missing catalog is not fatal. It just means docsync knows about zero
    /// repositories.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::MissingColumn`] if header lacks a required
    ///   column.
    /// - Return [`CatalogError::Csv`] if catalog cannot be parsed.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self> {
        match load_catalog(path) {
            Err(CatalogError::Missing { path }) => {
                warn!("{} not found", path.display());
                Ok(Self::default())
            }
            result => result,
        }
    }

    /// Insert catalog entry, replacing any prior entry of the same name.
    pub fn insert(&mut self, entry: RepoEntry) -> Option<RepoEntry> {
        self.entries.insert(entry.name.clone(), entry)
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&RepoEntry> {
        self.entries.get(name.as_ref())
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.entries.contains_key(name.as_ref())
    }

    /// Names of all repositories in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RepoEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = RepoEntry>>(iter: I) -> Self {
        let mut catalog = Self::default();
        for entry in iter {
            catalog.insert(entry);
        }

        catalog
    }
}

/// Load repository catalog from CSV file at target path.
///
/// Rows are read in file order. Blank rows are skipped, and later rows
/// overwrite earlier rows with the same name. Rows shorter than the header
/// have their missing fields read as empty strings.
///
/// # Errors
///
/// - Return [`CatalogError::Missing`] if catalog file does not exist.
/// - Return [`CatalogError::Io`] if catalog file cannot be opened.
/// - Return [`CatalogError::MissingColumn`] if header lacks a required column.
/// - Return [`CatalogError::Csv`] if catalog cannot be parsed.
#[instrument(skip(path), level = "debug")]
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    debug!("load catalog: {:?}", path.display());
    let file = File::open(path).map_err(|error| match error.kind() {
        ErrorKind::NotFound => CatalogError::Missing {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    })?;

    parse_catalog(file)
}

fn parse_catalog(reader: impl Read) -> Result<Catalog> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let name_idx = column_index(&headers, "name")?;
    let url_idx = column_index(&headers, "repo_url")?;

    let mut catalog = Catalog::default();
    for record in reader.records() {
        let record = record?;

        // INVARIANT: Skip rows with nothing in them.
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let name = field(name_idx);
        if name.is_empty() {
            warn!(
                "skip catalog row {} with no repository name",
                record.position().map(|pos| pos.line()).unwrap_or_default()
            );
            continue;
        }

        let metadata = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != name_idx && *idx != url_idx)
            .map(|(idx, header)| (header.to_string(), field(idx)))
            .collect();

        let entry = RepoEntry {
            name,
            repo_url: field(url_idx),
            metadata,
        };

        if let Some(prior) = catalog.insert(entry) {
            debug!("catalog entry {:?} overwritten by later row", prior.name);
        }
    }

    Ok(catalog)
}

fn column_index(headers: &StringRecord, column: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or(CatalogError::MissingColumn(column))
}

/// Catalog error types.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file does not exist.
    #[error("{} not found", .path.display())]
    Missing { path: PathBuf },

    /// Catalog file exists, but cannot be read.
    #[error("failed to read catalog {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog header lacks a required column.
    #[error("catalog header is missing required column {0:?}")]
    MissingColumn(&'static str),

    /// Catalog is not valid CSV.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Friendly result alias :3
type Result<T, E = CatalogError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    fn entry(name: &str, url: &str, description: &str) -> RepoEntry {
        RepoEntry {
            name: name.into(),
            repo_url: url.into(),
            metadata: BTreeMap::from([("description".into(), description.into())]),
        }
    }

    #[test]
    fn parse_catalog_with_metadata() -> anyhow::Result<()> {
        let data = indoc! {r#"
            name,repo_url,description
            docs-b,https://git.example/org/docs-b,Reference for B
            docs-a,https://git.example/org/docs-a,"Guides, for A"
        "#};

        let result = parse_catalog(data.as_bytes())?;
        let expect = Catalog::from_iter([
            entry("docs-a", "https://git.example/org/docs-a", "Guides, for A"),
            entry("docs-b", "https://git.example/org/docs-b", "Reference for B"),
        ]);

        assert_eq!(result, expect);
        assert_eq!(result.names().collect::<Vec<_>>(), vec!["docs-a", "docs-b"]);

        Ok(())
    }

    #[test]
    fn parse_catalog_skips_empty_rows() -> anyhow::Result<()> {
        let data = indoc! {r#"
            name,repo_url,description

            docs-a,https://git.example/org/docs-a,Guides for A
            ,,

            ,https://git.example/org/orphan,No name
        "#};

        let result = parse_catalog(data.as_bytes())?;
        assert_eq!(result.len(), 1);
        assert!(result.contains("docs-a"));

        Ok(())
    }

    #[test]
    fn parse_catalog_last_duplicate_wins() -> anyhow::Result<()> {
        let data = indoc! {r#"
            name,repo_url,description
            docs-a,https://git.example/org/old,First
            docs-a,https://git.example/org/new,Second
        "#};

        let result = parse_catalog(data.as_bytes())?;
        assert_eq!(result.len(), 1);
        assert_eq!(
            result.get("docs-a"),
            Some(&entry("docs-a", "https://git.example/org/new", "Second"))
        );

        Ok(())
    }

    #[test]
    fn parse_catalog_short_row_has_empty_url() -> anyhow::Result<()> {
        let data = indoc! {r#"
            name,description,repo_url
            docs-a,Guides for A
        "#};

        let result = parse_catalog(data.as_bytes())?;
        assert_eq!(
            result.get("docs-a"),
            Some(&entry("docs-a", "", "Guides for A"))
        );

        Ok(())
    }

    #[test]
    fn parse_catalog_requires_columns() {
        let result = parse_catalog("name,url\ndocs-a,https://git.example/a\n".as_bytes());
        assert!(matches!(result, Err(CatalogError::MissingColumn("repo_url"))));

        let result = parse_catalog("title,repo_url\ndocs-a,https://git.example/a\n".as_bytes());
        assert!(matches!(result, Err(CatalogError::MissingColumn("name"))));
    }

    #[sealed_test]
    fn load_catalog_missing_file() -> anyhow::Result<()> {
        let result = load_catalog("repos.csv");
        assert!(matches!(result, Err(CatalogError::Missing { .. })));

        let result = Catalog::load_or_empty("repos.csv")?;
        assert!(result.is_empty());

        Ok(())
    }

    #[sealed_test]
    fn load_catalog_from_file() -> anyhow::Result<()> {
        std::fs::write(
            "repos.csv",
            "name,repo_url\ndocs-a,https://git.example/org/docs-a\n",
        )?;

        let result = Catalog::load_or_empty("repos.csv")?;
        assert_eq!(
            result.get("docs-a").map(|entry| entry.repo_url.as_str()),
            Some("https://git.example/org/docs-a")
        );

        Ok(())
    }
}
