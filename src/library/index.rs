//! Content index over a store of frontmatter files.
//!
//! Every call re-reads the store; nothing is cached here (see
//! [`super::cache::CachedIndex`] for that). A broken file never takes down a
//! listing: it is logged and skipped. Asking for that one file by slug does
//! surface the error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;

use super::frontmatter::{self, FrontmatterError};
use super::record::{ContentRecord, ContentSummary, Frontmatter, Recommendation, Slug};
use super::store::{is_valid_category, ContentStore, FsStore};
use crate::core::order::sort_by_display_order;
use crate::core::random::{self, SelectionError};

/// Errors loading a single content file
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse frontmatter in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontmatterError,
    },
}

impl ContentError {
    /// Path of the offending file
    pub fn path(&self) -> &Path {
        match self {
            ContentError::Read { path, .. } | ContentError::Parse { path, .. } => path,
        }
    }
}

/// Read-only index over one content store
#[derive(Debug, Clone)]
pub struct ContentIndex<S = FsStore> {
    store: S,
}

impl ContentIndex<FsStore> {
    /// Index the content root on disk
    pub fn open(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self::new(FsStore::with_extension(root, extension))
    }
}

impl<S: ContentStore> ContentIndex<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All records in a category, in display order.
    ///
    /// Unreadable or unparseable files are skipped with a warning. A category
    /// that would leave the content root lists as empty.
    pub async fn list_all(&self, category: &str) -> Vec<ContentRecord> {
        if !is_valid_category(category) {
            tracing::warn!("Rejecting invalid category {:?}", category);
            return Vec::new();
        }

        let paths = match self.store.list(category).await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!("Cannot list category '{}': {}", category, e);
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(slug) = Slug::from_path(&path) else {
                tracing::warn!(
                    "Skipping {}: file name is not a valid identifier",
                    path.display()
                );
                continue;
            };

            match self.load(&path, slug).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping content file: {}", e),
            }
        }

        sort_by_display_order(&mut records);
        records
    }

    /// Load one record by slug.
    ///
    /// `Ok(None)` when no such file exists; an error when it exists but
    /// cannot be read or parsed.
    pub async fn get_one(
        &self,
        category: &str,
        slug: &str,
    ) -> Result<Option<ContentRecord>, ContentError> {
        if !is_valid_category(category) {
            tracing::debug!("Rejecting invalid category {:?}", category);
            return Ok(None);
        }
        let Some(slug) = Slug::parse(slug) else {
            tracing::debug!("Rejecting non-canonical slug {:?}", slug);
            return Ok(None);
        };

        let path = self.store.locate(category, slug.as_str());
        match self.load(&path, slug).await {
            Ok(record) => Ok(Some(record)),
            Err(ContentError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Slug, title and index of every record, in display order
    pub async fn summaries(&self, category: &str) -> Vec<ContentSummary> {
        self.list_all(category)
            .await
            .iter()
            .map(ContentRecord::summary)
            .collect()
    }

    /// Every slug in the category, in display order
    pub async fn slugs(&self, category: &str) -> Vec<Slug> {
        self.list_all(category)
            .await
            .into_iter()
            .map(|record| record.slug)
            .collect()
    }

    /// Pick a random slug from the category
    pub async fn random_slug<R>(&self, category: &str, rng: &mut R) -> Result<Slug, SelectionError>
    where
        R: Rng + ?Sized,
    {
        let slugs = self.slugs(category).await;
        random::pick(&slugs, rng).cloned()
    }

    /// Resolve a record's `nextAlbums` entries to slugs in the same category
    pub async fn recommendations(
        &self,
        category: &str,
        record: &ContentRecord,
    ) -> Vec<Recommendation> {
        if record.frontmatter.next_albums.is_empty() {
            return Vec::new();
        }

        let known: HashSet<Slug> = self.slugs(category).await.into_iter().collect();

        record
            .frontmatter
            .next_albums
            .iter()
            .filter_map(|next| {
                let Some(slug) = Slug::from_title(next.name()) else {
                    tracing::warn!(
                        "'{}' recommends '{}', which has no usable identifier",
                        record.slug,
                        next.name()
                    );
                    return None;
                };
                Some(Recommendation {
                    available: known.contains(&slug),
                    slug,
                    name: next.name().to_string(),
                    description: next.description().to_string(),
                })
            })
            .collect()
    }

    async fn load(&self, path: &Path, slug: Slug) -> Result<ContentRecord, ContentError> {
        let raw = self
            .store
            .read(path)
            .await
            .map_err(|source| ContentError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let (frontmatter, body): (Frontmatter, String) =
            frontmatter::parse(&raw).map_err(|source| ContentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(ContentRecord {
            slug,
            frontmatter,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;

    use async_trait::async_trait;

    /// In-memory store where a `None` entry fails to read
    struct MemoryStore {
        files: Vec<(PathBuf, Option<String>)>,
    }

    impl MemoryStore {
        fn new(files: &[(&str, Option<&str>)]) -> Self {
            Self {
                files: files
                    .iter()
                    .map(|(p, c)| (PathBuf::from(p), c.map(str::to_string)))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        async fn list(&self, category: &str) -> io::Result<Vec<PathBuf>> {
            Ok(self
                .files
                .iter()
                .map(|(p, _)| p.clone())
                .filter(|p| p.starts_with(category))
                .collect())
        }

        async fn read(&self, path: &Path) -> io::Result<String> {
            let files: HashMap<_, _> = self.files.iter().cloned().collect();
            match files.get(path) {
                Some(Some(text)) => Ok(text.clone()),
                Some(None) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
                None => Err(io::Error::new(io::ErrorKind::NotFound, "missing")),
            }
        }

        fn locate(&self, category: &str, slug: &str) -> PathBuf {
            PathBuf::from(category).join(format!("{}.mdx", slug))
        }
    }

    #[tokio::test]
    async fn test_read_failure_is_skipped_in_listing() {
        let store = MemoryStore::new(&[
            ("albums/changes.mdx", Some("---\ntitle: Changes\nindex: 2\n---\n")),
            ("albums/locked.mdx", None),
            ("albums/omnium-gatherum.mdx", Some("---\ntitle: Omnium Gatherum\nindex: 1\n---\n")),
        ]);
        let index = ContentIndex::new(store);

        let slugs = index.slugs("albums").await;
        let slugs: Vec<_> = slugs.iter().map(Slug::as_str).collect();
        assert_eq!(slugs, vec!["omnium-gatherum", "changes"]);
    }

    #[tokio::test]
    async fn test_read_failure_is_surfaced_for_single_lookup() {
        let store = MemoryStore::new(&[("albums/locked.mdx", None)]);
        let index = ContentIndex::new(store);

        let err = index.get_one("albums", "locked").await.unwrap_err();
        assert!(matches!(err, ContentError::Read { .. }));
        assert_eq!(err.path(), Path::new("albums/locked.mdx"));
    }

    #[tokio::test]
    async fn test_non_canonical_slug_is_absent() {
        let store = MemoryStore::new(&[("albums/kg.mdx", Some("---\ntitle: K.G.\n---\n"))]);
        let index = ContentIndex::new(store);

        assert!(index.get_one("albums", "../albums/kg").await.unwrap().is_none());
        assert!(index.get_one("albums", "KG").await.unwrap().is_none());
        assert!(index.get_one("albums", "kg").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_category_outside_root_is_absent() {
        let store = MemoryStore::new(&[
            ("../secret/kg.mdx", Some("---\ntitle: Secret\n---\n")),
            ("albums/kg.mdx", Some("---\ntitle: K.G.\n---\n")),
        ]);
        let index = ContentIndex::new(store);

        assert!(index.list_all("..").await.is_empty());
        assert!(index.list_all("").await.is_empty());
        assert!(index.get_one("../secret", "kg").await.unwrap().is_none());
        assert!(index.get_one("/albums", "kg").await.unwrap().is_none());
        assert!(index.get_one("albums", "kg").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recommendations() {
        let store = MemoryStore::new(&[
            (
                "albums/nonagon-infinity.mdx",
                Some(
                    "---\ntitle: Nonagon Infinity\nnextAlbums:\n  - [\"Gumboot Soup\", \"Loose ends\"]\n  - [\"Made In Timeland\", \"Dance\"]\n  - [\"!!!\", \"Nothing\"]\n---\n",
                ),
            ),
            ("albums/gumboot-soup.mdx", Some("---\ntitle: Gumboot Soup\n---\n")),
        ]);
        let index = ContentIndex::new(store);

        let record = index
            .get_one("albums", "nonagon-infinity")
            .await
            .unwrap()
            .unwrap();
        let recs = index.recommendations("albums", &record).await;

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].slug.as_str(), "gumboot-soup");
        assert!(recs[0].available);
        assert_eq!(recs[0].description, "Loose ends");
        assert_eq!(recs[1].slug.as_str(), "made-in-timeland");
        assert!(!recs[1].available);
    }
}
