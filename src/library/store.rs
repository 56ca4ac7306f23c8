//! Storage backends for content files.
//!
//! The index only needs two things from storage: the list of content files in
//! a category, and the text of one file. `FsStore` serves both from a content
//! root on disk laid out as `<root>/<category>/**/<slug>.<extension>`.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use glob::{glob_with, MatchOptions, Pattern};

/// Default content file extension
pub const DEFAULT_EXTENSION: &str = "mdx";

/// Whether `category` names a directory inside the content root.
///
/// Only plain relative components are allowed, so `albums` and `albums/live`
/// pass while `..`, `/etc` and `./albums` do not.
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && Path::new(category)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Source of raw content files
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All content files in a category, in a stable order.
    ///
    /// A missing category directory is an empty list.
    async fn list(&self, category: &str) -> io::Result<Vec<PathBuf>>;

    /// Read the full text of one file
    async fn read(&self, path: &Path) -> io::Result<String>;

    /// Where the file for `slug` lives (it may not exist)
    fn locate(&self, category: &str, slug: &str) -> PathBuf;
}

/// Content files on the local filesystem
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    extension: String,
}

impl FsStore {
    /// Create a store rooted at `root` using the default extension
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extension(root, DEFAULT_EXTENSION)
    }

    /// Create a store with a custom content file extension
    pub fn with_extension(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Directory holding a category's files
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category)
    }

    /// Check if a path has the content extension (case-sensitive, the same
    /// as `locate`)
    pub fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == self.extension)
            .unwrap_or(false)
    }

    fn glob_pattern(&self, category: &str) -> String {
        let dir = self.category_dir(category);
        format!(
            "{}/**/*.{}",
            Pattern::escape(&dir.to_string_lossy()),
            Pattern::escape(&self.extension)
        )
    }
}

#[async_trait]
impl ContentStore for FsStore {
    async fn list(&self, category: &str) -> io::Result<Vec<PathBuf>> {
        let pattern = self.glob_pattern(category);

        let paths = tokio::task::spawn_blocking(move || -> io::Result<Vec<PathBuf>> {
            let entries = glob_with(&pattern, MatchOptions::new())
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

            let mut paths = Vec::new();
            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => paths.push(path),
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping unreadable path {}: {}", e.path().display(), e),
                }
            }
            paths.sort();
            Ok(paths)
        })
        .await
        .map_err(io::Error::other)??;

        tracing::debug!("Found {} content files in '{}'", paths.len(), category);
        Ok(paths)
    }

    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    fn locate(&self, category: &str, slug: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", slug, self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_recursive_and_filtered() {
        let temp = TempDir::new().unwrap();
        let albums = temp.path().join("albums");
        std::fs::create_dir_all(albums.join("nested")).unwrap();

        std::fs::write(albums.join("quarters.mdx"), "x").unwrap();
        std::fs::write(albums.join("nested").join("oddments.mdx"), "x").unwrap();
        std::fs::write(albums.join("README.md"), "x").unwrap();
        std::fs::write(albums.join(".DS_Store"), "x").unwrap();

        let store = FsStore::new(temp.path());
        let files = store.list("albums").await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| store.is_content_file(p)));
    }

    #[tokio::test]
    async fn test_list_missing_category() {
        let temp = TempDir::new().unwrap();
        let store = FsStore::new(temp.path());
        assert!(store.list("albums").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_matches_extension_case_like_locate() {
        let temp = TempDir::new().unwrap();
        let albums = temp.path().join("albums");
        std::fs::create_dir_all(&albums).unwrap();
        std::fs::write(albums.join("lw.mdx"), "x").unwrap();
        std::fs::write(albums.join("kg.MDX"), "x").unwrap();

        let store = FsStore::new(temp.path());
        let files = store.list("albums").await.unwrap();

        assert_eq!(files, vec![store.locate("albums", "lw")]);
        assert!(!store.is_content_file(&albums.join("kg.MDX")));
    }

    #[test]
    fn test_is_valid_category() {
        assert!(is_valid_category("albums"));
        assert!(is_valid_category("albums/live"));

        assert!(!is_valid_category(""));
        assert!(!is_valid_category(".."));
        assert!(!is_valid_category("../.."));
        assert!(!is_valid_category("albums/../../etc"));
        assert!(!is_valid_category("/etc"));
        assert!(!is_valid_category("./albums"));
    }

    #[test]
    fn test_locate() {
        let store = FsStore::with_extension("/site/data", ".md");
        assert_eq!(store.extension(), "md");
        assert_eq!(
            store.locate("albums", "kg"),
            PathBuf::from("/site/data/albums/kg.md")
        );
    }
}
