//! New album scaffolding.
//!
//! Writes a fresh content file with frontmatter filled in and the next free
//! display index. Existing files are never overwritten.

use std::path::PathBuf;

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::index::ContentIndex;
use super::record::{Frontmatter, NextAlbum, Slug};
use super::store::{is_valid_category, ContentStore};

/// Errors that can occur creating a new album file
#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("Invalid slug {0:?}: use lowercase letters, digits and single hyphens")]
    InvalidSlug(String),

    #[error("Invalid category {0:?}: must be a relative path inside the content root")]
    InvalidCategory(String),

    #[error("No display index left after {0}")]
    IndexOverflow(i64),

    #[error("Content file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Details for a new album
#[derive(Debug, Clone, Default)]
pub struct NewAlbum {
    pub title: String,

    /// Defaults to the identifier derived from the title
    pub slug: Option<String>,

    pub bandcamp_code: Option<u64>,

    /// `(album name, why)` recommendations
    pub next_albums: Vec<(String, String)>,

    /// Markdown placed under the heading
    pub description: String,
}

impl NewAlbum {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// The slug this album will be written under
    pub fn resolve_slug(&self) -> Result<Slug, ScaffoldError> {
        match &self.slug {
            Some(slug) => Slug::parse(slug).ok_or_else(|| ScaffoldError::InvalidSlug(slug.clone())),
            None => Slug::from_title(&self.title)
                .ok_or_else(|| ScaffoldError::InvalidSlug(self.title.clone())),
        }
    }

    /// Render the full file text for the given display index
    pub fn render(&self, index: i64) -> Result<String, ScaffoldError> {
        let mut frontmatter = Frontmatter::new(self.title.clone()).with_index(index);
        frontmatter.bandcamp_code = self.bandcamp_code;
        frontmatter.next_albums = self
            .next_albums
            .iter()
            .map(|(name, why)| NextAlbum(name.clone(), why.clone()))
            .collect();

        let yaml = serde_yaml::to_string(&frontmatter)?;
        let mut text = format!("---\n{}---\n\n# {}\n", yaml, self.title);
        if !self.description.trim().is_empty() {
            text.push('\n');
            text.push_str(self.description.trim_end());
            text.push('\n');
        }
        Ok(text)
    }
}

/// Next free display index in a category.
///
/// One past the highest index in use, and never below the file count + 1 so
/// unindexed albums are accounted for.
pub async fn next_index<S: ContentStore>(
    index: &ContentIndex<S>,
    category: &str,
) -> Result<i64, ScaffoldError> {
    let records = index.list_all(category).await;
    let highest = records
        .iter()
        .filter_map(|r| r.frontmatter.index)
        .max()
        .unwrap_or(0)
        .max(records.len() as i64);
    highest
        .checked_add(1)
        .ok_or(ScaffoldError::IndexOverflow(highest))
}

/// Create the content file for a new album and return its path
pub async fn scaffold<S: ContentStore>(
    index: &ContentIndex<S>,
    category: &str,
    album: &NewAlbum,
) -> Result<PathBuf, ScaffoldError> {
    if !is_valid_category(category) {
        return Err(ScaffoldError::InvalidCategory(category.to_string()));
    }
    let slug = album.resolve_slug()?;
    let path = index.store().locate(category, slug.as_str());

    let display_index = next_index(index, category).await?;
    let text = album.render(display_index)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(ScaffoldError::AlreadyExists(path));
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(text.as_bytes()).await?;
    file.flush().await?;

    tracing::info!("Created {} (album #{})", path.display(), display_index);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::frontmatter;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_slug() {
        let album = NewAlbum::new("The Silver Cord");
        assert_eq!(album.resolve_slug().unwrap().as_str(), "the-silver-cord");

        let custom = NewAlbum {
            slug: Some("silver-cord".to_string()),
            ..NewAlbum::new("The Silver Cord")
        };
        assert_eq!(custom.resolve_slug().unwrap().as_str(), "silver-cord");

        let bad = NewAlbum {
            slug: Some("Silver Cord".to_string()),
            ..NewAlbum::new("The Silver Cord")
        };
        assert!(matches!(bad.resolve_slug(), Err(ScaffoldError::InvalidSlug(_))));

        assert!(NewAlbum::new("???").resolve_slug().is_err());
    }

    #[test]
    fn test_render_parses_back() {
        let album = NewAlbum {
            bandcamp_code: Some(1_234_567),
            next_albums: vec![("Laminated Denim".to_string(), "Two long jams".to_string())],
            description: "Seven tracks, two versions each.".to_string(),
            ..NewAlbum::new("The Silver Cord")
        };

        let text = album.render(25).unwrap();
        let (fm, body): (Frontmatter, String) = frontmatter::parse(&text).unwrap();

        assert_eq!(fm.title, "The Silver Cord");
        assert_eq!(fm.index, Some(25));
        assert_eq!(fm.bandcamp_code, Some(1_234_567));
        assert_eq!(fm.next_albums[0].name(), "Laminated Denim");
        assert!(body.contains("# The Silver Cord"));
        assert!(body.contains("Seven tracks"));
    }

    #[tokio::test]
    async fn test_scaffold_writes_next_index_and_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let albums = temp.path().join("albums");
        std::fs::create_dir_all(&albums).unwrap();
        std::fs::write(albums.join("changes.mdx"), "---\ntitle: Changes\nindex: 24\n---\n").unwrap();
        std::fs::write(albums.join("demos.mdx"), "---\ntitle: Demos\n---\n").unwrap();

        let index = ContentIndex::open(temp.path(), "mdx");
        assert_eq!(next_index(&index, "albums").await.unwrap(), 25);

        let album = NewAlbum::new("Flight b741");
        let path = scaffold(&index, "albums", &album).await.unwrap();
        assert_eq!(path, albums.join("flight-b741.mdx"));

        let record = index.get_one("albums", "flight-b741").await.unwrap().unwrap();
        assert_eq!(record.frontmatter.index, Some(25));

        let again = scaffold(&index, "albums", &album).await;
        assert!(matches!(again, Err(ScaffoldError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_scaffold_into_empty_category() {
        let temp = TempDir::new().unwrap();
        let index = ContentIndex::open(temp.path(), "mdx");

        let path = scaffold(&index, "albums", &NewAlbum::new("12 Bar Bruise")).await.unwrap();
        assert!(path.ends_with("albums/12-bar-bruise.mdx"));

        let record = index.get_one("albums", "12-bar-bruise").await.unwrap().unwrap();
        assert_eq!(record.frontmatter.index, Some(1));
    }

    #[tokio::test]
    async fn test_scaffold_after_highest_possible_index() {
        let temp = TempDir::new().unwrap();
        let albums = temp.path().join("albums");
        std::fs::create_dir_all(&albums).unwrap();
        std::fs::write(
            albums.join("last.mdx"),
            format!("---\ntitle: Last\nindex: {}\n---\n", i64::MAX),
        )
        .unwrap();

        let index = ContentIndex::open(temp.path(), "mdx");
        assert!(matches!(
            next_index(&index, "albums").await,
            Err(ScaffoldError::IndexOverflow(i64::MAX))
        ));

        let result = scaffold(&index, "albums", &NewAlbum::new("One More")).await;
        assert!(matches!(result, Err(ScaffoldError::IndexOverflow(_))));
        assert!(!albums.join("one-more.mdx").exists());
    }

    #[tokio::test]
    async fn test_scaffold_rejects_category_outside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("data");
        let index = ContentIndex::open(&root, "mdx");

        for category in ["..", "../escaped", "/tmp", ""] {
            let result = scaffold(&index, category, &NewAlbum::new("Escape")).await;
            assert!(
                matches!(result, Err(ScaffoldError::InvalidCategory(_))),
                "category {:?} gave {:?}",
                category,
                result
            );
        }
        assert!(!temp.path().join("escape.mdx").exists());
        assert!(!temp.path().join("escaped").exists());
    }
}
