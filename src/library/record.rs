//! Content records loaded from the library.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::order::DisplayOrdered;
use crate::core::slug::{is_identifier, to_identifier};

/// Canonical identifier of a content item (file stem, URL segment)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Accept `text` only if it is already a canonical identifier
    pub fn parse(text: &str) -> Option<Self> {
        is_identifier(text).then(|| Self(text.to_string()))
    }

    /// Derive an identifier from a display title
    pub fn from_title(title: &str) -> Option<Self> {
        let id = to_identifier(title);
        (!id.is_empty()).then_some(Self(id))
    }

    /// Derive an identifier from a content file path (stem without extension)
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()?.to_str().and_then(Self::parse)
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A "where to go next" pointer: target album name and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAlbum(pub String, pub String);

impl NextAlbum {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn description(&self) -> &str {
        &self.1
    }
}

/// Frontmatter of an album file.
///
/// Only `title` and the display order are checked. The other known fields are
/// typed when their value fits; a value that doesn't fit leaves the field
/// unset and stays in `extra` under its original key, like any unknown field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawFrontmatter")]
pub struct Frontmatter {
    /// Display title
    pub title: String,

    /// Display order within the category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,

    /// Cover art path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,

    /// Bandcamp embedded player album code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandcamp_code: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandcamp_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spotify_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,

    /// Recommended follow-up albums
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next_albums: Vec<NextAlbum>,

    /// Unrecognized fields, and known fields whose value didn't fit
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Wire shape of the frontmatter mapping: the checked fields plus everything
/// else untouched
#[derive(Deserialize)]
struct RawFrontmatter {
    title: String,

    #[serde(default, alias = "displayOrder")]
    index: Option<i64>,

    #[serde(flatten)]
    rest: BTreeMap<String, serde_yaml::Value>,
}

impl From<RawFrontmatter> for Frontmatter {
    fn from(raw: RawFrontmatter) -> Self {
        let mut extra = raw.rest;

        Self {
            title: raw.title,
            index: raw.index,
            release_date: take_field(&mut extra, "releaseDate", |v| v.as_str()?.trim().parse().ok()),
            image_src: take_field(&mut extra, "imageSrc", as_text),
            bandcamp_code: take_field(&mut extra, "bandcampCode", as_id),
            bandcamp_link: take_field(&mut extra, "bandcampLink", as_text),
            spotify_link: take_field(&mut extra, "spotifyLink", as_text),
            youtube_link: take_field(&mut extra, "youtubeLink", as_text),
            album_id: take_field(&mut extra, "albumId", as_id),
            track_id: take_field(&mut extra, "trackId", as_id),
            next_albums: take_field(&mut extra, "nextAlbums", |v| {
                serde_yaml::from_value(v.clone()).ok()
            })
            .unwrap_or_default(),
            extra,
        }
    }
}

/// Move `key` out of `extra` if `convert` accepts its value. A null value is
/// dropped; a value `convert` rejects is left in place.
fn take_field<T>(
    extra: &mut BTreeMap<String, serde_yaml::Value>,
    key: &str,
    convert: impl Fn(&serde_yaml::Value) -> Option<T>,
) -> Option<T> {
    let value = extra.get(key)?;
    if value.is_null() {
        extra.remove(key);
        return None;
    }
    let converted = convert(value)?;
    extra.remove(key);
    Some(converted)
}

fn as_text(value: &serde_yaml::Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Numeric id, written bare or quoted
fn as_id(value: &serde_yaml::Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

impl Frontmatter {
    /// Create frontmatter with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            index: None,
            release_date: None,
            image_src: None,
            bandcamp_code: None,
            bandcamp_link: None,
            spotify_link: None,
            youtube_link: None,
            album_id: None,
            track_id: None,
            next_albums: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set the display order
    pub fn with_index(mut self, index: i64) -> Self {
        self.index = Some(index);
        self
    }
}

/// One content item backed by one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentRecord {
    /// Identifier derived from the file name
    pub slug: Slug,

    /// Parsed metadata block
    pub frontmatter: Frontmatter,

    /// Unparsed body text
    pub body: String,
}

impl ContentRecord {
    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }

    pub fn summary(&self) -> ContentSummary {
        ContentSummary {
            slug: self.slug.clone(),
            title: self.frontmatter.title.clone(),
            index: self.frontmatter.index,
        }
    }
}

impl DisplayOrdered for ContentRecord {
    fn display_order(&self) -> Option<i64> {
        self.frontmatter.index
    }
}

/// Slug and title pair for listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    pub slug: Slug,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

impl DisplayOrdered for ContentSummary {
    fn display_order(&self) -> Option<i64> {
        self.index
    }
}

/// A resolved `nextAlbums` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// Identifier computed from the target name
    pub slug: Slug,

    /// Name as written in the frontmatter
    pub name: String,

    pub description: String,

    /// Whether a content file exists for `slug`
    pub available: bool,
}
