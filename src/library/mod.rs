//! Album content library.
//!
//! Albums live as one frontmatter file per album, grouped by category:
//!
//! # Storage Layout
//!
//! ```text
//! data/                               # content root
//! └── albums/                         # category
//!     ├── nonagon-infinity.mdx        # slug = file stem
//!     └── flying-microtonal-banana.mdx
//! ```
//!
//! Each file is a `---` fenced YAML block followed by the MDX body.

pub mod cache;
pub mod frontmatter;
pub mod index;
pub mod record;
pub mod scaffold;
pub mod store;
pub mod watch;

pub use cache::CachedIndex;
pub use frontmatter::FrontmatterError;
pub use index::{ContentError, ContentIndex};
pub use record::{ContentRecord, ContentSummary, Frontmatter, NextAlbum, Recommendation, Slug};
pub use scaffold::{NewAlbum, ScaffoldError};
pub use store::{ContentStore, FsStore};
pub use watch::{ContentChange, ContentWatcher, WatchError, WatchHandle};
