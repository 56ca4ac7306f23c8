//! gizzdex - album content index for a discography site
//!
//! Loads album metadata from a directory of frontmatter files, keeps it in a
//! stable display order, and turns titles into URL-safe slugs.
//!
//! # Architecture
//!
//! - One file per album under `<content root>/<category>/`
//! - The file stem is the album's slug; frontmatter is never consulted for it
//! - Listings skip broken files; single lookups report them
//!
//! # Modules
//!
//! - `core`: Pure helpers (slug transform, display-order sort, random pick)
//! - `library`: Content files, index, cache, watcher, scaffolding
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # List albums
//! gizzdex list
//!
//! # Show one album
//! gizzdex show nonagon-infinity
//!
//! # Slug for a title
//! gizzdex slug "I'm In Your Mind Fuzz"
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod library;

// Re-export main types at crate root for convenience
pub use crate::core::{compare_display_order, sort_by_display_order, to_identifier, SelectionError};
pub use library::{
    CachedIndex, ContentError, ContentIndex, ContentRecord, ContentStore, Frontmatter, FsStore,
    Slug,
};
