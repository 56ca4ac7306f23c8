//! Pure helpers shared by the library and the CLI.
//!
//! - `slug`: title to URL identifier transform
//! - `order`: display-order comparator and stable sort
//! - `random`: uniform random pick

pub mod order;
pub mod random;
pub mod slug;

pub use order::{compare_display_order, sort_by_display_order, DisplayOrdered};
pub use random::{pick, pick_random, SelectionError};
pub use slug::{is_identifier, to_identifier};
