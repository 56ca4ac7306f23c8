//! Display-order sorting.
//!
//! Content items carry an optional numeric `index`. Items with an index come
//! first in ascending order; items without one follow in their original
//! order.

use std::cmp::Ordering;

/// Anything that can be placed by an optional display order
pub trait DisplayOrdered {
    fn display_order(&self) -> Option<i64>;
}

impl<T: DisplayOrdered + ?Sized> DisplayOrdered for &T {
    fn display_order(&self) -> Option<i64> {
        (**self).display_order()
    }
}

/// Compare two optional display orders, absent values last.
pub fn compare_display_order(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort items in place by display order.
///
/// `sort_by` is stable, so ties and unordered items keep their encounter
/// order.
pub fn sort_by_display_order<T: DisplayOrdered>(items: &mut [T]) {
    items.sort_by(|a, b| compare_display_order(a.display_order(), b.display_order()));
}
