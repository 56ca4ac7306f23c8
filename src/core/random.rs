//! Random selection for the "surprise me" link.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Errors from random selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Nothing to choose from: collection is empty")]
    Empty,
}

/// Pick one item uniformly at random using the given RNG.
pub fn pick<'a, T, R>(items: &'a [T], rng: &mut R) -> Result<&'a T, SelectionError>
where
    R: Rng + ?Sized,
{
    items.choose(rng).ok_or(SelectionError::Empty)
}

/// Pick one item uniformly at random using the thread-local RNG.
pub fn pick_random<T>(items: &[T]) -> Result<&T, SelectionError> {
    pick(items, &mut rand::thread_rng())
}
