//! Explicit result of asking one source for records.

use crate::error::{AuctionError, Result};

/// What a source adapter produced: rows, nothing, or a failure.
///
/// On the listing path `Empty` and `Failed` both lead to the next source,
/// but they are kept apart so the controller can log and tag them
/// differently.
#[derive(Debug)]
pub enum Outcome<T> {
    Rows(Vec<T>),
    Empty,
    Failed(AuctionError),
}

impl<T> Outcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl<T> From<Result<Vec<T>>> for Outcome<T> {
    fn from(result: Result<Vec<T>>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => Outcome::Empty,
            Ok(rows) => Outcome::Rows(rows),
            Err(e) => Outcome::Failed(e),
        }
    }
}
