//! Error types returned by list operations.

use core::fmt;

/// Errors returned by positional and search operations.
///
/// None of these are fatal. Under concurrent use an index that was valid when the caller
/// computed it may stop being valid before the walk reaches it, and that case is reported
/// the same way as an index that was never in range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The index is past the end of the chain at the moment of traversal.
    #[error("index {index} is out of range")]
    InvalidIndex {
        /// The index the caller asked for.
        index: usize,
    },
    /// No element satisfied the search predicate.
    #[error("no element matched the predicate")]
    NoMatch,
}

pub type Result<T, E = ListError> = core::result::Result<T, E>;

/// Returned by a failed insert, handing the value back to the caller.
///
/// The index was past the end of the chain when the walk reached it. Under concurrent removal
/// that is an expected outcome, and the caller can retry with [`value`](Self::value).
#[derive(thiserror::Error, Clone, PartialEq, Eq)]
#[error("index {index} is out of range")]
pub struct InsertError<T> {
    /// The value that was not inserted.
    pub value: T,
    /// The index the caller asked for.
    pub index: usize,
}

impl<T> InsertError<T> {
    /// Take back the value that was not inserted.
    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T> fmt::Debug for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<T> From<InsertError<T>> for ListError {
    fn from(err: InsertError<T>) -> Self {
        ListError::InvalidIndex { index: err.index }
    }
}
