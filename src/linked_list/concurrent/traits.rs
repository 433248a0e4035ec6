use crate::error::{InsertError, Result};

/// A trait defining the core positional list operations.
///
/// Indices are positions in the chain at the moment the walk reaches them. Under concurrent
/// mutation an index computed from an earlier [`len`](RawList::len) may no longer be valid,
/// which is reported as [`ListError::InvalidIndex`](crate::ListError::InvalidIndex), or for
/// inserts as an [`InsertError`](crate::InsertError) carrying the value back.
pub trait RawList<T>: Send + Sync {
    /// Insert `value` so that it ends up at `index`.
    ///
    /// # Returns
    /// The new length of the list. If the index is out of range, the error hands `value` back
    /// so the caller can retry.
    fn insert_at(&self, value: T, index: usize) -> Result<usize, InsertError<T>>;

    /// Remove the element at `index` and run the destructor on it.
    ///
    /// # Returns
    /// The new length of the list
    fn remove_at(&self, index: usize) -> Result<usize>;

    /// Remove the first element, in traversal order, for which `predicate` returns true.
    ///
    /// The scan takes one node lock at a time, so a concurrent insertion right behind the
    /// scan position may be missed.
    ///
    /// # Returns
    /// The new length of the list, or [`ListError::NoMatch`](crate::ListError::NoMatch)
    fn remove_where<P>(&self, predicate: P) -> Result<usize>
    where
        P: FnMut(&T) -> bool;

    /// Get the number of elements in the list.
    fn len(&self) -> usize;

    /// Check if the list is empty.
    fn is_empty(&self) -> bool;

    /// Insert `value` at the front of the list.
    fn insert_first(&self, value: T) -> Result<usize, InsertError<T>> {
        self.insert_at(value, 0)
    }

    /// Insert `value` at the back of the list.
    ///
    /// The length is read before the walk starts, so with concurrent writers the value lands
    /// at the position the tail had at that moment, or the call fails if the list shrank.
    fn insert_last(&self, value: T) -> Result<usize, InsertError<T>> {
        self.insert_at(value, self.len())
    }

    /// Remove the front element.
    fn remove_first(&self) -> Result<usize> {
        self.remove_at(0)
    }
}

/// A trait for read-only access to elements in place.
pub trait ReadableInPlaceList<T>: RawList<T> {
    /// Run `f` on the element at `index` while its node is read-locked.
    ///
    /// The closure runs under the lock and must not write to this list.
    fn view_at<F, R>(&self, index: usize, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R;

    /// Call `f` on every element from front to back.
    ///
    /// Only one node is locked at a time. Elements removed while the walk is in progress may
    /// be skipped, and the walk may stop early if the node it stands on is unlinked. `f` must
    /// not write to this list.
    fn map<F>(&self, f: F)
    where
        F: FnMut(&T);
}

/// A trait for getting owned copies of elements.
pub trait ReadableList<T: Clone>: ReadableInPlaceList<T> {
    /// Get a clone of the element at `index`.
    fn get_at(&self, index: usize) -> Result<T> {
        self.view_at(index, T::clone)
    }

    /// Get a clone of the front element.
    fn get_first(&self) -> Result<T> {
        self.get_at(0)
    }
}

/// A trait for modifying elements in place.
pub trait MutableInPlaceList<T>: RawList<T> {
    /// Run `f` on the element at `index` while its node is write-locked.
    fn alter_at<F, R>(&self, index: usize, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R;
}
