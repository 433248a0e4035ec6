//! # Lock-Coupled Linked List
//!
//! A singly linked list shared between threads, with one reader-writer lock per node.
//!
//! ## Core Components
//!
//! - [`prelude`]: The list operation traits, split into raw, readable and mutable parts.
//! - [`ConcurrentList`]: The list itself.
//! - [`ConcurrentListBuilder`]: Configures the destructor and printer callbacks.
//!
//! ## Locking
//!
//! The head link has its own lock, and each node's lock guards that node's value and `next`
//! link. Positional operations (`insert_at`, `remove_at`, `view_at`, `alter_at`) walk from
//! the head holding at most two adjacent locks, taking the next lock before dropping the
//! current one. Nodes on the way are read-locked; only the node the operation works on is
//! write-locked. Every walker locks in chain order, which is what keeps the list free of
//! deadlocks.
//!
//! `map` and the scan in `remove_where` are weaker: they hold one node lock at a time and
//! may miss concurrent changes. Closures passed to them, and to `view_at`/`alter_at`, run
//! under a lock and must not write to the same list.
//!
//! Removed values go to the destructor right away. The node itself is freed through the
//! list's [`crossbeam_epoch::Collector`] once no traversal that might still see it is pinned,
//! so removals never wait for traversals elsewhere in the list.

mod builder;
mod list;
mod node;
mod select;
mod traits;

#[cfg(test)]
mod tests;

pub use builder::{ConcurrentListBuilder, Destructor, Printer};
pub use list::ConcurrentList;

pub mod prelude {
    pub use super::traits::*;
    pub use super::{ConcurrentList, ConcurrentListBuilder};
}
