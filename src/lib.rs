//! Concurrent collections built on fine-grained locking.
//!
//! The main type is [`ConcurrentList`], a singly linked list where every node carries its own
//! reader-writer lock and positional operations walk the chain hand-over-hand.
#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod error;
pub mod linked_list;

pub use error::{InsertError, ListError, Result};
pub use linked_list::concurrent::ConcurrentList;
