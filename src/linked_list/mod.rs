//! Linked list implementations.
//!
//! The [`concurrent`] list is shared between threads by reference (usually behind an `Arc`).
//! Each node is guarded by its own reader-writer lock, and positional operations use lock
//! coupling: a walker always takes the next node's lock before it lets go of the current one.
//!
//! # Examples
//!
//! ```
//! use mola_coupled_list::linked_list::concurrent::{prelude::*, ConcurrentList};
//!
//! let list = ConcurrentList::new();
//! list.insert_last(1).unwrap();
//! list.insert_last(2).unwrap();
//! list.insert_last(3).unwrap();
//! assert_eq!(list.len(), 3);
//!
//! list.remove_at(1).unwrap();
//! assert_eq!(list.get_at(1), Ok(3));
//!
//! list.remove_where(|v| *v == 3).unwrap();
//! let mut values = vec![];
//! list.map(|v| values.push(*v));
//! assert_eq!(values, vec![1]);
//! ```
pub mod concurrent;
