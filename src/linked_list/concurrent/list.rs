use alloc::boxed::Box;
use alloc::string::String;
use core::fmt::{self, Write};
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_epoch::{Collector, Guard};
use crossbeam_utils::CachePadded;
use log::{debug, trace};
use spin::RwLock;

use crate::error::{InsertError, ListError, Result};

use super::builder::{ConcurrentListBuilder, Destructor, Printer};
use super::node::{Link, Node};
use super::select::{Exclusive, Shared};
use super::traits::{MutableInPlaceList, RawList, ReadableInPlaceList, ReadableList};

/// A singly linked list that can be shared between threads.
///
/// Every node has its own reader-writer lock guarding its value and its `next` link. The head
/// link has a separate lock. Positional operations walk the chain with lock coupling, so
/// writers at different positions do not block each other, and a walker can never step onto
/// a node that is being unlinked.
///
/// The list owns its values. Each value is passed to the destructor exactly once: when it is
/// removed, or when the list is dropped.
pub struct ConcurrentList<T> {
    /// Guards the head link only.
    head: CachePadded<RwLock<Link<T>>>,
    len: AtomicUsize,
    /// Weak traversals are pinned in this collector's epoch. Unlinked nodes are freed through
    /// it, so a node reached through a stale link is still allocated.
    collector: Collector,
    destructor: Option<Destructor<T>>,
    printer: Option<Printer<T>>,
    _marker: PhantomData<T>,
}

impl<T> ConcurrentList<T> {
    /// Create an empty list whose values are dropped normally.
    pub fn new() -> Self {
        Self::from_parts(None, None)
    }

    /// Create an empty list that passes every value leaving it to `destructor`.
    pub fn with_destructor<F>(destructor: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        ConcurrentListBuilder::new()
            .with_destructor(destructor)
            .build()
    }

    /// Start configuring a list.
    pub fn builder() -> ConcurrentListBuilder<T> {
        ConcurrentListBuilder::new()
    }

    pub(crate) fn from_parts(destructor: Option<Destructor<T>>, printer: Option<Printer<T>>) -> Self {
        Self {
            head: CachePadded::new(RwLock::new(None)),
            len: AtomicUsize::new(0),
            collector: Collector::new(),
            destructor,
            printer,
            _marker: PhantomData,
        }
    }

    /// Set the function used to write each value in [`render`](Self::render).
    pub fn set_printer<F>(&mut self, printer: F)
    where
        F: Fn(&mut dyn fmt::Write, &T) -> fmt::Result + Send + Sync + 'static,
    {
        self.printer = Some(Box::new(printer));
    }

    #[inline]
    pub(crate) fn head_lock(&self) -> &RwLock<Link<T>> {
        &self.head
    }

    /// Render the list as `(ll: v1 v2 ...), length: N`.
    ///
    /// Values are collected with [`map`](ReadableInPlaceList::map), so the output is a
    /// best-effort view if other threads are writing. Returns `None` when no printer is set.
    pub fn render(&self) -> Option<String> {
        let printer = self.printer.as_ref()?;
        let mut out = String::from("(ll:");
        let mut result = Ok(());
        self.for_each_live(|value| {
            if result.is_ok() {
                out.push(' ');
                result = printer(&mut out, value);
            }
        });
        if result.is_err() {
            debug!("render: printer failed, output truncated");
        }
        // Writing to a `String` cannot fail.
        let _ = write!(out, "), length: {}", self.len.load(Ordering::Acquire));
        Some(out)
    }

    /// Print [`render`](Self::render) to standard output. Does nothing without a printer.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        if let Some(rendered) = self.render() {
            std::println!("{rendered}");
        }
    }

    /// Tear the list down, running the destructor on every remaining value.
    pub fn destroy(self) {
        drop(self);
    }

    fn teardown(&self, value: T) {
        match &self.destructor {
            Some(destructor) => destructor(value),
            None => drop(value),
        }
    }

    /// Pin the current thread in this list's epoch.
    #[inline]
    fn pin(&self) -> Guard {
        self.collector.register().pin()
    }

    /// Run the destructor on the value of an unlinked node, and free the node once every
    /// traversal pinned before the unlink has finished.
    ///
    /// Must be called without holding any lock of this list.
    fn retire(&self, guard: &Guard, node: NonNull<Node<T>>, value: Option<T>) {
        let free = move || {
            // Safety: by the time this runs no thread can reach the node any more.
            drop(unsafe { Node::into_value(node) });
        };
        // Safety: the node was unlinked and cleared under its own write lock, so no coupled
        // walker can reach it. Weak traversals that still can are pinned no later than `guard`.
        unsafe { guard.defer_unchecked(free) };
        trace!("retired node {node:p}");
        if let Some(value) = value {
            self.teardown(value);
        }
    }

    fn for_each_live<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let _guard = self.pin();
        let mut current = *self.head.read();
        while let Some(ptr) = current {
            // Safety: we are pinned, and unlinked nodes are only freed once no pinned thread
            // can still see them.
            let slot = unsafe { Node::get(ptr) }.slot.read();
            if let Some(value) = &slot.value {
                f(value);
            }
            current = slot.next;
        }
    }

    /// Find the first node matching `predicate`, along with the node before it.
    fn scan<P>(
        &self,
        _guard: &Guard,
        predicate: &mut P,
    ) -> Option<(Link<T>, NonNull<Node<T>>)>
    where
        P: FnMut(&T) -> bool,
    {
        let mut prev = None;
        let mut current = *self.head.read();
        while let Some(ptr) = current {
            // Safety: the caller is pinned, so `ptr` has not been freed.
            let slot = unsafe { Node::get(ptr) }.slot.read();
            if slot.value.as_ref().is_some_and(&mut *predicate) {
                return Some((prev, ptr));
            }
            prev = current;
            current = slot.next;
        }
        None
    }

    /// Unlink `found` if `prev` (or the head, when `prev` is `None`) still links to it.
    ///
    /// # Returns
    /// The new length and the removed value, or `None` if the chain changed since the scan.
    fn unlink_found(
        &self,
        _guard: &Guard,
        prev: Link<T>,
        found: NonNull<Node<T>>,
    ) -> Option<(usize, Option<T>)> {
        // Safety: the caller is pinned, so neither node has been freed.
        match prev {
            None => {
                let mut head = self.head.write();
                if *head != Some(found) {
                    return None;
                }
                let (next, value) = unsafe { Node::get(found) }.slot.write().detach();
                *head = next;
                Some((self.len.fetch_sub(1, Ordering::AcqRel) - 1, value))
            }
            Some(prev) => {
                let mut prev_slot = unsafe { Node::get(prev) }.slot.write();
                if prev_slot.next != Some(found) {
                    return None;
                }
                let (next, value) = unsafe { Node::get(found) }.slot.write().detach();
                prev_slot.next = next;
                Some((self.len.fetch_sub(1, Ordering::AcqRel) - 1, value))
            }
        }
    }
}

impl<T> Default for ConcurrentList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RawList<T> for ConcurrentList<T>
where
    T: Send + Sync,
{
    fn insert_at(&self, value: T, index: usize) -> Result<usize, InsertError<T>> {
        let Some(mut cursor) = self.select::<Exclusive>(index) else {
            return Err(InsertError { value, index });
        };
        let link = cursor.link_mut();
        *link = Some(Node::alloc(value, link.take()));
        // Counted before the cursor is released, so the matching decrement cannot run first.
        let len = self.len.fetch_add(1, Ordering::AcqRel) + 1;
        drop(cursor);
        Ok(len)
    }

    fn remove_at(&self, index: usize) -> Result<usize> {
        let guard = self.pin();
        let mut cursor = self
            .select::<Exclusive>(index)
            .ok_or(ListError::InvalidIndex { index })?;
        let link = cursor.link_mut();
        let Some(victim) = *link else {
            trace!("remove_at: no node at {index}");
            return Err(ListError::InvalidIndex { index });
        };
        // Safety: `victim` is owned by the link we hold exclusively. Taking its lock waits
        // out any walker that is already standing on it.
        let (next, value) = unsafe { Node::get(victim) }.slot.write().detach();
        *link = next;
        let len = self.len.fetch_sub(1, Ordering::AcqRel) - 1;
        drop(cursor);
        self.retire(&guard, victim, value);
        Ok(len)
    }

    fn remove_where<P>(&self, mut predicate: P) -> Result<usize>
    where
        P: FnMut(&T) -> bool,
    {
        let guard = self.pin();
        loop {
            let Some((prev, found)) = self.scan(&guard, &mut predicate) else {
                return Err(ListError::NoMatch);
            };
            match self.unlink_found(&guard, prev, found) {
                Some((len, value)) => {
                    self.retire(&guard, found, value);
                    return Ok(len);
                }
                None => debug!("remove_where: match at {found:p} moved, rescanning"),
            }
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> ReadableInPlaceList<T> for ConcurrentList<T>
where
    T: Send + Sync,
{
    fn view_at<F, R>(&self, index: usize, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let slot = self
            .node_at::<Shared>(index)
            .ok_or(ListError::InvalidIndex { index })?;
        slot.value
            .as_ref()
            .map(f)
            .ok_or(ListError::InvalidIndex { index })
    }

    fn map<F>(&self, f: F)
    where
        F: FnMut(&T),
    {
        self.for_each_live(f);
    }
}

impl<T> ReadableList<T> for ConcurrentList<T> where T: Clone + Send + Sync {}

impl<T> MutableInPlaceList<T> for ConcurrentList<T>
where
    T: Send + Sync,
{
    fn alter_at<F, R>(&self, index: usize, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut slot = self
            .node_at::<Exclusive>(index)
            .ok_or(ListError::InvalidIndex { index })?;
        slot.value
            .as_mut()
            .map(f)
            .ok_or(ListError::InvalidIndex { index })
    }
}

impl<T: fmt::Debug> fmt::Debug for ConcurrentList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.for_each_live(|value| {
            list.entry(value);
        });
        list.finish()
    }
}

impl<T> Drop for ConcurrentList<T> {
    fn drop(&mut self) {
        trace!("tearing down list of {} elements", self.len.get_mut());
        let mut current = self.head.get_mut().take();
        while let Some(ptr) = current {
            // Safety: `&mut self` rules out every other access to the chain, and each node is
            // freed only after its successor has been detached from it.
            current = unsafe { (*ptr.as_ptr()).slot.get_mut().next.take() };
            if let Some(value) = unsafe { Node::into_value(ptr) } {
                self.teardown(value);
            }
        }
    }
}

// Safety: values are moved in and out across threads and shared by reference under node locks.
unsafe impl<T: Send + Sync> Send for ConcurrentList<T> {}
unsafe impl<T: Send + Sync> Sync for ConcurrentList<T> {}
