use core::ops::Deref;

use log::trace;
use spin::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::list::ConcurrentList;
use super::node::{Link, Node, Slot};

/// The mode a lock is taken in during a walk.
pub(crate) trait Access {
    /// The guard held while the lock is taken in this mode.
    type Guard<'a, S: 'a>: Deref<Target = S>;

    /// Block until `lock` is held in this mode.
    fn acquire<'a, S: 'a>(lock: &'a RwLock<S>) -> Self::Guard<'a, S>;
}

/// Read mode.
pub(crate) struct Shared;

/// Write mode.
pub(crate) struct Exclusive;

impl Access for Shared {
    type Guard<'a, S: 'a> = RwLockReadGuard<'a, S>;

    #[inline]
    fn acquire<'a, S: 'a>(lock: &'a RwLock<S>) -> Self::Guard<'a, S> {
        lock.read()
    }
}

impl Access for Exclusive {
    type Guard<'a, S: 'a> = RwLockWriteGuard<'a, S>;

    #[inline]
    fn acquire<'a, S: 'a>(lock: &'a RwLock<S>) -> Self::Guard<'a, S> {
        lock.write()
    }
}

/// The locked predecessor of a position in the chain.
pub(crate) enum Cursor<'a, T: 'a, M: Access> {
    /// Position 0 has no predecessor node; the head lock stands in for it.
    Head(M::Guard<'a, Link<T>>),
    /// The node right before the position.
    Node(M::Guard<'a, Slot<T>>),
}

impl<'a, T: 'a> Cursor<'a, T, Exclusive> {
    /// The link to the element at the cursor's position, for splicing.
    #[inline]
    pub(crate) fn link_mut(&mut self) -> &mut Link<T> {
        match self {
            Cursor::Head(head) => &mut **head,
            Cursor::Node(slot) => &mut slot.next,
        }
    }
}

impl<T> ConcurrentList<T> {
    /// Lock the predecessor of position `n` in mode `M`.
    ///
    /// For `n == 0` this returns the head lock. Otherwise it walks to the node at `n - 1`
    /// hand-over-hand and returns it locked. Fails when the chain ends before that node,
    /// whether the index was never valid or the tail was removed underneath the walk.
    pub(crate) fn select<M: Access>(&self, n: usize) -> Option<Cursor<'_, T, M>> {
        if n == 0 {
            return Some(Cursor::Head(M::acquire(self.head_lock())));
        }
        self.node_at::<M>(n - 1).map(Cursor::Node)
    }

    /// Walk to the node at `index` and return it locked in mode `M`.
    ///
    /// Nodes on the way are read-locked and only the target is taken in mode `M`. At most two
    /// node locks are held at any point, and the lock of the next node is always taken before
    /// the current one is released. The head lock counts as the first link of that chain, so
    /// every walker locks in the same order. Holding the predecessor's lock while the target's
    /// is taken keeps the target from being unlinked or displaced in between.
    pub(crate) fn node_at<M: Access>(&self, index: usize) -> Option<M::Guard<'_, Slot<T>>> {
        let head = self.head_lock().read();
        let Some(first) = *head else {
            trace!("select: list is empty, wanted node {index}");
            return None;
        };
        if index == 0 {
            // Safety: `first` is owned by the head link and we hold the head lock.
            return Some(M::acquire(&unsafe { Node::get(first) }.slot));
        }
        // Safety: as above.
        let mut current = unsafe { Node::get(first) }.slot.read();
        drop(head);

        for step in 1..index {
            let Some(next) = current.next else {
                trace!("select: chain ended at node {step}, wanted node {index}");
                return None;
            };
            // Safety: `next` is owned by the node whose lock we hold.
            current = unsafe { Node::get(next) }.slot.read();
        }
        let Some(target) = current.next else {
            trace!("select: chain ended before node {index}");
            return None;
        };
        // Safety: as above.
        Some(M::acquire(&unsafe { Node::get(target) }.slot))
    }
}
