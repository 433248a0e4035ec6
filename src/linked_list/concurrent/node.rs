use alloc::boxed::Box;
use core::ptr::NonNull;

use spin::RwLock;

/// An owning link to the next node in the chain.
///
/// The node behind a `Some` link is owned by whoever holds the link: the list head or the
/// predecessor node. It is allocated by [`Node::alloc`] and released exactly once by
/// [`Node::into_value`].
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

/// The lock-protected part of a node.
pub(crate) struct Slot<T> {
    /// Always `Some` while the node is linked. Taken when the node is unlinked, so a
    /// traversal still holding a stale pointer finds an empty shell.
    pub(crate) value: Option<T>,
    pub(crate) next: Link<T>,
}

impl<T> Slot<T> {
    /// Clear an unlinked node, handing back its successor and its value.
    pub(crate) fn detach(&mut self) -> (Link<T>, Option<T>) {
        (self.next.take(), self.value.take())
    }
}

/// One element of a [`ConcurrentList`](super::ConcurrentList).
pub(crate) struct Node<T> {
    pub(crate) slot: RwLock<Slot<T>>,
}

impl<T> Node<T> {
    /// Allocate a node holding `value` that takes ownership of `next`.
    pub(crate) fn alloc(value: T, next: Link<T>) -> NonNull<Self> {
        let node = Box::new(Node {
            slot: RwLock::new(Slot {
                value: Some(value),
                next,
            }),
        });
        NonNull::from(Box::leak(node))
    }

    /// Borrow the node behind a link.
    ///
    /// # Safety
    ///
    /// The node must stay allocated for `'a`. Inside the list this holds while the caller keeps
    /// the lock of the node's owner or the node's own lock, or is pinned in the list's epoch.
    #[inline]
    pub(crate) unsafe fn get<'a>(ptr: NonNull<Self>) -> &'a Self {
        unsafe { ptr.as_ref() }
    }

    /// Free a node and hand back whatever value it still holds.
    ///
    /// # Safety
    ///
    /// The node must be unlinked, no other thread may be able to reach it, and its `next`
    /// link must already be cleared.
    pub(crate) unsafe fn into_value(ptr: NonNull<Self>) -> Option<T> {
        let node = unsafe { Box::from_raw(ptr.as_ptr()) };
        let slot = node.slot.into_inner();
        debug_assert!(slot.next.is_none(), "freed node still owns a successor");
        slot.value
    }
}
