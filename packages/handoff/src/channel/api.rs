// exposed API of channels

use super::core::{self, End};
use crate::{
    error::*,
    gate::core::Timeout,
};
use std::{
    fmt::{self, Debug, Formatter},
    ops::Deref,
    sync::Arc,
    time::Duration,
};


/// Capacity-limited FIFO queue for handing elements from producer threads to consumer threads
///
/// Inserting into a full channel blocks until space frees up, and removing from an empty channel
/// blocks until an element arrives. Every blocking operation also comes in a `_timeout` variant
/// and a non-blocking `try_` variant. Elements are delivered in the order they were inserted at
/// the tail, except that [`insert_head`](ChannelHandle::insert_head) puts an element back at the
/// front of the line.
///
/// This is the owning handle. It dereferences to [`ChannelHandle`], which carries all the
/// operations. Shared handles obtained from [`handle`](Self::handle) may be sent to other
/// threads and may outlive the `BoundedChannel`. When the `BoundedChannel` is dropped, its
/// buffered elements are dropped, every thread blocked on it returns [`AbandonedError`], and
/// every later operation through a surviving handle fails the same way.
pub struct BoundedChannel<T> {
    handle: ChannelHandle<T>,
}

impl<T> BoundedChannel<T> {
    /// Construct an empty channel that holds up to `capacity` elements
    ///
    /// A capacity of 0 is allowed, in which case only forced inserts succeed until the capacity
    /// is raised.
    pub fn new(capacity: usize) -> Self {
        BoundedChannel {
            handle: ChannelHandle {
                shared: Arc::new(core::Shared::new(capacity)),
            },
        }
    }

    /// Construct an empty channel with no practical capacity limit
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    /// Create a shared handle to this channel
    pub fn handle(&self) -> ChannelHandle<T> {
        self.handle.clone()
    }
}

impl<T> Default for BoundedChannel<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> Deref for BoundedChannel<T> {
    type Target = ChannelHandle<T>;

    fn deref(&self) -> &ChannelHandle<T> {
        &self.handle
    }
}

impl<T> Drop for BoundedChannel<T> {
    fn drop(&mut self) {
        self.handle.shared.abandon();
    }
}

impl<T> Debug for BoundedChannel<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("BoundedChannel")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}


/// Shared handle to a [`BoundedChannel`]
///
/// Cheap to clone. Any number of threads may use handles to the same channel concurrently.
/// Since [`peek_head`](Self::peek_head) and [`contains`](Self::contains) read elements from
/// several threads at once, sharing a handle across threads requires `T: Send + Sync`.
pub struct ChannelHandle<T> {
    shared: Arc<core::Shared<T>>,
}

impl<T> ChannelHandle<T> {
    /// Insert an element at the tail, blocking until there is space
    ///
    /// Fails, handing the element back, only if the channel is abandoned.
    pub fn insert_tail(&self, elem: T) -> Result<(), InsertError<T>> {
        self.shared.insert(elem, End::Tail, Timeout::Never)
    }

    /// Insert an element at the tail, blocking until there is space or a timeout elapses
    pub fn insert_tail_timeout(&self, elem: T, timeout: Duration) -> Result<(), InsertError<T>> {
        self.shared.insert(elem, End::Tail, Timeout::after(timeout))
    }

    /// Insert an element at the tail if there is space, without blocking
    pub fn try_insert_tail(&self, elem: T) -> Result<(), InsertError<T>> {
        self.shared.insert(elem, End::Tail, Timeout::NonBlocking)
    }

    /// Insert an element at the tail even if that puts the channel over capacity
    ///
    /// Never blocks. Fails, handing the element back, only if the channel is abandoned.
    pub fn insert_tail_forced(&self, elem: T) -> Result<(), InsertError<T>> {
        self.shared.insert_forced(elem, End::Tail)
    }

    /// Put an element back at the head, blocking until there is space
    ///
    /// The element will be the next one removed, ahead of everything already buffered.
    pub fn insert_head(&self, elem: T) -> Result<(), InsertError<T>> {
        self.shared.insert(elem, End::Head, Timeout::Never)
    }

    /// Put an element back at the head, blocking until there is space or a timeout elapses
    pub fn insert_head_timeout(&self, elem: T, timeout: Duration) -> Result<(), InsertError<T>> {
        self.shared.insert(elem, End::Head, Timeout::after(timeout))
    }

    /// Put an element back at the head if there is space, without blocking
    pub fn try_insert_head(&self, elem: T) -> Result<(), InsertError<T>> {
        self.shared.insert(elem, End::Head, Timeout::NonBlocking)
    }

    /// Put an element back at the head even if that puts the channel over capacity
    pub fn insert_head_forced(&self, elem: T) -> Result<(), InsertError<T>> {
        self.shared.insert_forced(elem, End::Head)
    }

    /// Remove the head element, blocking until there is one
    ///
    /// Fails only if the channel is abandoned.
    pub fn remove_head(&self) -> Result<T, RemoveError> {
        self.shared.remove(Timeout::Never)
    }

    /// Remove the head element, blocking until there is one or a timeout elapses
    pub fn remove_head_timeout(&self, timeout: Duration) -> Result<T, RemoveError> {
        self.shared.remove(Timeout::after(timeout))
    }

    /// Remove the head element if there is one, without blocking
    pub fn try_remove_head(&self) -> Result<T, RemoveError> {
        self.shared.remove(Timeout::NonBlocking)
    }

    /// Clone the head element without removing it
    ///
    /// Returns `None` if the channel is empty.
    pub fn peek_head(&self) -> Option<T>
    where
        T: Clone,
    {
        self.shared.peek()
    }

    /// Remove every buffered element equal to `elem`
    ///
    /// Returns whether anything was removed.
    pub fn remove_all_equal(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        self.shared.remove_all_equal(elem)
    }

    /// Whether any buffered element equals `elem`
    pub fn contains(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        self.shared.contains(elem)
    }

    /// Remove and drop all buffered elements
    pub fn clear(&self) {
        self.shared.clear();
    }

    /// Change the capacity
    ///
    /// Lowering the capacity below the current length does not drop elements. It just blocks
    /// inserts until enough elements are removed.
    pub fn set_capacity(&self, capacity: usize) {
        self.shared.set_capacity(capacity);
    }

    /// Number of buffered elements
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Maximum number of elements before inserts block
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Whether there are no buffered elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the number of buffered elements has reached the capacity
    pub fn is_full(&self) -> bool {
        self.shared.is_full()
    }

    /// Number of threads currently blocked waiting to remove an element
    pub fn waiting_consumer_count(&self) -> usize {
        self.shared.waiting_consumers()
    }

    /// Number of threads currently blocked waiting to insert an element
    pub fn waiting_producer_count(&self) -> usize {
        self.shared.waiting_producers()
    }

    /// Whether the owning [`BoundedChannel`] has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.shared.is_abandoned()
    }
}

impl<T> Clone for ChannelHandle<T> {
    fn clone(&self) -> Self {
        ChannelHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Debug for ChannelHandle<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}


// ==== tests ====
