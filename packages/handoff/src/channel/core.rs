// element storage and gate derivation of a channel. the exposed API is a thin wrapper around this.

use crate::{
    error::*,
    gate::core::{GateCore, Timeout},
};
use parking_lot::{RwLock, RwLockWriteGuard};
use std::{
    collections::VecDeque,
    mem::take,
};


// which end of the deque to insert at.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum End {
    Head,
    Tail,
}

// channel shared state.
pub(crate) struct Shared<T> {
    // lock around lockable state.
    lockable: RwLock<Lockable<T>>,

    // set iff elems is non-empty, as of the last mutation.
    not_empty: GateCore,
    // set iff elems.len() < capacity, as of the last mutation.
    not_full: GateCore,
}

// channel lockable state.
struct Lockable<T> {
    // buffered elements, head at the front.
    elems: VecDeque<T>,
    // elems maximum length, except when exceeded by a forced insert.
    capacity: usize,
    // begins false. transitions to true once, when the owning handle is dropped. when true, elems
    // is empty and stays empty.
    abandoned: bool,
}

impl<T> Lockable<T> {
    fn is_full(&self) -> bool {
        self.elems.len() >= self.capacity
    }

    fn push(&mut self, end: End, elem: T) {
        match end {
            End::Head => self.elems.push_front(elem),
            End::Tail => self.elems.push_back(elem),
        }
    }
}

impl<T> Shared<T> {
    // construct empty with the given capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Shared {
            lockable: RwLock::new(Lockable {
                elems: VecDeque::new(),
                capacity,
                abandoned: false,
            }),
            not_empty: GateCore::new(false),
            not_full: GateCore::new(capacity > 0),
        }
    }

    // bring both gates in line with the lockable state. must be called with the write lock held,
    // after every mutation, so that waiters never observe a gate that's stale relative to a
    // release of the lock.
    fn derive_gates(&self, lock: &RwLockWriteGuard<'_, Lockable<T>>) {
        self.not_empty.set_to(!lock.elems.is_empty());
        self.not_full.set_to(!lock.is_full());
    }

    // wait for space then insert at the given end.
    //
    // on error, hands the element back.
    pub(crate) fn insert(&self, elem: T, end: End, timeout: Timeout) -> Result<(), InsertError<T>> {
        loop {
            if let Err(cause) = self.not_full.wait(timeout) {
                return Err(InsertError { elem, cause });
            }

            let mut lock = self.lockable.write();
            if lock.abandoned {
                return Err(InsertError { elem, cause: AbandonedError.into() });
            }
            if lock.is_full() {
                // another producer took the slot between our wake and our lock. the gate has
                // since been re-derived as cleared, so waiting again will block.
                trace!(?end, "insert lost race for free slot, waiting again");
                continue;
            }

            lock.push(end, elem);
            self.derive_gates(&lock);
            return Ok(());
        }
    }

    // insert at the given end regardless of capacity.
    pub(crate) fn insert_forced(&self, elem: T, end: End) -> Result<(), InsertError<T>> {
        let mut lock = self.lockable.write();
        if lock.abandoned {
            return Err(InsertError { elem, cause: AbandonedError.into() });
        }
        lock.push(end, elem);
        if lock.elems.len() > lock.capacity {
            trace!(
                ?end,
                len = lock.elems.len(),
                capacity = lock.capacity,
                "forced insert exceeded channel capacity"
            );
        }
        self.derive_gates(&lock);
        Ok(())
    }

    // wait for an element then remove it from the head.
    pub(crate) fn remove(&self, timeout: Timeout) -> Result<T, WaitError> {
        loop {
            self.not_empty.wait(timeout)?;

            let mut lock = self.lockable.write();
            if lock.abandoned {
                return Err(AbandonedError.into());
            }
            let Some(elem) = lock.elems.pop_front() else {
                // another consumer took the element that woke us.
                trace!("remove lost race for element, waiting again");
                continue;
            };
            self.derive_gates(&lock);
            return Ok(elem);
        }
    }

    // clone the head element, if any.
    pub(crate) fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lockable.read().elems.front().cloned()
    }

    // remove every element equal to elem. returns whether any were removed. removed elements are
    // dropped after the lock is released.
    pub(crate) fn remove_all_equal(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        let mut lock = self.lockable.write();
        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(lock.elems.len());
        for e in take(&mut lock.elems) {
            if e == *elem {
                removed.push(e);
            } else {
                kept.push_back(e);
            }
        }
        lock.elems = kept;
        if !removed.is_empty() {
            self.derive_gates(&lock);
        }
        drop(lock);
        let any_removed = !removed.is_empty();
        drop(removed);
        any_removed
    }

    pub(crate) fn contains(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        self.lockable.read().elems.contains(elem)
    }

    // remove all elements. they are dropped after the lock is released.
    pub(crate) fn clear(&self) {
        let mut lock = self.lockable.write();
        if lock.abandoned {
            return;
        }
        let elems = take(&mut lock.elems);
        self.derive_gates(&lock);
        drop(lock);
        drop(elems);
    }

    pub(crate) fn set_capacity(&self, capacity: usize) {
        let mut lock = self.lockable.write();
        if lock.abandoned {
            return;
        }
        debug!(old = lock.capacity, new = capacity, "changing channel capacity");
        lock.capacity = capacity;
        self.derive_gates(&lock);
    }

    pub(crate) fn len(&self) -> usize {
        self.lockable.read().elems.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.lockable.read().capacity
    }

    pub(crate) fn is_full(&self) -> bool {
        self.lockable.read().is_full()
    }

    pub(crate) fn is_abandoned(&self) -> bool {
        self.lockable.read().abandoned
    }

    // number of threads blocked waiting for an element.
    pub(crate) fn waiting_consumers(&self) -> usize {
        self.not_empty.waiter_count()
    }

    // number of threads blocked waiting for space.
    pub(crate) fn waiting_producers(&self) -> usize {
        self.not_full.waiter_count()
    }

    // mark the channel abandoned, drop its elements, and release every blocked thread.
    pub(crate) fn abandon(&self) {
        let mut lock = self.lockable.write();
        lock.abandoned = true;
        let elems = take(&mut lock.elems);
        // wake waiters while still holding the lock, so anyone who gets the lock after waking
        // sees the abandoned flag.
        self.not_empty.abandon();
        self.not_full.abandon();
        drop(lock);
        if !elems.is_empty() {
            debug!(dropped = elems.len(), "dropping channel with buffered elements");
        }
        drop(elems);
    }
}
