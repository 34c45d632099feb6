// flag protocol and blocking logic of a gate.

use crate::error::*;
use parking_lot::{Condvar, Mutex};
use std::{
    sync::atomic::{
        Ordering::{Acquire, Relaxed, Release},
        AtomicBool,
        AtomicUsize,
    },
    time::{Duration, Instant},
};


// timeout for blocking on a gate.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Timeout {
    // never time out.
    Never,
    // time out at the given deadline.
    At(Instant),
    // time out if the gate is not already set.
    NonBlocking,
}

impl Timeout {
    // time out after the given duration from now. saturates to never on overflow.
    pub(crate) fn after(duration: Duration) -> Self {
        Instant::now().checked_add(duration)
            .map(Timeout::At)
            .unwrap_or(Timeout::Never)
    }
}

// gate shared state.
pub(crate) struct GateCore {
    // the manual-reset condition.
    //
    // - only transitions false -> true under the mutex, with release ordering, so that a waiter
    //   which acquire-loads true sees everything the setter wrote before setting.
    // - may transition true -> false at any time without the mutex.
    signaled: AtomicBool,
    // begins false. transitions to true once, under the mutex, and never changes again.
    abandoned: AtomicBool,
    // number of threads currently in the blocking region of `wait`. only modified under the mutex.
    waiters: AtomicUsize,
    mutex: Mutex<()>,
    cond: Condvar,
}

impl GateCore {
    // construct with the given initial signaled state.
    pub(crate) fn new(signaled: bool) -> Self {
        GateCore {
            signaled: AtomicBool::new(signaled),
            abandoned: AtomicBool::new(false),
            waiters: AtomicUsize::new(0),
            mutex: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    // set the flag, waking all waiters if this call is the one that set it.
    pub(crate) fn set(&self) {
        let _lock = self.mutex.lock();
        if !self.signaled.swap(true, Release) {
            self.cond.notify_all();
        }
    }

    // unset the flag.
    pub(crate) fn clear(&self) {
        self.signaled.store(false, Release);
    }

    // set or clear the flag.
    pub(crate) fn set_to(&self, signaled: bool) {
        if signaled {
            self.set();
        } else {
            self.clear();
        }
    }

    pub(crate) fn is_set(&self) -> bool {
        self.signaled.load(Acquire)
    }

    pub(crate) fn is_abandoned(&self) -> bool {
        self.abandoned.load(Acquire)
    }

    pub(crate) fn waiter_count(&self) -> usize {
        self.waiters.load(Relaxed)
    }

    // block until the flag is set, the timeout elapses, or the gate is abandoned.
    //
    // a set flag takes priority over abandonment: if the flag was set before the gate was torn
    // down, the wait still succeeds.
    pub(crate) fn wait(&self, timeout: Timeout) -> Result<(), WaitError> {
        // fast path
        if self.signaled.load(Acquire) {
            return Ok(());
        }
        if self.abandoned.load(Acquire) {
            return Err(AbandonedError.into());
        }
        if let Timeout::NonBlocking = timeout {
            return Err(WouldBlockError.into());
        }

        let mut lock = self.mutex.lock();
        self.waiters.fetch_add(1, Relaxed);
        let result = loop {
            // re-check under the mutex before sleeping
            if self.signaled.load(Acquire) {
                break Ok(());
            }
            if self.abandoned.load(Relaxed) {
                break Err(AbandonedError.into());
            }
            match timeout {
                Timeout::Never => self.cond.wait(&mut lock),
                Timeout::At(deadline) => {
                    if Instant::now() >= deadline {
                        break Err(WouldBlockError.into());
                    }
                    // spurious or timed out, either way loop around and re-check
                    let _ = self.cond.wait_until(&mut lock, deadline);
                }
                Timeout::NonBlocking => break Err(WouldBlockError.into()),
            }
        };
        self.waiters.fetch_sub(1, Relaxed);
        drop(lock);
        result
    }

    // mark the gate as abandoned and wake all waiters so they can observe it.
    //
    // after this returns, no thread will go to sleep on this gate again.
    pub(crate) fn abandon(&self) {
        let _lock = self.mutex.lock();
        self.abandoned.store(true, Release);
        let waiters = self.waiters.load(Relaxed);
        if waiters > 0 {
            trace!(waiters, "abandoning gate with blocked waiters");
        }
        self.cond.notify_all();
    }
}
