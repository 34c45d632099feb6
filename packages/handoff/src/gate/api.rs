// exposed API of gates

use super::core::{GateCore, Timeout};
use crate::error::*;
use std::{
    fmt::{self, Debug, Formatter},
    ops::Deref,
    sync::Arc,
    time::{Duration, Instant},
};


/// Manual-reset event
///
/// Once [set](GateHandle::set), a gate stays set until [cleared](GateHandle::clear), and every
/// thread waiting on it is released. Setting an already-set gate does nothing.
///
/// This is the owning handle. It dereferences to [`GateHandle`], which carries all the
/// operations. Shared handles obtained from [`handle`](Self::handle) may be sent to other
/// threads and may outlive the `Gate`. When the `Gate` is dropped, every thread blocked on it
/// wakes and returns [`AbandonedError`], and so does every later wait through a surviving handle,
/// unless the gate was left set.
pub struct Gate {
    handle: GateHandle,
}

impl Gate {
    /// Construct an unset gate
    pub fn new() -> Self {
        Self::with_state(false)
    }

    /// Construct a gate that starts out set
    pub fn new_set() -> Self {
        Self::with_state(true)
    }

    fn with_state(signaled: bool) -> Self {
        Gate {
            handle: GateHandle {
                core: Arc::new(GateCore::new(signaled)),
            },
        }
    }

    /// Create a shared handle to this gate
    pub fn handle(&self) -> GateHandle {
        self.handle.clone()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Gate {
    type Target = GateHandle;

    fn deref(&self) -> &GateHandle {
        &self.handle
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        // wake everyone before our reference goes away. whoever drops the last Arc frees the core.
        self.handle.core.abandon();
    }
}

impl Debug for Gate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Gate")
            .field("set", &self.is_set())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}


/// Shared handle to a [`Gate`]
///
/// Cheap to clone. Keeps the gate's state alive but not the gate itself: once the owning `Gate`
/// is dropped, waits that would block return [`AbandonedError`] instead.
#[derive(Clone)]
pub struct GateHandle {
    core: Arc<GateCore>,
}

impl GateHandle {
    /// Set the gate, waking every waiting thread
    ///
    /// Does nothing if already set. Writes made before calling `set` are visible to any thread
    /// whose wait returns because of it.
    pub fn set(&self) {
        self.core.set();
    }

    /// Clear the gate
    ///
    /// Only affects later waits. Threads already released by a previous `set` stay released.
    pub fn clear(&self) {
        self.core.clear();
    }

    /// Block until the gate is set
    ///
    /// Returns immediately without locking if already set. Only errors if the gate is abandoned.
    pub fn wait(&self) -> Result<(), AbandonedError> {
        self.core.wait(Timeout::Never)
            .map_err(|e| match e {
                WaitError::Abandoned(e) => e,
                WaitError::WouldBlock(_) => unreachable!("wait timed out with Timeout::Never"),
            })
    }

    /// Block until the gate is set or a timeout elapses
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), WaitError> {
        self.core.wait(Timeout::after(timeout))
    }

    /// Block until the gate is set or the deadline is reached
    pub fn wait_deadline(&self, deadline: Instant) -> Result<(), WaitError> {
        self.core.wait(Timeout::At(deadline))
    }

    /// Succeed if the gate is set, without blocking
    pub fn try_wait(&self) -> Result<(), WaitError> {
        self.core.wait(Timeout::NonBlocking)
    }

    /// Whether the gate is currently set
    pub fn is_set(&self) -> bool {
        self.core.is_set()
    }

    /// Number of threads currently blocked waiting on the gate
    pub fn waiter_count(&self) -> usize {
        self.core.waiter_count()
    }

    /// Whether the owning [`Gate`] has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.core.is_abandoned()
    }
}

impl Debug for GateHandle {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("GateHandle")
            .field("set", &self.is_set())
            .field("waiters", &self.waiter_count())
            .field("abandoned", &self.is_abandoned())
            .finish()
    }
}


// ==== tests ====


#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::UnsafeCell,
        sync::Arc,
        thread,
    };

    // spin until cond holds, or panic after a generous deadline.
    fn wait_for(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !cond() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn new_gate_is_unset() {
        let gate = Gate::new();
        assert!(!gate.is_set());
        assert_eq!(gate.try_wait(), Err(WouldBlockError.into()));
        assert!(Gate::new_set().is_set());
    }

    #[test]
    fn set_is_idempotent() {
        let gate = Gate::new();
        gate.set();
        gate.set();
        assert!(gate.is_set());
        assert_eq!(gate.wait(), Ok(()));
        assert_eq!(gate.try_wait(), Ok(()));
        // stays set after being waited on
        assert!(gate.is_set());
        gate.clear();
        assert!(!gate.is_set());
    }

    #[test]
    fn wait_timeout_expires_when_unset() {
        let gate = Gate::new();
        let start = Instant::now();
        let result = gate.wait_timeout(Duration::from_millis(50));
        assert_eq!(result, Err(WaitError::WouldBlock(WouldBlockError)));
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(gate.waiter_count(), 0);
    }

    #[test]
    fn wait_deadline_in_past_does_not_block() {
        let gate = Gate::new();
        assert!(gate.wait_deadline(Instant::now()).unwrap_err().is_would_block());
    }

    #[test]
    fn set_releases_every_waiter() {
        let gate = Gate::new();
        let joins = (0..4)
            .map(|_| {
                let handle = gate.handle();
                thread::spawn(move || handle.wait_timeout(Duration::from_secs(10)))
            })
            .collect::<Vec<_>>();
        wait_for(|| gate.waiter_count() == 4);
        gate.set();
        for join in joins {
            assert_eq!(join.join().unwrap(), Ok(()));
        }
        assert_eq!(gate.waiter_count(), 0);
    }

    // plain memory shared between a writer and a reader with no synchronization of its own, so
    // any ordering between them must come from the gate. a race detector (miri, tsan) flags this
    // test if set/wait stop pairing release with acquire.
    struct Unsynchronized(UnsafeCell<Vec<u32>>);

    unsafe impl Sync for Unsynchronized {}

    #[test]
    fn set_publishes_prior_writes() {
        let gate = Gate::new();
        let data = Arc::new(Unsynchronized(UnsafeCell::new(Vec::new())));
        let join = {
            let handle = gate.handle();
            let data = Arc::clone(&data);
            thread::spawn(move || {
                handle.wait().unwrap();
                // safety: the writer finished before setting the gate and never writes again
                unsafe { (*data.0.get()).clone() }
            })
        };
        // safety: the reader does not touch the vec until the gate is set
        unsafe { (*data.0.get()).extend([1, 2, 3]); }
        gate.set();
        assert_eq!(join.join().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn clear_makes_later_waits_block() {
        let gate = Gate::new_set();
        gate.clear();
        assert!(gate.wait_timeout(Duration::from_millis(10)).is_err());
    }

    #[test]
    fn dropping_gate_abandons_blocked_waiters() {
        let gate = Gate::new();
        let joins = (0..3)
            .map(|_| {
                let handle = gate.handle();
                thread::spawn(move || handle.wait())
            })
            .collect::<Vec<_>>();
        wait_for(|| gate.waiter_count() == 3);
        drop(gate);
        for join in joins {
            assert_eq!(join.join().unwrap(), Err(AbandonedError));
        }
    }

    #[test]
    fn handle_outlives_gate() {
        let gate = Gate::new();
        let handle = gate.handle();
        assert!(!handle.is_abandoned());
        drop(gate);
        assert!(handle.is_abandoned());
        assert_eq!(handle.wait(), Err(AbandonedError));
        assert!(handle.wait_timeout(Duration::from_secs(10)).unwrap_err().is_abandoned());
    }

    #[test]
    fn set_before_drop_still_releases() {
        let gate = Gate::new();
        let handle = gate.handle();
        gate.set();
        drop(gate);
        assert_eq!(handle.wait(), Ok(()));
    }

    #[test]
    fn repeated_set_clear_cycles() {
        let gate = Gate::new();
        let handle = gate.handle();
        let join = thread::spawn(move || {
            let mut seen = 0;
            while handle.wait().is_ok() {
                seen += 1;
                handle.clear();
                if seen == 100 {
                    break;
                }
            }
            seen
        });
        while !join.is_finished() {
            gate.set();
            thread::yield_now();
        }
        assert_eq!(join.join().unwrap(), 100);
    }
}
