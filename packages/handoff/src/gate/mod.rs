// implementation of the gate (manual-reset event).
//
// the architecture is as such:
//
//   Gate (owning handle) ----\
//                             >---> Arc<GateCore>
//   GateHandle (shared) -----/         |
//                                      |------ signaled flag (atomic). waiters take a lock-free
//                                      |       fast path when it's already set.
//                                      |
//                                      |------ abandoned flag (atomic). set once, when the
//                                      |       owning handle is dropped.
//                                      |
//                                      \------ mutex + condvar. a thread only goes to sleep
//                                              after re-checking both flags under the mutex, and
//                                              both flags are only raised under the mutex, so no
//                                              wakeup can be lost.
//
// the Arc strong count is the reference count of the shared state: the owning handle holds one,
// every shared handle holds one, and a thread inside `wait` keeps the handle it's waiting through
// borrowed. the state is freed when the last of them goes away, never while a thread is blocked
// on the condvar.
//
// channels embed GateCore directly rather than through Gate, since the channel's own Arc already
// governs the lifetime of its gates.
//
//      core: flag protocol, blocking, teardown.
//       ^
//       |
//      api: owning and shared handles exposed publically.

pub(crate) mod core;
pub(crate) mod api;
