// implementation of the bounded channel.
//
// the architecture is as such:
//
// channel handles wrap around Arc<shared state>
//                                  |
//          /-----------------------/
//          v
//       shared state
//          |
//          |------ it contains a RwLock around the lockable state: a VecDeque<T> of buffered
//          |       elements, the capacity, and an abandoned flag. mutations take the write side,
//          |       observers take the read side.
//          |
//          \------ it contains two gates, "not empty" and "not full". they are derived state:
//                  after every mutation, while the write lock is still held, each gate is set or
//                  cleared to match the element count. waking waiters while still holding the
//                  lock means a woken thread which then acquires the lock sees state at least as
//                  new as the signal that woke it.
//
// blocking happens only inside the gates. a blocked operation waits on its gate, then takes the
// write lock and re-checks, looping back to waiting if some other thread got there first. gates
// wake all of their waiters, so several threads may race for one slot or element.
//
// the organization of these modules is as such:
//
//      gate::core<---------core: Element storage, gate derivation, and the wait-then-recheck
//                           ^    loops.
//                           |
//                          api: Owning and shared handles exposed publically, with blocking,
//                               timed, and non-blocking variants of each blocking operation.

pub(crate) mod api;

mod core;
