//! Error types for gates and channels.

use std::fmt::{self, Debug, Display, Formatter};
use thiserror::Error;


// ==== base error types ====


/// Error for a wait that could not complete immediately or by the specified deadline
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
#[error("operation would block")]
pub struct WouldBlockError;

/// Error for a wait on a gate or channel whose owning handle was dropped
///
/// Once a gate or channel is abandoned it stays abandoned, and every further blocking operation
/// through a surviving handle returns this error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
#[error("gate or channel was abandoned")]
pub struct AbandonedError;


// ==== compound error types ====


/// Error for a wait which ended without the awaited condition becoming true
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
pub enum WaitError {
    /// The operation could not be resolved immediately or by the specified deadline
    #[error(transparent)]
    WouldBlock(#[from] WouldBlockError),
    /// The owning handle was dropped while or before waiting
    #[error(transparent)]
    Abandoned(#[from] AbandonedError),
}

impl WaitError {
    /// Whether this is the [`WouldBlock`](Self::WouldBlock) variant
    pub fn is_would_block(&self) -> bool {
        matches!(self, WaitError::WouldBlock(_))
    }

    /// Whether this is the [`Abandoned`](Self::Abandoned) variant
    pub fn is_abandoned(&self) -> bool {
        matches!(self, WaitError::Abandoned(_))
    }
}

/// Error for trying to remove an element from a channel
pub type RemoveError = WaitError;

/// Error for trying to insert an element into a channel
///
/// The element is handed back so a failed insert never loses it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InsertError<T> {
    /// The element that could not be inserted
    pub elem: T,
    /// The reason the element could not be inserted
    pub cause: WaitError,
}

impl<T> InsertError<T> {
    /// Take back the element that could not be inserted
    pub fn into_inner(self) -> T {
        self.elem
    }
}

// the element may be large or not Debug at all, so only its type is printed.
impl<T> Debug for InsertError<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("elem", &std::any::type_name::<T>())
            .field("cause", &self.cause)
            .finish()
    }
}

impl<T> Display for InsertError<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "failed to insert element: {}", self.cause)
    }
}

impl<T> std::error::Error for InsertError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl<T> From<InsertError<T>> for WaitError {
    fn from(e: InsertError<T>) -> Self {
        e.cause
    }
}
