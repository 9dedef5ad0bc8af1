//! Error types for queue operations.

use core::fmt;
use std::collections::TryReserveError;

/// Node or string storage could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator refused the request.
    Memory(TryReserveError),
    /// The link key type cannot address another node.
    KeySpace {
        /// Maximum number of nodes the key type can address.
        max: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory(err) => write!(f, "allocation failed: {err}"),
            Self::KeySpace { max } => write!(f, "key space exhausted at {max} nodes"),
        }
    }
}

impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Memory(err) => Some(err),
            Self::KeySpace { .. } => None,
        }
    }
}

impl From<TryReserveError> for AllocError {
    #[inline]
    fn from(err: TryReserveError) -> Self {
        Self::Memory(err)
    }
}

/// Why an operation through [`handle`](crate::handle) had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// No queue was supplied.
    Absent,
    /// The queue holds no elements.
    Empty,
    /// Node or string storage could not be obtained.
    Alloc(AllocError),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "no queue"),
            Self::Empty => write!(f, "queue is empty"),
            Self::Alloc(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for QueueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            Self::Absent | Self::Empty => None,
        }
    }
}

impl From<AllocError> for QueueError {
    #[inline]
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}
