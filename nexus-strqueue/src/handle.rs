//! Nullable-handle operation surface.
//!
//! Mirrors the classic queue API used by test drivers: every operation takes
//! an optional queue (`None` is the absent handle) and reports its outcome
//! as a `bool` or a count rather than a `Result`. Nothing here panics; an
//! operation either completes or leaves the queue as it was.
//!
//! The reason a call returned `false` is logged at `debug` level.
//!
//! # Example
//!
//! ```
//! use nexus_strqueue::{Queue, handle};
//!
//! let mut queue: Option<Queue> = handle::new().ok();
//! assert!(handle::insert_tail(queue.as_mut(), "b"));
//! assert!(handle::insert_head(queue.as_mut(), "a"));
//! assert_eq!(handle::size(queue.as_ref()), 2);
//!
//! let mut buf = [0u8; 8];
//! assert!(handle::remove_head(queue.as_mut(), Some(&mut buf)));
//! assert_eq!(&buf[..2], b"a\0");
//!
//! // An absent queue is never an error, just a no-op
//! assert!(!handle::insert_head(None::<&mut Queue>, "x"));
//! assert_eq!(handle::size(None::<&Queue>), 0);
//!
//! handle::free(queue);
//! ```

use crate::{AllocError, Key, Node, Queue, QueueError, Storage};

/// Nodes pre-reserved by [`new`].
pub const INITIAL_CAPACITY: usize = 16;

/// Creates an empty queue with [`INITIAL_CAPACITY`] node slots reserved.
///
/// # Errors
///
/// Returns an [`AllocError`] if the arena cannot be reserved, which callers
/// can tell apart from a valid empty queue.
pub fn new<S, K: Key>() -> Result<Queue<S, K>, AllocError>
where
    S: Storage<Node<K>, Key = K> + Default,
{
    Queue::try_with_capacity(INITIAL_CAPACITY).inspect_err(|err| {
        log::debug!("new: {err}");
    })
}

/// Releases the queue and every element in it. `None` is a no-op.
pub fn free<S, K: Key>(queue: Option<Queue<S, K>>)
where
    S: Storage<Node<K>, Key = K>,
{
    drop(queue);
}

/// Inserts a copy of `text` at the head. Returns `false` if the queue is
/// absent or storage could not be allocated.
pub fn insert_head<S, K: Key>(queue: Option<&mut Queue<S, K>>, text: &str) -> bool
where
    S: Storage<Node<K>, Key = K>,
{
    report("insert_head", || {
        present(queue)?.insert_head(text)?;
        Ok(true)
    })
}

/// Inserts a copy of `text` at the tail. Returns `false` if the queue is
/// absent or storage could not be allocated.
pub fn insert_tail<S, K: Key>(queue: Option<&mut Queue<S, K>>, text: &str) -> bool
where
    S: Storage<Node<K>, Key = K>,
{
    report("insert_tail", || {
        present(queue)?.insert_tail(text)?;
        Ok(true)
    })
}

/// Removes the head element, copying it into `out` when supplied.
///
/// The capacity is `out.len()`: at most `out.len() - 1` bytes plus a NUL
/// are written. Returns `true` only if an element was removed and
/// delivered; with `out == None` or a zero-length `out` the element is
/// still removed but the result is `false`. An absent or empty queue returns `false` unchanged.
pub fn remove_head<S, K: Key>(queue: Option<&mut Queue<S, K>>, out: Option<&mut [u8]>) -> bool
where
    S: Storage<Node<K>, Key = K>,
{
    report("remove_head", || {
        let queue = present(queue)?;
        if queue.is_empty() {
            return Err(QueueError::Empty);
        }
        Ok(queue.remove_head_into(out))
    })
}

/// Returns the number of elements, or 0 for an absent queue.
#[inline]
pub fn size<S, K: Key>(queue: Option<&Queue<S, K>>) -> usize
where
    S: Storage<Node<K>, Key = K>,
{
    queue.map_or(0, Queue::len)
}

/// Reverses the queue in place. No effect on an absent queue.
pub fn reverse<S, K: Key>(queue: Option<&mut Queue<S, K>>)
where
    S: Storage<Node<K>, Key = K>,
{
    if let Some(queue) = queue {
        queue.reverse();
    }
}

/// Sorts the queue in ascending byte-wise order. No effect on an absent
/// queue.
pub fn sort<S, K: Key>(queue: Option<&mut Queue<S, K>>)
where
    S: Storage<Node<K>, Key = K>,
{
    if let Some(queue) = queue {
        queue.sort();
    }
}

#[inline]
fn present<T>(queue: Option<T>) -> Result<T, QueueError> {
    queue.ok_or(QueueError::Absent)
}

/// Collapses an operation's outcome to the boolean the handle API reports.
fn report(op: &str, f: impl FnOnce() -> Result<bool, QueueError>) -> bool {
    match f() {
        Ok(delivered) => delivered,
        Err(err) => {
            log::debug!("{op}: {err}");
            false
        }
    }
}
