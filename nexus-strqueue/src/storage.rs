//! Node arenas with stable keys.
//!
//! A [`Storage`] owns every node of one queue. Keys stay valid until the
//! node is removed, and removed slots are reused by later inserts, so a
//! queue that churns through push/pop cycles stops allocating once the
//! arena has grown to its working size.
//!
//! Growth is fallible: [`Storage::try_reserve`] reports an [`AllocError`]
//! instead of aborting, which is what lets insertion fail cleanly.

use crate::{AllocError, Key};

use core::hint::unreachable_unchecked;

/// Slab-like arena with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** insert, remove, get operations
/// - **Slot reuse**: removed slots can be reused by future inserts
/// - **Reservation**: after `try_reserve(n)` succeeds, the next `n` inserts
///   succeed
///
/// # Safety
///
/// [`Queue`](crate::Queue) reads nodes through the unchecked accessors
/// using keys it got back from `try_insert`. An implementation must
/// guarantee that such a key stays occupied, and keeps addressing the same
/// value, until it is passed to `remove` or the storage is cleared. A
/// violation makes those reads undefined behavior.
///
/// # Implementations
///
/// - [`NodeSlab<T>`] - growable, fallible growth (in this crate)
/// - `slab::Slab<T>` - growable, aborts on allocation failure (feature `slab`)
pub unsafe trait Storage<T> {
    /// Key type for this storage.
    type Key: Key;

    /// Ensures the next `additional` inserts will not allocate or fail.
    fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError>;

    /// Inserts a value, returning its stable key.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, AllocError>;

    /// Removes and returns the value at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns a reference without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked(&self, key: Self::Key) -> &T;

    /// Returns a mutable reference without checking occupancy.
    ///
    /// # Safety
    ///
    /// `key` must be valid and occupied.
    unsafe fn get_unchecked_mut(&mut self, key: Self::Key) -> &mut T;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slots are occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored value. Keeps the allocation.
    fn clear(&mut self);
}

// =============================================================================
// NodeSlab - growable Vec of slots with an intrusive free list
// =============================================================================

#[derive(Debug)]
enum Slot<T, K> {
    Occupied(T),
    /// Next free slot, or `K::NONE` at the end of the free list.
    Vacant(K),
}

/// Growable arena backed by a `Vec` of slots.
///
/// Vacant slots form a free list threaded through the slots themselves, so
/// a removed slot is handed out again by the next insert. Growth goes
/// through `Vec::try_reserve`, so an exhausted allocator surfaces as
/// [`AllocError::Memory`] rather than an abort, and running out of keys
/// surfaces as [`AllocError::KeySpace`].
///
/// # Example
///
/// ```
/// use nexus_strqueue::{NodeSlab, Storage};
///
/// let mut slab: NodeSlab<&str> = NodeSlab::new();
/// let a = slab.try_insert("a").unwrap();
/// assert_eq!(slab.get(a), Some(&"a"));
/// assert_eq!(slab.remove(a), Some("a"));
///
/// // Freed slots are reused
/// let b = slab.try_insert("b").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug)]
pub struct NodeSlab<T, K: Key = u32> {
    slots: Vec<Slot<T, K>>,
    free_head: K,
    len: usize,
}

impl<T, K: Key> NodeSlab<T, K> {
    /// Creates an empty arena. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: K::NONE,
            len: 0,
        }
    }

    /// Returns the number of slots that can be occupied without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Inserts that succeed without growing: vacant slots plus spare `Vec`
    /// capacity that is still addressable by `K`.
    #[inline]
    fn spare(&self) -> usize {
        let vacant = self.slots.len() - self.len;
        let unused = self.slots.capacity() - self.slots.len();
        let addressable = K::capacity() - self.slots.len();
        vacant + unused.min(addressable)
    }
}

impl<T, K: Key> Default for NodeSlab<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: a slot holds its value from try_insert until remove or clear;
// the free list only ever links vacant slots.
unsafe impl<T, K: Key> Storage<T> for NodeSlab<T, K> {
    type Key = K;

    fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let spare = self.spare();
        if spare >= additional {
            return Ok(());
        }

        let max = K::capacity();
        if additional > max - self.len {
            log::debug!("node arena cannot address {additional} more nodes (max {max})");
            return Err(AllocError::KeySpace { max });
        }

        // Vacant slots are reused first; the Vec only needs room for the rest.
        let grow = additional - (self.slots.len() - self.len);
        self.slots.try_reserve(grow).map_err(|err| {
            log::debug!("node arena refused {grow} slots: {err}");
            AllocError::from(err)
        })
    }

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<K, AllocError> {
        if self.free_head.is_some() {
            let key = self.free_head;
            let slot = &mut self.slots[key.as_usize()];
            let Slot::Vacant(next_free) = *slot else {
                // Free list only threads vacant slots
                unreachable!("free list points at an occupied slot");
            };
            *slot = Slot::Occupied(value);
            self.free_head = next_free;
            self.len += 1;
            return Ok(key);
        }

        let idx = self.slots.len();
        if idx >= K::capacity() {
            return Err(AllocError::KeySpace { max: K::capacity() });
        }
        self.slots.try_reserve(1)?;
        self.slots.push(Slot::Occupied(value));
        self.len += 1;
        Ok(K::from_usize(idx))
    }

    #[inline]
    fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.as_usize())?;
        if let Slot::Vacant(_) = slot {
            return None;
        }

        let Slot::Occupied(value) = core::mem::replace(slot, Slot::Vacant(self.free_head)) else {
            return None;
        };
        self.free_head = key;
        self.len -= 1;
        Some(value)
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        match self.slots.get(key.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        match self.slots.get_mut(key.as_usize()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: K) -> &T {
        // Safety: caller guarantees `key` is in bounds and occupied
        match unsafe { self.slots.get_unchecked(key.as_usize()) } {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => unsafe { unreachable_unchecked() },
        }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: K) -> &mut T {
        // Safety: caller guarantees `key` is in bounds and occupied
        match unsafe { self.slots.get_unchecked_mut(key.as_usize()) } {
            Slot::Occupied(value) => value,
            Slot::Vacant(_) => unsafe { unreachable_unchecked() },
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free_head = K::NONE;
        self.len = 0;
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
// Safety: slab keys are stable until removed.
unsafe impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        // slab has no fallible growth; this aborts on allocation failure
        self.reserve(additional);
        Ok(())
    }

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, AllocError> {
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        slab::Slab::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        slab::Slab::get_mut(self, key)
    }

    #[inline]
    unsafe fn get_unchecked(&self, key: usize) -> &T {
        unsafe { slab::Slab::get_unchecked(self, key) }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, key: usize) -> &mut T {
        unsafe { slab::Slab::get_unchecked_mut(self, key) }
    }

    #[inline]
    fn len(&self) -> usize {
        slab::Slab::len(self)
    }

    fn clear(&mut self) {
        slab::Slab::clear(self);
    }
}
