//! Link keys into the node arena.
//!
//! Nodes never point at each other directly. A node's `next` link, and the
//! queue's `head` and `tail`, are [`Key`]s: integer slots in the arena that
//! owns every node. The key type also bounds how many nodes one queue can
//! address.

/// Integer link type with a "no node" sentinel.
///
/// `NONE` is reserved, so a key type can address `NONE.as_usize()` nodes:
/// 255 for `u8`, `u32::MAX` for the default `u32`.
///
/// # Example
///
/// ```
/// use nexus_strqueue::Key;
///
/// let key: u32 = 7;
/// assert!(key.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u8::capacity(), 255);
/// ```
pub trait Key: Copy + Eq + core::fmt::Debug {
    /// Sentinel marking the end of a chain, or an empty head/tail.
    const NONE: Self;

    /// Creates a key from an arena slot index.
    ///
    /// Callers check the index against [`Key::capacity`] first.
    fn from_usize(val: usize) -> Self;

    /// Returns the arena slot index.
    fn as_usize(&self) -> usize;

    /// Returns `true` if this is the sentinel.
    #[inline]
    fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Returns `true` if this refers to a node.
    #[inline]
    fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Number of distinct nodes this key type can address.
    #[inline]
    fn capacity() -> usize {
        Self::NONE.as_usize()
    }
}

macro_rules! impl_key {
    ($($ty:ty),*) => {
        $(
            impl Key for $ty {
                const NONE: Self = <$ty>::MAX;

                #[inline]
                fn from_usize(val: usize) -> Self {
                    val as $ty
                }

                #[inline]
                fn as_usize(&self) -> usize {
                    *self as usize
                }
            }
        )*
    };
}

impl_key!(u8, u16, u32, u64, usize);
