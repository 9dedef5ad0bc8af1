//! Singly-linked string queue over an owned node arena.
//!
//! The queue owns a [`Storage`] arena holding every [`Node`]; nodes link to
//! their successor by [`Key`]. Every live node is referenced by exactly one
//! link, either the queue's `head` or its predecessor's `next`, so relinking
//! (reverse, sort) moves keys between fields and never duplicates one.
//!
//! # Invariants
//!
//! Before and after every public operation:
//!
//! - `len == 0` iff `head` is `NONE` iff `tail` is `NONE`
//! - `tail.next` is `NONE` whenever the queue is non-empty
//! - the chain from `head` is acyclic and has exactly `len` nodes, and the
//!   arena holds no other nodes
//! - every value is an independent copy and contains no NUL byte
//!
//! # Example
//!
//! ```
//! use nexus_strqueue::Queue;
//!
//! let mut queue: Queue = Queue::new();
//! queue.insert_tail("b").unwrap();
//! queue.insert_head("a").unwrap();
//! queue.insert_tail("c").unwrap();
//! assert_eq!(queue.len(), 3);
//!
//! queue.reverse();
//! assert_eq!(queue.iter().collect::<Vec<_>>(), ["c", "b", "a"]);
//!
//! assert_eq!(queue.remove_head().as_deref(), Some("c"));
//! assert_eq!(queue.len(), 2);
//! ```

use core::fmt;
use core::mem;

use crate::{AllocError, Key, NodeSlab, Storage};

/// Default arena: a [`NodeSlab`] of nodes keyed by `K`.
pub type ChainStorage<K = u32> = NodeSlab<Node<K>, K>;

/// Arena backed by `slab::Slab`, for use as `Queue<SlabChainStorage, usize>`.
#[cfg(feature = "slab")]
pub type SlabChainStorage = slab::Slab<Node<usize>>;

/// One stored element: an owned string and the key of the next node.
#[derive(Debug)]
pub struct Node<K: Key = u32> {
    pub(crate) value: String,
    pub(crate) next: K,
}

impl<K: Key> Node<K> {
    #[inline]
    fn new(value: String) -> Self {
        Self {
            value,
            next: K::NONE,
        }
    }

    /// Returns the stored string.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A singly-linked queue of owned strings.
///
/// Supports O(1) insertion at both ends, O(1) removal at the head, in-place
/// reversal and an in-place stable sort (see [`Queue::sort`]). None of the
/// relinking operations allocate or free nodes.
///
/// # Type Parameters
///
/// - `S`: node arena (default [`ChainStorage`])
/// - `K`: link key type (default `u32`)
pub struct Queue<S = ChainStorage, K: Key = u32>
where
    S: Storage<Node<K>, Key = K>,
{
    pub(crate) storage: S,
    pub(crate) head: K,
    pub(crate) tail: K,
    pub(crate) len: usize,
}

impl<S, K: Key> Queue<S, K>
where
    S: Storage<Node<K>, Key = K> + Default,
{
    /// Creates an empty queue.
    ///
    /// The default arena does not allocate until the first insert.
    #[inline]
    pub fn new() -> Self {
        Self {
            storage: S::default(),
            head: K::NONE,
            tail: K::NONE,
            len: 0,
        }
    }

    /// Creates an empty queue with room for `capacity` nodes.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the arena cannot be reserved. This is
    /// distinct from a valid empty queue.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let mut queue = Self::new();
        queue.storage.try_reserve(capacity)?;
        Ok(queue)
    }
}

impl<S, K: Key> Default for Queue<S, K>
where
    S: Storage<Node<K>, Key = K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, K: Key> Queue<S, K>
where
    S: Storage<Node<K>, Key = K>,
{
    /// Returns the number of elements. O(1).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first element.
    #[inline]
    pub fn front(&self) -> Option<&str> {
        if self.head.is_none() {
            return None;
        }
        // Safety: head is live when is_some()
        Some(unsafe { self.storage.get_unchecked(self.head) }.value())
    }

    /// Returns the last element.
    #[inline]
    pub fn back(&self) -> Option<&str> {
        if self.tail.is_none() {
            return None;
        }
        // Safety: tail is live when is_some()
        Some(unsafe { self.storage.get_unchecked(self.tail) }.value())
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Inserts a copy of `text` at the head.
    ///
    /// Text after the first NUL byte, if any, is not stored.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the node or its string cannot be
    /// allocated. The queue is unchanged.
    pub fn insert_head(&mut self, text: &str) -> Result<(), AllocError> {
        let key = self.alloc_node(text)?;

        // Safety: key was just inserted
        unsafe { self.storage.get_unchecked_mut(key) }.next = self.head;
        if self.head.is_none() {
            self.tail = key;
        }
        self.head = key;
        self.len += 1;
        Ok(())
    }

    /// Inserts a copy of `text` at the tail. O(1).
    ///
    /// Text after the first NUL byte, if any, is not stored.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the node or its string cannot be
    /// allocated. The queue is unchanged.
    pub fn insert_tail(&mut self, text: &str) -> Result<(), AllocError> {
        let key = self.alloc_node(text)?;

        if self.tail.is_some() {
            // Safety: tail is live when is_some()
            unsafe { self.storage.get_unchecked_mut(self.tail) }.next = key;
        } else {
            self.head = key;
        }
        self.tail = key;
        self.len += 1;
        Ok(())
    }

    /// Reserves the node slot first, then copies the string, then inserts.
    /// A failure at any step leaves nothing behind in the arena.
    fn alloc_node(&mut self, text: &str) -> Result<K, AllocError> {
        self.storage.try_reserve(1)?;
        let value = copy_text(text)?;
        self.storage.try_insert(Node::new(value))
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Removes and returns the head element.
    ///
    /// Returns `None` if the queue is empty.
    pub fn remove_head(&mut self) -> Option<String> {
        if self.head.is_none() {
            return None;
        }

        let node = self.storage.remove(self.head)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = K::NONE;
        }
        self.len -= 1;
        Some(node.value)
    }

    /// Removes the head element, copying it into `out` as a NUL-terminated
    /// byte string.
    ///
    /// At most `out.len() - 1` bytes of the value are copied, followed by a
    /// NUL; the rest of `out` is zeroed. Nothing is written past `out.len()`.
    ///
    /// Returns `true` only if an element was removed and copied into `out`.
    /// With `out == None`, or a zero-length `out` that cannot even hold the
    /// terminator, the head is still removed and dropped, but the result is
    /// `false` since no value was delivered. An empty queue returns `false`
    /// and is left as is.
    ///
    /// # Example
    ///
    /// ```
    /// use nexus_strqueue::Queue;
    ///
    /// let mut queue: Queue = Queue::new();
    /// queue.insert_tail("overflow").unwrap();
    ///
    /// let mut buf = [0xffu8; 5];
    /// assert!(queue.remove_head_into(Some(&mut buf)));
    /// assert_eq!(&buf, b"over\0");
    /// ```
    pub fn remove_head_into(&mut self, out: Option<&mut [u8]>) -> bool {
        let Some(value) = self.remove_head() else {
            return false;
        };

        match out {
            Some(buf) => copy_truncated(&value, buf),
            None => false,
        }
    }

    /// Removes all elements, keeping the arena allocation.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.head = K::NONE;
        self.tail = K::NONE;
        self.len = 0;
    }

    // ========================================================================
    // Relink
    // ========================================================================

    /// Reverses the element order in place.
    ///
    /// Only links move; no node is allocated or freed.
    pub fn reverse(&mut self) {
        match self.len {
            0 | 1 => {}
            2 => {
                let (first, second) = (self.head, self.tail);
                // Safety: both ends are live in a two-node queue
                unsafe { self.storage.get_unchecked_mut(second) }.next = first;
                unsafe { self.storage.get_unchecked_mut(first) }.next = K::NONE;
                self.head = second;
                self.tail = first;
            }
            _ => {
                let mut prev = K::NONE;
                let mut cur = self.head;
                while cur.is_some() {
                    // Safety: cur is a live chain key
                    let node = unsafe { self.storage.get_unchecked_mut(cur) };
                    let next = mem::replace(&mut node.next, prev);
                    prev = cur;
                    cur = next;
                }
                mem::swap(&mut self.head, &mut self.tail);
            }
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over the elements, head to tail.
    #[inline]
    pub fn iter(&self) -> Iter<'_, S, K> {
        Iter {
            storage: &self.storage,
            next: self.head,
            remaining: self.len,
        }
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len);
        let mut cur = self.head;
        while cur.is_some() {
            keys.push(cur);
            cur = self.storage.get(cur).expect("chain key not in arena").next;
        }
        keys
    }

    /// Walks the chain and checks every queue invariant.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.len == 0, self.head.is_none(), "head/len mismatch");
        assert_eq!(self.len == 0, self.tail.is_none(), "tail/len mismatch");
        assert_eq!(self.storage.len(), self.len, "arena holds stray nodes");

        let mut count = 0;
        let mut last = K::NONE;
        let mut cur = self.head;
        while cur.is_some() {
            count += 1;
            assert!(count <= self.len, "chain longer than len (cycle?)");
            let node = self.storage.get(cur).expect("chain key not in arena");
            assert!(!node.value.as_bytes().contains(&0), "value holds a NUL");
            last = cur;
            cur = node.next;
        }
        assert_eq!(count, self.len, "chain shorter than len");
        assert_eq!(last, self.tail, "tail is not the last node");
    }
}

impl<'a, S, K: Key + 'a> IntoIterator for &'a Queue<S, K>
where
    S: Storage<Node<K>, Key = K>,
{
    type Item = &'a str;
    type IntoIter = Iter<'a, S, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S, K: Key> fmt::Debug for Queue<S, K>
where
    S: Storage<Node<K>, Key = K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over queue elements, head to tail.
pub struct Iter<'a, S, K: Key> {
    storage: &'a S,
    next: K,
    remaining: usize,
}

impl<'a, S, K: Key + 'a> Iterator for Iter<'a, S, K>
where
    S: Storage<Node<K>, Key = K>,
{
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }

        let storage: &'a S = self.storage;
        // Safety: next is a live chain key; the shared borrow of the queue
        // keeps the chain frozen
        let node = unsafe { storage.get_unchecked(self.next) };
        self.next = node.next;
        self.remaining -= 1;
        Some(node.value())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, S, K: Key + 'a> ExactSizeIterator for Iter<'a, S, K> where S: Storage<Node<K>, Key = K> {}

/// Owned copy of `text` up to its first NUL, allocated fallibly.
fn copy_text(text: &str) -> Result<String, AllocError> {
    let text = match memchr::memchr(0, text.as_bytes()) {
        Some(nul) => &text[..nul],
        None => text,
    };

    let mut value = String::new();
    value.try_reserve_exact(text.len()).map_err(|err| {
        log::debug!("string allocation of {} bytes refused: {err}", text.len());
        AllocError::from(err)
    })?;
    value.push_str(text);
    Ok(value)
}

/// strncpy-style copy: at most `out.len() - 1` bytes, NUL-padded.
///
/// Returns `false` if `out` has no room for the terminator.
fn copy_truncated(value: &str, out: &mut [u8]) -> bool {
    let Some(room) = out.len().checked_sub(1) else {
        return false;
    };
    let n = value.len().min(room);
    out[..n].copy_from_slice(&value.as_bytes()[..n]);
    out[n..].fill(0);
    true
}


#[cfg(test)]
mod bench_queue {
    use super::*;
    use hdrhistogram::Histogram;

    #[inline]
    fn rdtscp() -> u64 {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            core::arch::x86_64::__rdtscp(&mut 0)
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            std::time::Instant::now().elapsed().as_nanos() as u64
        }
    }

    fn print_histogram(name: &str, hist: &Histogram<u64>) {
        println!(
            "{:24} p50: {:4} cycles | p99: {:4} cycles | p999: {:5} cycles | min: {:4} | max: {:5}",
            name,
            hist.value_at_quantile(0.50),
            hist.value_at_quantile(0.99),
            hist.value_at_quantile(0.999),
            hist.min(),
            hist.max(),
        );
    }

    const WARMUP: usize = 10_000;
    const ITERATIONS: usize = 100_000;

    #[test]
    #[ignore]
    fn bench_insert_tail() {
        let mut queue: Queue = Queue::try_with_capacity(1).unwrap();
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for _ in 0..WARMUP {
            let _ = queue.insert_tail("warmup-value");
            let _ = queue.remove_head();
        }

        for _ in 0..ITERATIONS {
            let start = rdtscp();
            let _ = queue.insert_tail("measured-value");
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
            let _ = queue.remove_head();
        }

        print_histogram("insert_tail", &hist);
    }

    #[test]
    #[ignore]
    fn bench_remove_head_into() {
        let mut queue: Queue = Queue::try_with_capacity(1).unwrap();
        let mut hist = Histogram::<u64>::new(3).unwrap();
        let mut buf = [0u8; 32];

        for _ in 0..WARMUP {
            let _ = queue.insert_tail("warmup-value");
            let _ = queue.remove_head_into(Some(&mut buf));
        }

        for _ in 0..ITERATIONS {
            let _ = queue.insert_tail("measured-value");
            let start = rdtscp();
            let _ = queue.remove_head_into(Some(&mut buf));
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
        }

        print_histogram("remove_head_into", &hist);
    }

    #[test]
    #[ignore]
    fn bench_reverse_1k() {
        let mut queue: Queue = Queue::new();
        for i in 0..1_000 {
            queue.insert_tail(&i.to_string()).unwrap();
        }
        let mut hist = Histogram::<u64>::new(3).unwrap();

        for _ in 0..ITERATIONS / 100 {
            let start = rdtscp();
            queue.reverse();
            let elapsed = rdtscp() - start;
            hist.record(elapsed).unwrap();
        }

        print_histogram("reverse (1k)", &hist);
    }
}
