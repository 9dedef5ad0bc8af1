//! In-place stable sort of the node chain.
//!
//! A hybrid merge sort: the chain is split in halves with slow/fast cursors,
//! halves longer than the threshold are sorted recursively, shorter ones with
//! an insertion sort, and the two sorted halves are merged by relinking.
//! Every step moves `next` keys between nodes; values never move and no node
//! is allocated or freed.
//!
//! Ordering is byte-wise lexicographic (`str`'s `Ord`). Both the merge and
//! the insertion sort take the earlier node on ties, so the sort is stable.
//!
//! Recursion only happens above the threshold and halves the length each
//! level, so depth is at most `log2(len / threshold) + 1`, which is bounded
//! by the pointer width.

use core::marker::PhantomData;

use crate::{Key, Node, Queue, Storage};

/// Chains at or below this many nodes are insertion-sorted instead of split.
pub const INSERTION_SORT_THRESHOLD: usize = 128;

impl<S, K: Key> Queue<S, K>
where
    S: Storage<Node<K>, Key = K>,
{
    /// Sorts the elements in ascending byte-wise order. Stable.
    ///
    /// Uses [`INSERTION_SORT_THRESHOLD`] as the merge sort floor. A no-op
    /// for fewer than two elements.
    ///
    /// # Example
    ///
    /// ```
    /// use nexus_strqueue::Queue;
    ///
    /// let mut queue: Queue = Queue::new();
    /// for word in ["pear", "apple", "fig", "apple"] {
    ///     queue.insert_tail(word).unwrap();
    /// }
    ///
    /// queue.sort();
    /// assert_eq!(queue.iter().collect::<Vec<_>>(), ["apple", "apple", "fig", "pear"]);
    /// assert_eq!(queue.back(), Some("pear"));
    /// ```
    #[inline]
    pub fn sort(&mut self) {
        self.sort_with_threshold(INSERTION_SORT_THRESHOLD);
    }

    /// Sorts with a custom insertion sort floor.
    ///
    /// Halves longer than `threshold` nodes are split again; shorter ones
    /// are insertion-sorted. `threshold` is clamped to at least 1. The
    /// result is identical for every threshold; only the cost changes.
    pub fn sort_with_threshold(&mut self, threshold: usize) {
        if self.len < 2 {
            return;
        }

        let threshold = threshold.max(1);
        log::trace!("sorting {} nodes (threshold {threshold})", self.len);

        let mut chain = Chain {
            storage: &mut self.storage,
            _key: PhantomData,
        };
        let head = chain.merge_sort(self.head, self.len, threshold);
        self.head = head;
        self.tail = chain.last(head);
    }
}

/// Link access for keys known to be in the chain being sorted.
///
/// Every key handed to these methods was read from `head` or from a live
/// node's `next`, so it is occupied in the arena.
struct Chain<'a, S, K> {
    storage: &'a mut S,
    _key: PhantomData<K>,
}

impl<S, K: Key> Chain<'_, S, K>
where
    S: Storage<Node<K>, Key = K>,
{
    #[inline]
    fn next(&self, key: K) -> K {
        // Safety: key is a live chain key
        unsafe { self.storage.get_unchecked(key) }.next
    }

    #[inline]
    fn set_next(&mut self, key: K, next: K) {
        // Safety: key is a live chain key
        unsafe { self.storage.get_unchecked_mut(key) }.next = next;
    }

    #[inline]
    fn value(&self, key: K) -> &str {
        // Safety: key is a live chain key
        unsafe { self.storage.get_unchecked(key) }.value()
    }

    /// `true` if `a` sorts strictly after `b`.
    #[inline]
    fn greater(&self, a: K, b: K) -> bool {
        self.value(a) > self.value(b)
    }

    fn last(&self, head: K) -> K {
        let mut cur = head;
        loop {
            let next = self.next(cur);
            if next.is_none() {
                return cur;
            }
            cur = next;
        }
    }

    /// Sorts the `len`-node chain at `head` (`len >= 2`), returning the new
    /// head. The returned chain ends in `NONE`.
    fn merge_sort(&mut self, head: K, len: usize, threshold: usize) -> K {
        debug_assert!(len >= 2);

        // Slow advances one node per step, fast two. When fast runs out,
        // slow is the last node of the first half.
        let mut slow = head;
        let mut fast = self.next(head);
        while fast.is_some() {
            fast = self.next(fast);
            if fast.is_none() {
                break;
            }
            fast = self.next(fast);
            slow = self.next(slow);
        }
        let right = self.next(slow);
        self.set_next(slow, K::NONE);

        let left_len = len.div_ceil(2);
        let right_len = len / 2;

        let left = self.sort_half(head, left_len, threshold);
        let right = self.sort_half(right, right_len, threshold);
        self.merge(left, right)
    }

    #[inline]
    fn sort_half(&mut self, head: K, len: usize, threshold: usize) -> K {
        if len > threshold {
            self.merge_sort(head, len, threshold)
        } else {
            self.insertion_sort(head)
        }
    }

    /// Merges two sorted, `NONE`-terminated chains. Ties take `left` first.
    fn merge(&mut self, mut left: K, mut right: K) -> K {
        if left.is_none() {
            return right;
        }
        if right.is_none() {
            return left;
        }

        let head = if self.greater(left, right) {
            let key = right;
            right = self.next(right);
            key
        } else {
            let key = left;
            left = self.next(left);
            key
        };

        let mut tail = head;
        while left.is_some() && right.is_some() {
            let key = if self.greater(left, right) {
                let key = right;
                right = self.next(right);
                key
            } else {
                let key = left;
                left = self.next(left);
                key
            };
            self.set_next(tail, key);
            tail = key;
        }

        // Splice whatever remains
        self.set_next(tail, if left.is_some() { left } else { right });
        head
    }

    /// Stable insertion sort of a `NONE`-terminated chain by relinking.
    ///
    /// The chain is a sorted prefix `head..=sorted_tail` followed by the
    /// unsorted rest. Each node of the rest either extends the prefix in
    /// place or is spliced before the first prefix node greater than it.
    fn insertion_sort(&mut self, mut head: K) -> K {
        if head.is_none() {
            return head;
        }

        let mut sorted_tail = head;
        let mut cur = self.next(sorted_tail);
        while cur.is_some() {
            if !self.greater(sorted_tail, cur) {
                sorted_tail = cur;
                cur = self.next(cur);
                continue;
            }

            // Detach cur; the prefix now ends in sorted_tail -> rest
            let rest = self.next(cur);
            self.set_next(sorted_tail, rest);

            if self.greater(head, cur) {
                self.set_next(cur, head);
                head = cur;
            } else {
                // Stops before sorted_tail at the latest, since sorted_tail > cur
                let mut prev = head;
                loop {
                    let next = self.next(prev);
                    if self.greater(next, cur) {
                        break;
                    }
                    prev = next;
                }
                let next = self.next(prev);
                self.set_next(cur, next);
                self.set_next(prev, cur);
            }

            cur = rest;
        }

        head
    }
}
