//! Singly-linked string queue with arena-backed nodes.
//!
//! A [`Queue`] holds owned strings in a chain of nodes and supports:
//!
//! | Operation | Cost | Notes |
//! |-----------|------|-------|
//! | [`insert_head`](Queue::insert_head) | O(1) | fallible allocation |
//! | [`insert_tail`](Queue::insert_tail) | O(1) | tail is cached |
//! | [`remove_head`](Queue::remove_head) | O(1) | |
//! | [`len`](Queue::len) | O(1) | |
//! | [`reverse`](Queue::reverse) | O(n) | relinks only |
//! | [`sort`](Queue::sort) | O(n log n) | stable, relinks only |
//!
//! # Design
//!
//! Nodes do not point at each other. The queue owns an arena ([`Storage`])
//! holding every node, and links are integer [`Key`]s into it:
//!
//! ```text
//! Queue { head, tail, len }
//!   └── Storage (NodeSlab)  - owns every Node
//!         └── Node { value: String, next: Key }
//! ```
//!
//! Ownership stays tree-shaped, so dropping the queue drops every node and
//! string, and relinking during reverse or sort can never leave a dangling
//! or doubly-owned node. Removed slots are recycled by later inserts.
//!
//! # Allocation Failure
//!
//! Insertion never aborts on allocation failure. Node slots are reserved
//! with `Vec::try_reserve` and strings with `String::try_reserve_exact`;
//! either failing returns an [`AllocError`] and leaves the queue untouched.
//!
//! ```
//! use nexus_strqueue::{AllocError, ChainStorage, Queue};
//!
//! // A u8-keyed queue addresses at most 255 nodes
//! let mut queue: Queue<ChainStorage<u8>, u8> = Queue::new();
//! for i in 0..255 {
//!     queue.insert_tail(&i.to_string()).unwrap();
//! }
//! assert_eq!(queue.insert_tail("one more"), Err(AllocError::KeySpace { max: 255 }));
//! assert_eq!(queue.len(), 255);
//! ```
//!
//! # Handle API
//!
//! The [`handle`] module offers the same operations over `Option<&mut Queue>`
//! with `bool` results, for drivers that pass around possibly-absent queues.
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab` and the
//!   `SlabChainStorage` alias

#![warn(missing_docs)]

mod error;
pub mod handle;
pub mod key;
mod queue;
mod sort;
pub mod storage;

pub use error::{AllocError, QueueError};
pub use key::Key;
pub use queue::{ChainStorage, Iter, Node, Queue};
pub use sort::INSERTION_SORT_THRESHOLD;
pub use storage::{NodeSlab, Storage};

#[cfg(feature = "slab")]
pub use queue::SlabChainStorage;
