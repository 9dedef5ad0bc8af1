use std::collections::VecDeque;

use nexus_strqueue::{ChainStorage, INSERTION_SORT_THRESHOLD, Queue, handle};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_word(rng: &mut SmallRng) -> String {
    let len = rng.random_range(1..10);
    (0..len)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}

fn contents(queue: &Queue) -> Vec<String> {
    queue.iter().map(str::to_owned).collect()
}

/// Checks the queue against the model through the public surface only.
fn assert_matches(queue: &Queue, model: &VecDeque<String>) {
    assert_eq!(queue.len(), model.len());
    assert_eq!(handle::size(Some(queue)), model.len());
    assert_eq!(queue.iter().count(), model.len());
    assert_eq!(queue.front(), model.front().map(String::as_str));
    assert_eq!(queue.back(), model.back().map(String::as_str));
    assert!(queue.iter().eq(model.iter().map(String::as_str)));
}

// =============================================================================
// Model-based operation sequences
// =============================================================================

#[test]
fn random_operations_track_model() {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    let mut queue: Queue = Queue::new();
    let mut model: VecDeque<String> = VecDeque::new();
    let mut buf = [0u8; 6];

    for _ in 0..20_000 {
        match rng.random_range(0..100) {
            0..30 => {
                let word = random_word(&mut rng);
                queue.insert_tail(&word).unwrap();
                model.push_back(word);
            }
            30..55 => {
                let word = random_word(&mut rng);
                queue.insert_head(&word).unwrap();
                model.push_front(word);
            }
            55..75 => {
                assert_eq!(queue.remove_head(), model.pop_front());
            }
            75..88 => {
                let removed = queue.remove_head_into(Some(&mut buf));
                match model.pop_front() {
                    Some(expected) => {
                        assert!(removed);
                        let n = expected.len().min(buf.len() - 1);
                        assert_eq!(&buf[..n], &expected.as_bytes()[..n]);
                        assert_eq!(buf[n], 0);
                    }
                    None => assert!(!removed),
                }
            }
            88..94 => {
                queue.reverse();
                model.make_contiguous().reverse();
            }
            94..97 => {
                queue.sort();
                model.make_contiguous().sort();
            }
            _ => {
                assert!(!queue.remove_head_into(None));
                model.pop_front();
            }
        }
        assert_matches(&queue, &model);
    }
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn insert_tail_then_remove_head_on_fresh_queue() {
    let mut queue: Option<Queue> = handle::new().ok();
    assert!(handle::insert_tail(queue.as_mut(), "platypus"));

    let mut buf = [0u8; 16];
    assert!(handle::remove_head(queue.as_mut(), Some(&mut buf)));
    assert_eq!(&buf[..9], b"platypus\0");
    assert_eq!(handle::size(queue.as_ref()), 0);
}

#[test]
fn double_reverse_is_identity() {
    let mut rng = SmallRng::seed_from_u64(5);
    for len in [0, 1, 2, 3, 4, 17, 300] {
        let mut queue: Queue = Queue::new();
        for _ in 0..len {
            queue.insert_tail(&random_word(&mut rng)).unwrap();
        }
        let before = contents(&queue);

        queue.reverse();
        let mut reversed = before.clone();
        reversed.reverse();
        assert_eq!(contents(&queue), reversed);

        queue.reverse();
        assert_eq!(contents(&queue), before, "len {len}");
    }
}

#[test]
fn sort_is_idempotent_and_matches_reference() {
    let mut rng = SmallRng::seed_from_u64(77);
    for len in [
        INSERTION_SORT_THRESHOLD - 1,
        INSERTION_SORT_THRESHOLD,
        INSERTION_SORT_THRESHOLD + 1,
        2 * INSERTION_SORT_THRESHOLD,
        2 * INSERTION_SORT_THRESHOLD + 1,
        5_000,
    ] {
        let values: Vec<String> = (0..len).map(|_| random_word(&mut rng)).collect();
        let mut queue: Queue = Queue::new();
        for value in &values {
            queue.insert_head(value).unwrap();
        }

        let mut expected = values.clone();
        expected.sort();

        queue.sort();
        assert_eq!(contents(&queue), expected, "len {len}");
        assert_eq!(queue.back(), expected.last().map(String::as_str));

        queue.sort();
        assert_eq!(contents(&queue), expected, "len {len} (second sort)");
    }
}

#[test]
fn sort_keeps_equal_prefix_order() {
    let mut queue: Queue = Queue::new();
    for value in ["b", "a1", "a2"] {
        queue.insert_tail(value).unwrap();
    }
    queue.sort();
    assert_eq!(contents(&queue), ["a1", "a2", "b"]);
}

#[test]
fn small_buffer_is_terminated_within_capacity() {
    let mut queue: Queue = Queue::new();
    queue.insert_tail("hippopotamus").unwrap();

    let mut buf = [0xaau8; 10];
    assert!(handle::remove_head(Some(&mut queue), Some(&mut buf[..5])));
    assert_eq!(&buf[..5], b"hipp\0");
    assert!(buf[5..].iter().all(|&b| b == 0xaa));
}

#[test]
fn remove_from_empty_keeps_size() {
    let mut queue: Queue = Queue::new();
    assert!(!handle::remove_head(Some(&mut queue), None));
    assert_eq!(queue.remove_head(), None);
    assert_eq!(queue.len(), 0);
}

#[test]
fn free_any_state() {
    // Empty
    let queue: Queue = Queue::new();
    handle::free(Some(queue));
    handle::free::<ChainStorage, u32>(None);

    // Singleton
    let mut queue: Queue = Queue::new();
    queue.insert_tail("one").unwrap();
    handle::free(Some(queue));

    // Large, sorted, reversed
    let mut rng = SmallRng::seed_from_u64(1);
    for op in 0..3 {
        let mut queue: Queue = Queue::new();
        for _ in 0..2_000 {
            queue.insert_tail(&random_word(&mut rng)).unwrap();
        }
        match op {
            1 => queue.sort(),
            2 => queue.reverse(),
            _ => {}
        }
        handle::free(Some(queue));
    }
}

#[test]
fn queue_works_as_stack() {
    let mut queue: Queue = Queue::new();
    for value in ["a", "b", "c"] {
        queue.insert_head(value).unwrap();
    }
    let popped: Vec<String> = std::iter::from_fn(|| queue.remove_head()).collect();
    assert_eq!(popped, ["c", "b", "a"]);
}
