//! Integration tests for `dense_pool` that exercise the pools only through their public API.
//!
//! Each test drives a pool through a long random sequence of requests and returns and checks
//! after every step that the identifier tables form a bijection, that the live items are packed
//! at the front of storage and that every live identifier still reads back the tag written
//! through it.

#![allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]

use std::collections::HashMap;

use dense_pool::{
    DensePool, FreeSlotPool, GrowableDensePool, GrowableFreeSlotPool, Poolable, RemovalOrder,
    ResizableDensePool, ValuePool,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STEPS: usize = 5_000;

/// Asserts that the tables are inverse permutations and that the live prefix holds exactly the
/// expected identifiers with their expected tags.
fn assert_consistent(
    ids_to_indices: &[usize],
    indices_to_ids: &[usize],
    live: &[u64],
    expected: &HashMap<usize, u64>,
) {
    assert_eq!(ids_to_indices.len(), indices_to_ids.len());

    for (id, &index) in ids_to_indices.iter().enumerate() {
        assert_eq!(indices_to_ids[index], id);
    }

    assert_eq!(live.len(), expected.len());

    for (index, tag) in live.iter().enumerate() {
        let id = indices_to_ids[index];
        assert_eq!(expected.get(&id), Some(tag), "id {id} at index {index}");
    }
}

fn tag_for(rng: &mut StdRng) -> u64 {
    // Zero is the cleared state, so tags never use it.
    rng.random_range(1..u64::MAX)
}

#[test]
fn fixed_pool_random_churn() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pool = DensePool::builder()
        .capacity(64)
        .factory(|| 0_u64)
        .on_return(|tag| *tag = 0)
        .build()
        .unwrap();
    let mut expected = HashMap::new();
    let mut live_ids = Vec::new();

    for _ in 0..STEPS {
        if live_ids.is_empty() || rng.random_bool(0.5) {
            match pool.request_id() {
                Some(id) => {
                    assert_eq!(pool.get(id), Some(&0));
                    let tag = tag_for(&mut rng);
                    *pool.get_mut(id).unwrap() = tag;
                    assert!(expected.insert(id, tag).is_none());
                    live_ids.push(id);
                }
                None => {
                    assert_eq!(expected.len(), 64);
                    assert_eq!(pool.len(), 64);
                }
            }
        } else {
            let id = live_ids.swap_remove(rng.random_range(0..live_ids.len()));
            pool.return_id(id);
            expected.remove(&id);
        }

        assert_consistent(
            pool.ids_to_indices(),
            pool.indices_to_ids(),
            pool.live(),
            &expected,
        );
    }
}

#[test]
fn growable_pool_random_churn_never_fails() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut pool = GrowableDensePool::builder()
        .factory(|| 0_u64)
        .on_return(|tag| *tag = 0)
        .build()
        .unwrap();
    let mut expected = HashMap::new();
    let mut peak = 0;

    for _ in 0..STEPS {
        if expected.is_empty() || rng.random_bool(0.55) {
            let id = pool.request_id();
            let tag = tag_for(&mut rng);
            *pool.get_mut(id).unwrap() = tag;
            expected.insert(id, tag);
            peak = peak.max(expected.len());
        } else {
            let index = rng.random_range(0..pool.len());
            let id = pool.id_at(index);
            pool.return_index(index);
            expected.remove(&id);
        }

        assert_eq!(pool.capacity(), peak);
        assert_consistent(
            pool.ids_to_indices(),
            pool.indices_to_ids(),
            pool.live(),
            &expected,
        );
    }
}

#[test]
fn resizable_pool_random_churn_in_both_orders() {
    for removal_order in [RemovalOrder::Unordered, RemovalOrder::Ordered] {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pool = ResizableDensePool::builder()
            .capacity(1)
            .max_capacity(100)
            .factory(|| 0_u64)
            .on_return(|tag| *tag = 0)
            .removal_order(removal_order)
            .build()
            .unwrap();
        let mut expected = HashMap::new();
        let mut request_order = Vec::new();

        for _ in 0..STEPS {
            if request_order.is_empty() || rng.random_bool(0.6) {
                if let Some(id) = pool.request_id() {
                    let tag = tag_for(&mut rng);
                    *pool.get_mut(id).unwrap() = tag;
                    expected.insert(id, tag);
                    request_order.push(id);
                } else {
                    assert_eq!(pool.capacity(), 100);
                    assert!(pool.is_full());
                }
            } else {
                let position = rng.random_range(0..request_order.len());
                let id = request_order.remove(position);
                pool.return_id(id);
                expected.remove(&id);
            }

            assert_consistent(
                pool.ids_to_indices(),
                pool.indices_to_ids(),
                pool.live(),
                &expected,
            );

            if removal_order == RemovalOrder::Ordered {
                let live_ids: Vec<_> = pool.iter().map(|(id, _)| id).collect();
                assert_eq!(live_ids, request_order);
            }
        }
    }
}

#[test]
fn value_pool_random_churn() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut pool = ValuePool::builder()
        .capacity(4)
        .max_capacity(50)
        .on_clear(|tag: &mut u64| *tag = 0)
        .on_move(|from: &u64, to: &mut u64| *to = *from)
        .build()
        .unwrap();
    let mut expected = HashMap::new();

    for _ in 0..STEPS {
        if expected.is_empty() || rng.random_bool(0.6) {
            if let Some(id) = pool.request_id() {
                assert_eq!(*pool.at_id(id), 0);
                let tag = tag_for(&mut rng);
                *pool.at_id_mut(id) = tag;
                expected.insert(id, tag);
            }
        } else {
            let index = rng.random_range(0..pool.len());
            let id = pool.id_at(index);
            pool.return_index(index);
            expected.remove(&id);
        }

        assert_consistent(
            pool.ids_to_indices(),
            pool.indices_to_ids(),
            pool.live(),
            &expected,
        );
    }
}

#[derive(Debug, Default)]
struct Slotted {
    slot: usize,
    tag: u64,
}

impl Poolable for Slotted {
    fn pool_index(&self) -> usize {
        self.slot
    }

    fn set_pool_index(&mut self, index: usize) {
        self.slot = index;
    }
}

#[test]
fn free_slot_pools_never_move_items() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut fixed = FreeSlotPool::builder()
        .capacity(32)
        .factory(Slotted::default)
        .on_return(|item: &mut Slotted| item.tag = 0)
        .build()
        .unwrap();
    let mut growable = GrowableFreeSlotPool::builder()
        .capacity(4)
        .factory(Slotted::default)
        .on_return(|item: &mut Slotted| item.tag = 0)
        .build()
        .unwrap();
    let mut fixed_expected = HashMap::new();
    let mut growable_expected = HashMap::new();
    let mut fixed_slots = Vec::new();
    let mut growable_slots = Vec::new();

    for _ in 0..STEPS {
        if rng.random_bool(0.5) {
            let tag = tag_for(&mut rng);

            if let Some(item) = fixed.request() {
                assert_eq!(item.tag, 0);
                item.tag = tag;
                fixed_expected.insert(item.pool_index(), tag);
                fixed_slots.push(item.pool_index());
            } else {
                assert_eq!(fixed_expected.len(), 32);
            }

            let item = growable.request();
            assert_eq!(item.tag, 0);
            item.tag = tag;
            growable_expected.insert(item.pool_index(), tag);
            growable_slots.push(item.pool_index());
        } else {
            if !fixed_slots.is_empty() {
                let slot = fixed_slots.swap_remove(rng.random_range(0..fixed_slots.len()));
                fixed.return_slot(slot);
                fixed_expected.remove(&slot);
            }
            if !growable_slots.is_empty() {
                let slot = growable_slots.swap_remove(rng.random_range(0..growable_slots.len()));
                let handle = Slotted { slot, tag: 0 };
                growable.return_element(&handle);
                growable_expected.remove(&slot);
            }
        }

        assert_eq!(fixed.len(), fixed_expected.len());
        assert_eq!(growable.len(), growable_expected.len());
        for (&slot, &tag) in &fixed_expected {
            assert_eq!(fixed.get(slot).map(|item| item.tag), Some(tag));
        }
        for (&slot, &tag) in &growable_expected {
            assert_eq!(growable.get(slot).map(|item| item.tag), Some(tag));
        }

        let mut in_use = fixed_slots.clone();
        in_use.sort_unstable();
        let iterated: Vec<_> = fixed.iter().map(|(slot, _)| slot).collect();
        assert_eq!(iterated, in_use);
    }
}
