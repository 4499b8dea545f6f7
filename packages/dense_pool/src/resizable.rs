use tracing::{debug, trace};

use crate::{DenseSlots, Iter, IterMut, Poolable, RemovalOrder, ResizableDensePoolBuilder};

/// A dense object pool that doubles its capacity on demand, up to a hard maximum.
///
/// Behaves like [`DensePool`][crate::DensePool] until it runs out of free slots. At that point a
/// request doubles the capacity (clamped to the maximum capacity), creating the new items with
/// the factory callback, and proceeds. A request only fails once the pool is at its maximum
/// capacity and every slot is live.
///
/// # Removal order
///
/// By default a returned item's slot is filled by moving the last live item into it, which
/// is O(1). With [`RemovalOrder::Ordered`] the live items after the returned one are instead
/// shifted down by one slot each, so the live items always stay in the order in which they
/// were requested, at O(k) cost for k items after the returned one.
///
/// # Example
///
/// ```rust
/// use dense_pool::ResizableDensePool;
///
/// let mut pool = ResizableDensePool::builder()
///     .capacity(10)
///     .max_capacity(20)
///     .factory(|| 0_i32)
///     .build()
///     .unwrap();
///
/// let ids: Vec<_> = (0..15).map(|_| pool.request_id().unwrap()).collect();
///
/// assert_eq!(pool.len(), 15);
/// assert_eq!(pool.capacity(), 20);
///
/// for _ in 15..20 {
///     assert!(pool.request_id().is_some());
/// }
/// assert!(pool.request_id().is_none());
/// # drop(ids);
/// ```
///
/// # Thread safety
///
/// The pool is meant for a single owner that performs requests and returns serially. It is
/// neither [`Send`] nor [`Sync`] because it stores arbitrary client callbacks.
#[derive(Debug)]
pub struct ResizableDensePool<T> {
    slots: DenseSlots<T>,

    /// The capacity will never grow beyond this.
    max_capacity: usize,

    removal_order: RemovalOrder,
}

impl<T> ResizableDensePool<T> {
    /// Creates a builder for configuring and constructing a [`ResizableDensePool`].
    ///
    /// A factory callback is mandatory; all other settings are optional.
    #[inline]
    pub fn builder() -> ResizableDensePoolBuilder<T> {
        ResizableDensePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn from_parts(
        slots: DenseSlots<T>,
        max_capacity: usize,
        removal_order: RemovalOrder,
    ) -> Self {
        debug_assert!(slots.capacity() <= max_capacity);

        Self {
            slots,
            max_capacity,
            removal_order,
        }
    }

    /// Claims a free slot and returns the identifier of the item in it, doubling the capacity
    /// of the pool first if every slot is live.
    ///
    /// Returns `None` if the pool is already at its maximum capacity and every slot is live.
    #[must_use]
    pub fn request_id(&mut self) -> Option<usize> {
        if self.slots.is_full() {
            let capacity = self.slots.capacity();

            if capacity >= self.max_capacity {
                trace!(
                    capacity,
                    max_capacity = self.max_capacity,
                    "resizable dense pool exhausted"
                );
                return None;
            }

            self.resize(next_capacity(capacity, self.max_capacity));
        }

        self.slots.claim()
    }

    /// Grows the pool to the given capacity, creating the new items with the factory callback.
    ///
    /// The new capacity is clamped to the maximum capacity. Does nothing if the pool already
    /// has at least that capacity; the pool never shrinks.
    ///
    /// All live identifiers remain valid and keep resolving to the same items.
    pub fn resize(&mut self, new_capacity: usize) {
        let old_capacity = self.slots.capacity();
        let new_capacity = new_capacity.min(self.max_capacity);

        if new_capacity <= old_capacity {
            return;
        }

        debug!(
            old_capacity,
            new_capacity,
            max_capacity = self.max_capacity,
            "resizing dense pool"
        );

        self.slots.grow_to(new_capacity);

        #[cfg(debug_assertions)]
        self.slots.integrity_check();
    }

    /// Ensures that at least `additional` more requests can succeed without resizing, or as
    /// many as the maximum capacity allows.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.slots.len().saturating_add(additional);
        self.resize(required);
    }

    /// Returns the item with the given identifier to the pool, closing the gap according to
    /// the pool's [removal order][RemovalOrder].
    ///
    /// # Panics
    ///
    /// Panics if `id` was never issued by this pool. In debug builds, also panics if `id` is
    /// not currently live.
    #[inline]
    pub fn return_id(&mut self, id: usize) {
        self.slots.release_id(id, self.removal_order);
    }

    /// Returns the item at the given storage index to the pool, closing the gap according to
    /// the pool's [removal order][RemovalOrder].
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity of the pool. In debug builds, also panics if
    /// `index` is not within the live range.
    #[inline]
    pub fn return_index(&mut self, index: usize) {
        self.slots.release_index(index, self.removal_order);
    }

    /// Returns every live item to the pool, calling `on_return` on each of them.
    ///
    /// The capacity is retained.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// How the pool closes the gap left by a returned item.
    #[must_use]
    #[inline]
    pub fn removal_order(&self) -> RemovalOrder {
        self.removal_order
    }

    /// Changes how the pool closes the gap left by a returned item.
    ///
    /// Switching to [`RemovalOrder::Ordered`] only preserves the order of the live items from
    /// this point onwards.
    pub fn set_removal_order(&mut self, removal_order: RemovalOrder) {
        self.removal_order = removal_order;
    }

    /// The number of live items.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no live items.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    /// Whether every slot is live and the pool cannot grow any further.
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.is_full() && self.slots.capacity() >= self.max_capacity
    }

    /// The number of items the pool currently holds, live or free.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// The capacity that the pool will never grow beyond.
    #[must_use]
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// The live item with the given identifier, or `None` if the identifier is not live.
    #[must_use]
    #[inline]
    pub fn get(&self, id: usize) -> Option<&T> {
        self.slots.get(id)
    }

    /// Exclusive access to the live item with the given identifier, or `None` if the
    /// identifier is not live.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        self.slots.get_mut(id)
    }

    /// The live items as a contiguous slice, in storage order.
    ///
    /// With [`RemovalOrder::Ordered`], storage order is the order in which the items were
    /// requested.
    #[must_use]
    #[inline]
    pub fn live(&self) -> &[T] {
        self.slots.live()
    }

    /// The live items as a contiguous exclusive slice, in storage order.
    #[must_use]
    #[inline]
    pub fn live_mut(&mut self) -> &mut [T] {
        self.slots.live_mut()
    }

    /// Iterates over `(id, item)` pairs of the live items, in storage order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.slots.iter()
    }

    /// Iterates over `(id, item)` pairs of the live items with exclusive access to the items,
    /// in storage order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.slots.iter_mut()
    }

    /// The storage index currently occupied by the item with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the capacity of the pool.
    #[must_use]
    #[inline]
    pub fn index_of(&self, id: usize) -> usize {
        self.slots.ids().index_of(id)
    }

    /// The identifier of the item currently stored at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity of the pool.
    #[must_use]
    #[inline]
    pub fn id_at(&self, index: usize) -> usize {
        self.slots.ids().id_at(index)
    }

    /// The identifier-to-index table, covering every slot of the pool.
    #[must_use]
    #[inline]
    pub fn ids_to_indices(&self) -> &[usize] {
        self.slots.ids().ids_to_indices()
    }

    /// The index-to-identifier table, covering every slot of the pool.
    #[must_use]
    #[inline]
    pub fn indices_to_ids(&self) -> &[usize] {
        self.slots.ids().indices_to_ids()
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        assert!(self.slots.capacity() <= self.max_capacity);
        self.slots.integrity_check();
    }
}

impl<T: Poolable> ResizableDensePool<T> {
    /// Claims a free slot (growing the pool if needed and allowed) and returns the item in it,
    /// stamped with its identifier.
    ///
    /// Returns `None` if the pool is at its maximum capacity and every slot is live.
    #[must_use]
    pub fn request(&mut self) -> Option<&mut T> {
        let id = self.request_id()?;

        let item = self
            .slots
            .get_mut(id)
            .expect("an identifier we just claimed must be live");
        item.set_pool_index(id);

        Some(item)
    }

    /// Returns an item to the pool, using the identifier the item reports about itself.
    ///
    /// # Panics
    ///
    /// Same as [`return_id()`][Self::return_id].
    pub fn return_element<P: Poolable + ?Sized>(&mut self, element: &P) {
        self.return_id(element.pool_index());
    }
}

impl<'a, T> IntoIterator for &'a ResizableDensePool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.live().iter()
    }
}

/// The capacity to grow to when a bounded pool runs out of free slots: double the current
/// capacity (at least one slot), clamped to the maximum.
#[must_use]
pub(crate) fn next_capacity(capacity: usize, max_capacity: usize) -> usize {
    capacity.saturating_mul(2).max(1).min(max_capacity)
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn counter_pool(
        capacity: usize,
        max_capacity: usize,
        removal_order: RemovalOrder,
    ) -> ResizableDensePool<usize> {
        ResizableDensePool::builder()
            .capacity(capacity)
            .max_capacity(max_capacity)
            .factory(|| 0)
            .on_return(|value| *value = 0)
            .removal_order(removal_order)
            .build()
            .unwrap()
    }

    #[test]
    fn next_capacity_doubles_and_clamps() {
        assert_eq!(next_capacity(10, 1000), 20);
        assert_eq!(next_capacity(10, 15), 15);
        assert_eq!(next_capacity(0, 8), 1);
        assert_eq!(next_capacity(usize::MAX / 2 + 1, usize::MAX), usize::MAX);
    }

    #[test]
    fn request_beyond_initial_capacity_resizes() {
        let mut pool = counter_pool(10, 20, RemovalOrder::Unordered);

        let ids: Vec<_> = (0..15).map(|_| pool.request_id().unwrap()).collect();

        assert_eq!(pool.len(), 15);
        assert_eq!(pool.capacity(), 20);

        for &id in &ids {
            *pool.get_mut(id).unwrap() = id * 3;
        }
        for &id in &ids {
            assert_eq!(pool.get(id), Some(&(id * 3)));
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn request_beyond_max_capacity_fails_without_side_effects() {
        let mut pool = counter_pool(10, 20, RemovalOrder::Unordered);

        for _ in 0..20 {
            assert!(pool.request_id().is_some());
        }

        assert!(pool.is_full());
        assert_eq!(pool.request_id(), None);
        assert_eq!(pool.len(), 20);
        assert_eq!(pool.capacity(), 20);
    }

    #[test]
    fn zero_initial_capacity_grows_from_one() {
        let mut pool = counter_pool(0, 5, RemovalOrder::Unordered);

        _ = pool.request_id().unwrap();
        assert_eq!(pool.capacity(), 1);
        _ = pool.request_id().unwrap();
        assert_eq!(pool.capacity(), 2);
        _ = pool.request_id().unwrap();
        assert_eq!(pool.capacity(), 4);
        _ = pool.request_id().unwrap();
        _ = pool.request_id().unwrap();
        assert_eq!(pool.capacity(), 5);
        assert_eq!(pool.request_id(), None);
    }

    #[test]
    fn resize_after_churn_keeps_identifiers() {
        let mut pool = counter_pool(4, 100, RemovalOrder::Unordered);

        let ids: Vec<_> = (0..4).map(|_| pool.request_id().unwrap()).collect();
        for &id in &ids {
            *pool.get_mut(id).unwrap() = 100 + id;
        }
        pool.return_id(ids[0]);
        pool.return_id(ids[2]);
        let refilled: Vec<_> = (0..2).map(|_| pool.request_id().unwrap()).collect();

        // Pool is full again with a shuffled mapping; the next request resizes.
        let extra = pool.request_id().unwrap();

        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.get(ids[1]), Some(&101));
        assert_eq!(pool.get(ids[3]), Some(&103));
        for &id in &refilled {
            assert_eq!(pool.get(id), Some(&0));
        }
        assert_eq!(pool.get(extra), Some(&0));
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn explicit_resize_and_reserve() {
        let mut pool = counter_pool(2, 10, RemovalOrder::Unordered);

        pool.resize(1);
        assert_eq!(pool.capacity(), 2);

        pool.resize(6);
        assert_eq!(pool.capacity(), 6);

        pool.resize(50);
        assert_eq!(pool.capacity(), 10);

        let mut small = counter_pool(2, 10, RemovalOrder::Unordered);
        _ = small.request_id();
        small.reserve(4);
        assert_eq!(small.capacity(), 5);
        small.reserve(1_000);
        assert_eq!(small.capacity(), 10);
        #[cfg(debug_assertions)]
        small.integrity_check();
    }

    #[test]
    fn ordered_request_and_return_scenario() {
        let mut pool = counter_pool(10, 1000, RemovalOrder::Ordered);

        let ids: Vec<_> = (0..10).map(|_| pool.request_id().unwrap()).collect();
        for (index, value) in pool.live_mut().iter_mut().enumerate() {
            *value += index;
        }
        for &id in &ids {
            assert_eq!(pool.get(id), Some(&id));
        }

        for &id in &ids[5..8] {
            pool.return_id(id);
        }

        assert_eq!(pool.len(), 7);
        assert_eq!(pool.get(ids[9]), Some(&9));
        assert_eq!(pool.id_at(pool.len() - 1), ids[9]);
        assert_eq!(pool.live(), &[0, 1, 2, 3, 4, 8, 9]);

        let new_ids: Vec<_> = (0..3).map(|_| pool.request_id().unwrap()).collect();

        assert_eq!(pool.len(), 10);
        for &id in &new_ids {
            assert_eq!(pool.get(id), Some(&0));
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn ordered_too_many_grows() {
        let mut pool = counter_pool(10, 1000, RemovalOrder::Ordered);

        let ids: Vec<_> = (0..15).map(|_| pool.request_id().unwrap()).collect();
        for (index, value) in pool.live_mut().iter_mut().enumerate() {
            *value += index;
        }

        for &id in &ids {
            assert_eq!(pool.get(id), Some(&id));
        }
    }

    #[test]
    fn ordered_removal_preserves_request_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pool = counter_pool(4, 256, RemovalOrder::Ordered);

        // Each value is a monotonically increasing request sequence number.
        let mut live: Vec<usize> = Vec::new();
        let mut sequence = 1;

        for _ in 0..3_000 {
            if live.is_empty() || rng.random_bool(0.5) {
                if let Some(id) = pool.request_id() {
                    *pool.get_mut(id).unwrap() = sequence;
                    sequence += 1;
                    live.push(id);
                }
            } else {
                let victim = rng.random_range(0..live.len());
                let id = live.remove(victim);
                pool.return_id(id);
            }

            assert!(pool.live().is_sorted(), "live items fell out of order");
            for (index, &id) in live.iter().enumerate() {
                assert_eq!(pool.index_of(id), index);
            }
            #[cfg(debug_assertions)]
            pool.integrity_check();
        }
    }

    #[test]
    fn unordered_random_churn_with_resize() {
        let mut rng = StdRng::seed_from_u64(0xdecaf);
        let mut pool = counter_pool(1, 50, RemovalOrder::Unordered);
        let mut live: Vec<(usize, usize)> = Vec::new();
        let mut tag = 1;

        for _ in 0..3_000 {
            if live.is_empty() || rng.random_bool(0.6) {
                match pool.request_id() {
                    Some(id) => {
                        assert_eq!(pool.get(id), Some(&0));
                        *pool.get_mut(id).unwrap() = tag;
                        live.push((id, tag));
                        tag += 1;
                    }
                    None => {
                        assert_eq!(live.len(), 50);
                        assert_eq!(pool.capacity(), 50);
                    }
                }
            } else {
                let victim = rng.random_range(0..live.len());
                let (id, _) = live.swap_remove(victim);
                pool.return_id(id);
            }

            assert_eq!(pool.len(), live.len());
            for &(id, tag) in &live {
                assert_eq!(pool.get(id), Some(&tag));
            }
            #[cfg(debug_assertions)]
            pool.integrity_check();
        }
    }

    #[test]
    fn removal_order_can_change_at_runtime() {
        let mut pool = counter_pool(4, 4, RemovalOrder::Unordered);
        assert_eq!(pool.removal_order(), RemovalOrder::Unordered);

        for value in 1..=4 {
            let id = pool.request_id().unwrap();
            *pool.get_mut(id).unwrap() = value;
        }

        pool.set_removal_order(RemovalOrder::Ordered);
        pool.return_index(0);

        assert_eq!(pool.live(), &[2, 3, 4]);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn clear_resets_items_and_keeps_capacity() {
        let mut pool = counter_pool(2, 8, RemovalOrder::Ordered);
        for _ in 0..5 {
            let id = pool.request_id().unwrap();
            *pool.get_mut(id).unwrap() = 1;
        }

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.max_capacity(), 8);
        assert!(pool.iter().all(|(_, value)| *value == 0));
        assert_eq!((&pool).into_iter().count(), 0);
    }
}
