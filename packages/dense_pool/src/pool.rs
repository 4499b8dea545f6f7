use tracing::trace;

use crate::{DensePoolBuilder, DenseSlots, Iter, IterMut, Poolable, RemovalOrder};

/// A fixed-capacity object pool that hands out stable identifiers while keeping its live items
/// densely packed.
///
/// All items are created up front by the factory callback supplied to the
/// [builder][Self::builder]. Requesting an item claims the next free slot and returns an
/// identifier; returning the identifier frees the slot again. The identifier keeps resolving to
/// the same item for as long as it is live, even though the pool moves items around in storage
/// to keep the live ones contiguous.
///
/// Because the live items always occupy a contiguous prefix of storage, they can be iterated
/// over as a plain slice via [`live()`][Self::live] or [`live_mut()`][Self::live_mut].
///
/// # Exhaustion
///
/// The pool never grows. Once every slot is live, [`request_id()`][Self::request_id] returns
/// `None` and leaves the pool unchanged. Use [`GrowableDensePool`][crate::GrowableDensePool] or
/// [`ResizableDensePool`][crate::ResizableDensePool] if the pool needs to grow on demand.
///
/// # Contract
///
/// Returning an identifier that is not live (including returning the same identifier twice)
/// is a caller error. It is detected by assertions in debug builds only; in release builds
/// it corrupts the logical state of the pool.
///
/// # Example
///
/// ```rust
/// use dense_pool::DensePool;
///
/// let mut pool = DensePool::builder()
///     .capacity(3)
///     .factory(|| 0_u64)
///     .on_return(|value| *value = 0)
///     .build()
///     .unwrap();
///
/// let a = pool.request_id().unwrap();
/// let b = pool.request_id().unwrap();
/// *pool.get_mut(a).unwrap() = 10;
/// *pool.get_mut(b).unwrap() = 20;
///
/// pool.return_id(a);
///
/// // The remaining item is still reachable through its identifier.
/// assert_eq!(pool.get(b), Some(&20));
/// assert_eq!(pool.live(), &[20]);
/// ```
///
/// # Thread safety
///
/// The pool is meant for a single owner that performs requests and returns serially. It is
/// neither [`Send`] nor [`Sync`] because it stores arbitrary client callbacks.
#[derive(Debug)]
pub struct DensePool<T> {
    slots: DenseSlots<T>,
}

impl<T> DensePool<T> {
    /// Creates a builder for configuring and constructing a [`DensePool`].
    ///
    /// A factory callback is mandatory; all other settings are optional.
    #[inline]
    pub fn builder() -> DensePoolBuilder<T> {
        DensePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn from_slots(slots: DenseSlots<T>) -> Self {
        Self { slots }
    }

    /// Claims a free slot and returns the identifier of the item in it.
    ///
    /// Returns `None` if every slot is already live.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dense_pool::DensePool;
    ///
    /// let mut pool = DensePool::builder()
    ///     .capacity(1)
    ///     .factory(String::new)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(pool.request_id().is_some());
    /// assert!(pool.request_id().is_none());
    /// assert_eq!(pool.len(), 1);
    /// ```
    #[must_use]
    #[inline]
    pub fn request_id(&mut self) -> Option<usize> {
        let id = self.slots.claim();

        if id.is_none() {
            trace!(capacity = self.slots.capacity(), "dense pool exhausted");
        }

        id
    }

    /// Returns the item with the given identifier to the pool.
    ///
    /// The `on_return` callback is called on the item, after which the slot may be handed out
    /// again. The identifier must not be used until it is handed out again.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never issued by this pool. In debug builds, also panics if `id` is
    /// not currently live.
    #[inline]
    pub fn return_id(&mut self, id: usize) {
        self.slots.release_id(id, RemovalOrder::Unordered);
    }

    /// Returns the item at the given storage index to the pool.
    ///
    /// This is equivalent to `return_id(self.id_at(index))` without the extra lookup.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity of the pool. In debug builds, also panics if
    /// `index` is not within the live range.
    #[inline]
    pub fn return_index(&mut self, index: usize) {
        self.slots.release_index(index, RemovalOrder::Unordered);
    }

    /// Returns every live item to the pool, calling `on_return` on each of them.
    pub fn clear(&mut self) {
        self.slots.clear();
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

    /// Whether every slot is live, meaning the next request will fail.
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// The total number of slots, live or free.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
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
    /// Use [`indices_to_ids()`][Self::indices_to_ids] to find the identifier of each item.
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
    #[cfg_attr(not(test), expect(dead_code, reason = "only exercised by tests"))]
    pub(crate) fn integrity_check(&self) {
        self.slots.integrity_check();
    }
}

impl<T: Poolable> DensePool<T> {
    /// Claims a free slot and returns the item in it, stamped with its identifier.
    ///
    /// Returns `None` if every slot is already live.
    ///
    /// The identifier can later be read back through [`Poolable::pool_index()`] and used
    /// with [`return_id()`][Self::return_id] or [`return_element()`][Self::return_element].
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
    /// Any [`Poolable`] value that reports the identifier works, which allows returning an item
    /// through a detached copy or a lightweight handle.
    ///
    /// # Panics
    ///
    /// Same as [`return_id()`][Self::return_id].
    pub fn return_element<P: Poolable + ?Sized>(&mut self, element: &P) {
        self.return_id(element.pool_index());
    }
}

impl<'a, T> IntoIterator for &'a DensePool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.live().iter()
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    clippy::cast_possible_truncation,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use static_assertions::assert_not_impl_any;

    use super::*;

    #[derive(Debug, Default)]
    struct Tagged {
        pool_index: usize,
        x: f32,
        health: i32,
    }

    impl Tagged {
        fn clear(&mut self) {
            self.x = 0.0;
            self.health = 100;
        }
    }

    impl Poolable for Tagged {
        fn pool_index(&self) -> usize {
            self.pool_index
        }

        fn set_pool_index(&mut self, index: usize) {
            self.pool_index = index;
        }
    }

    fn tagged_pool(capacity: usize) -> DensePool<Tagged> {
        DensePool::builder()
            .capacity(capacity)
            .factory(|| Tagged {
                health: 100,
                ..Tagged::default()
            })
            .on_return(Tagged::clear)
            .build()
            .unwrap()
    }

    fn counter_pool(capacity: usize) -> DensePool<usize> {
        DensePool::builder()
            .capacity(capacity)
            .factory(|| 0)
            .on_return(|value| *value = 0)
            .build()
            .unwrap()
    }

    assert_not_impl_any!(DensePool<u32>: Send, Sync);

    #[test]
    fn request_ten_and_read_back() {
        let mut pool = counter_pool(10);

        let ids: Vec<_> = (0..10).map(|_| pool.request_id().unwrap()).collect();

        for (index, value) in pool.live_mut().iter_mut().enumerate() {
            *value += index;
        }

        for &id in &ids {
            assert_eq!(pool.get(id), Some(&id));
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn request_too_many_returns_none() {
        let mut pool = counter_pool(10);

        let ids: Vec<_> = (0..15).map(|_| pool.request_id()).collect();

        for (i, id) in ids.iter().enumerate() {
            assert_eq!(id.is_some(), i < 10);
        }

        assert_eq!(pool.len(), 10);
        assert!(pool.is_full());
    }

    #[test]
    fn request_and_return_scenario() {
        let mut pool = counter_pool(10);

        let ids: Vec<_> = (0..10).map(|_| pool.request_id().unwrap()).collect();
        for &id in &ids {
            *pool.get_mut(id).unwrap() = id;
        }

        for &id in &ids[5..8] {
            pool.return_id(id);
        }

        assert_eq!(pool.len(), 7);
        assert_eq!(pool.get(ids[9]), Some(&9));
        #[cfg(debug_assertions)]
        pool.integrity_check();

        let new_ids: Vec<_> = (0..3).map(|_| pool.request_id().unwrap()).collect();

        assert_eq!(pool.len(), 10);
        for &id in &new_ids {
            assert_eq!(pool.get(id), Some(&0));
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn request_stamps_identifier() {
        let mut pool = tagged_pool(4);

        let first = pool.request().unwrap();
        first.x = 1.5;
        let first_id = first.pool_index();

        let second_id = pool.request().unwrap().pool_index();

        assert_ne!(first_id, second_id);
        assert_eq!(pool.get(first_id).unwrap().pool_index(), first_id);
        assert!((pool.get(first_id).unwrap().x - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn return_element_uses_reported_identifier() {
        let mut pool = tagged_pool(3);

        let a = pool.request().unwrap().pool_index();
        let b = pool.request().unwrap().pool_index();
        pool.get_mut(a).unwrap().health = 5;

        let detached = Tagged {
            pool_index: a,
            ..Tagged::default()
        };
        pool.return_element(&detached);

        assert_eq!(pool.len(), 1);
        assert!(pool.get(a).is_none());
        assert!(pool.get(b).is_some());

        // The returned slot comes back cleared.
        let again = pool.request().unwrap();
        assert_eq!(again.pool_index(), a);
        assert_eq!(again.health, 100);
    }

    #[test]
    fn request_on_full_pool_returns_none() {
        let mut pool = tagged_pool(1);

        assert!(pool.request().is_some());
        assert!(pool.request().is_none());
    }

    #[test]
    fn return_index_frees_that_slot() {
        let mut pool = counter_pool(4);
        for _ in 0..4 {
            let id = pool.request_id().unwrap();
            *pool.get_mut(id).unwrap() = id + 1;
        }

        let id_at_one = pool.id_at(1);
        pool.return_index(1);

        assert!(pool.get(id_at_one).is_none());
        assert_eq!(pool.live(), &[1, 4, 3]);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn clear_returns_every_live_item() {
        let mut pool = counter_pool(5);
        for _ in 0..3 {
            let id = pool.request_id().unwrap();
            *pool.get_mut(id).unwrap() = 42;
        }

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 5);
        for _ in 0..5 {
            let id = pool.request_id().unwrap();
            assert_eq!(pool.get(id), Some(&0));
        }
    }

    #[test]
    fn zero_capacity_pool_is_always_exhausted() {
        let mut pool = counter_pool(0);

        assert!(pool.is_full());
        assert_eq!(pool.request_id(), None);
    }

    #[test]
    fn tables_are_exposed_read_only() {
        let mut pool = counter_pool(3);
        let a = pool.request_id().unwrap();
        let _b = pool.request_id().unwrap();
        pool.return_id(a);

        assert_eq!(pool.ids_to_indices(), &[1, 0, 2]);
        assert_eq!(pool.indices_to_ids(), &[1, 0, 2]);
        assert_eq!(pool.index_of(1), 0);
        assert_eq!(pool.id_at(1), 0);
    }

    #[test]
    fn iteration_covers_live_items_only() {
        let mut pool = counter_pool(5);
        for _ in 0..3 {
            let id = pool.request_id().unwrap();
            *pool.get_mut(id).unwrap() = id * 10;
        }

        let sum: usize = (&pool).into_iter().sum();
        assert_eq!(sum, 30);

        for (id, value) in pool.iter_mut() {
            *value = id;
        }
        for (id, value) in pool.iter() {
            assert_eq!(id, *value);
        }
    }

    #[test]
    fn random_churn_keeps_invariants_and_tags() {
        const CAPACITY: usize = 64;

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut pool = counter_pool(CAPACITY);
        let mut live: Vec<(usize, usize)> = Vec::new();
        let mut next_tag = 1;

        for _ in 0..5_000 {
            if live.is_empty() || (live.len() < CAPACITY && rng.random_bool(0.55)) {
                let id = pool.request_id().unwrap();
                assert_eq!(pool.get(id), Some(&0), "reused slot was not cleared");
                *pool.get_mut(id).unwrap() = next_tag;
                live.push((id, next_tag));
                next_tag += 1;
            } else {
                let victim = rng.random_range(0..live.len());
                let (id, _) = live.swap_remove(victim);
                pool.return_id(id);
            }

            assert_eq!(pool.len(), live.len());
            for &(id, tag) in &live {
                assert_eq!(pool.get(id), Some(&tag));
                assert!(pool.index_of(id) < pool.len());
            }
            #[cfg(debug_assertions)]
            pool.integrity_check();
        }
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn return_not_live_id_panics_in_debug() {
        let mut pool = counter_pool(2);
        let a = pool.request_id().unwrap();
        pool.return_id(a);
        pool.return_id(a);
    }

    #[test]
    #[should_panic]
    fn return_never_issued_id_panics() {
        let mut pool = counter_pool(2);
        _ = pool.request_id();
        pool.return_id(17);
    }
}
