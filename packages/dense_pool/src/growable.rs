use tracing::trace;

use crate::{DenseSlots, GrowableDensePoolBuilder, Iter, IterMut, Poolable, RemovalOrder};

/// A dense object pool of unbounded size that grows by one item whenever it runs out of free
/// slots.
///
/// Behaves like [`DensePool`][crate::DensePool] except that requests never fail: when every slot
/// is live, the pool creates one more item with the factory callback and hands that out. There
/// is no geometric pre-growth, so the pool only ever holds as many items as were live at the
/// same time at its peak.
///
/// The pool never shrinks. [`clear()`][Self::clear] frees every slot but keeps the items for
/// reuse.
///
/// # Example
///
/// ```rust
/// use dense_pool::GrowableDensePool;
///
/// let mut pool = GrowableDensePool::builder()
///     .factory(Vec::<u8>::new)
///     .on_return(Vec::clear)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.capacity(), 0);
///
/// let id = pool.request_id();
/// pool.get_mut(id).unwrap().push(42);
///
/// assert_eq!(pool.capacity(), 1);
/// assert_eq!(pool.get(id), Some(&vec![42]));
/// ```
///
/// # Thread safety
///
/// The pool is meant for a single owner that performs requests and returns serially. It is
/// neither [`Send`] nor [`Sync`] because it stores arbitrary client callbacks.
#[derive(Debug)]
pub struct GrowableDensePool<T> {
    slots: DenseSlots<T>,
}

impl<T> GrowableDensePool<T> {
    /// Creates a builder for configuring and constructing a [`GrowableDensePool`].
    ///
    /// A factory callback is mandatory; all other settings are optional.
    #[inline]
    pub fn builder() -> GrowableDensePoolBuilder<T> {
        GrowableDensePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn from_slots(slots: DenseSlots<T>) -> Self {
        Self { slots }
    }

    /// Claims a free slot and returns the identifier of the item in it, creating a new item if
    /// every existing slot is live.
    #[must_use]
    pub fn request_id(&mut self) -> usize {
        if self.slots.is_full() {
            // Capacity is bounded by memory, so this cannot overflow.
            let new_capacity = self.slots.capacity().wrapping_add(1);

            trace!(new_capacity, "growing dense pool by one item");
            self.slots.grow_to(new_capacity);
        }

        self.slots
            .claim()
            .expect("we just ensured that there is a free slot")
    }

    /// Returns the item with the given identifier to the pool.
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
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity of the pool. In debug builds, also panics if
    /// `index` is not within the live range.
    #[inline]
    pub fn return_index(&mut self, index: usize) {
        self.slots.release_index(index, RemovalOrder::Unordered);
    }

    /// Returns every live item to the pool, calling `on_return` on each of them.
    ///
    /// The capacity is retained.
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

    /// The number of items the pool holds, live or free.
    ///
    /// Requests beyond this number grow the pool.
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

impl<T: Poolable> GrowableDensePool<T> {
    /// Claims a free slot (growing the pool if needed) and returns the item in it, stamped
    /// with its identifier.
    pub fn request(&mut self) -> &mut T {
        let id = self.request_id();

        let item = self
            .slots
            .get_mut(id)
            .expect("an identifier we just claimed must be live");
        item.set_pool_index(id);

        item
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

impl<'a, T> IntoIterator for &'a GrowableDensePool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.live().iter()
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Default)]
    struct Poolee {
        pool_index: usize,
        value: u32,
    }

    impl Poolable for Poolee {
        fn pool_index(&self) -> usize {
            self.pool_index
        }

        fn set_pool_index(&mut self, index: usize) {
            self.pool_index = index;
        }
    }

    fn counter_pool(capacity: usize) -> GrowableDensePool<usize> {
        GrowableDensePool::builder()
            .capacity(capacity)
            .factory(|| 0)
            .on_return(|value| *value = 0)
            .build()
            .unwrap()
    }

    #[test]
    fn request_beyond_capacity_grows_by_one() {
        let mut pool = counter_pool(10);

        let ids: Vec<_> = (0..15).map(|_| pool.request_id()).collect();

        assert_eq!(pool.len(), 15);
        assert_eq!(pool.capacity(), 15);

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
    fn new_slots_are_identity_mapped_after_churn() {
        let mut pool = counter_pool(2);
        let a = pool.request_id();
        let b = pool.request_id();
        pool.return_id(a);
        let a2 = pool.request_id();
        assert_eq!(a2, a);

        let c = pool.request_id();

        assert_eq!(c, 2);
        assert_eq!(pool.index_of(c), 2);
        assert_eq!(pool.index_of(b), 0);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn factory_called_only_on_growth() {
        let created = Rc::new(Cell::new(0));
        let created_clone = Rc::clone(&created);

        let mut pool = GrowableDensePool::builder()
            .capacity(2)
            .factory(move || {
                created_clone.set(created_clone.get() + 1);
                0_u8
            })
            .build()
            .unwrap();

        assert_eq!(created.get(), 2);

        let a = pool.request_id();
        pool.return_id(a);
        _ = pool.request_id();
        _ = pool.request_id();
        assert_eq!(created.get(), 2);

        _ = pool.request_id();
        assert_eq!(created.get(), 3);
    }

    #[test]
    fn request_and_return_scenario() {
        let mut pool = counter_pool(10);

        let ids: Vec<_> = (0..10).map(|_| pool.request_id()).collect();
        for &id in &ids {
            *pool.get_mut(id).unwrap() = id;
        }

        for &id in &ids[5..8] {
            pool.return_id(id);
        }

        assert_eq!(pool.len(), 7);
        assert_eq!(pool.get(ids[9]), Some(&9));

        let new_ids: Vec<_> = (0..3).map(|_| pool.request_id()).collect();

        assert_eq!(pool.len(), 10);
        assert_eq!(pool.capacity(), 10);
        for &id in &new_ids {
            assert_eq!(pool.get(id), Some(&0));
        }
    }

    #[test]
    fn request_and_return_element() {
        let mut pool = GrowableDensePool::builder()
            .factory(Poolee::default)
            .on_return(|poolee: &mut Poolee| poolee.value = 0)
            .build()
            .unwrap();

        let item = pool.request();
        item.value = 7;
        let id = item.pool_index();

        let other = pool.request().pool_index();
        assert_ne!(id, other);
        assert_eq!(pool.get(id).unwrap().value, 7);

        let handle = Poolee {
            pool_index: id,
            value: 0,
        };
        pool.return_element(&handle);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut pool = counter_pool(0);
        for _ in 0..5 {
            let id = pool.request_id();
            *pool.get_mut(id).unwrap() = 9;
        }

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 5);
        assert!((&pool).into_iter().next().is_none());

        let id = pool.request_id();
        assert_eq!(pool.get(id), Some(&0));
        assert_eq!(pool.capacity(), 5);
    }

    #[test]
    fn return_index_and_tables() {
        let mut pool = counter_pool(3);
        for _ in 0..3 {
            _ = pool.request_id();
        }

        pool.return_index(0);

        assert_eq!(pool.indices_to_ids(), &[2, 1, 0]);
        assert_eq!(pool.ids_to_indices(), &[2, 1, 0]);
        assert_eq!(pool.id_at(0), 2);
        assert_eq!(pool.iter().count(), 2);
        for (id, value) in pool.iter_mut() {
            *value = id;
        }
        assert_eq!(pool.live(), &[2, 1]);
    }
}
