use std::fmt;
use std::iter::{Copied, Zip};
use std::slice;

use crate::callbacks::{Factory, Reset};
use crate::{IdMap, RemovalOrder};

/// Packed item storage shared by the dense pools that own their items by value and relocate
/// them by swapping.
///
/// Items at indices `0..len` are live, items at `len..capacity` are pre-constructed but free.
/// The next request always claims index `len`, and every return restores packing by pulling
/// an item from the new boundary into the hole. The pools built on top of this only decide
/// when and by how much the storage grows.
pub(crate) struct DenseSlots<T> {
    values: Vec<T>,
    ids: IdMap,

    /// Number of live items. All of them are stored at the front of `values`.
    len: usize,

    factory: Factory<T>,
    on_return: Reset<T>,
}

impl<T> DenseSlots<T> {
    #[must_use]
    pub(crate) fn new(capacity: usize, mut factory: Factory<T>, on_return: Reset<T>) -> Self {
        let values = (0..capacity).map(|_| factory()).collect();

        Self {
            values,
            ids: IdMap::identity(capacity),
            len: 0,
            factory,
            on_return,
        }
    }

    #[must_use]
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.values.len()
    }

    #[must_use]
    pub(crate) fn ids(&self) -> &IdMap {
        &self.ids
    }

    /// Claims the first free slot and returns its identifier, or `None` if every slot is live.
    ///
    /// Never grows the storage; growth policy belongs to the owning pool.
    #[must_use]
    #[inline]
    pub(crate) fn claim(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }

        let id = self.ids.id_at(self.len);

        // Cannot overflow because len < capacity.
        self.len = self.len.wrapping_add(1);

        Some(id)
    }

    /// Extends the storage to `new_capacity`, creating the new items with the factory.
    ///
    /// The new identifiers are mapped onto the new indices one-to-one.
    ///
    /// The backing buffers grow geometrically, so growing one item at a time costs amortized
    /// O(1) per item.
    pub(crate) fn grow_to(&mut self, new_capacity: usize) {
        let old_capacity = self.capacity();
        debug_assert!(new_capacity >= old_capacity, "dense slots never shrink");

        self.values
            .reserve(new_capacity.saturating_sub(old_capacity));

        for _ in old_capacity..new_capacity {
            self.values.push((self.factory)());
        }

        self.ids.grow_to(new_capacity);
    }

    /// Returns the live item with the given identifier to the pool.
    ///
    /// The caller must guarantee that `id` is live. This is only checked in debug builds.
    pub(crate) fn release_id(&mut self, id: usize, order: RemovalOrder) {
        let index = self.ids.index_of(id);
        self.release_index(index, order);
    }

    /// Returns the live item at the given storage index to the pool.
    ///
    /// The caller must guarantee that `index < len`. This is only checked in debug builds.
    #[expect(
        clippy::indexing_slicing,
        reason = "the caller guarantees the index is live, and live indices are within capacity"
    )]
    pub(crate) fn release_index(&mut self, index: usize, order: RemovalOrder) {
        debug_assert!(
            index < self.len,
            "returned storage index {index} is not live (live count {})",
            self.len
        );

        // The item at the new boundary is the one we pull into the hole.
        self.len = self.len.wrapping_sub(1);
        let last = self.len;

        (self.on_return)(&mut self.values[index]);

        if index == last {
            // The returned item was already the last live one, nothing needs to move.
            return;
        }

        match order {
            RemovalOrder::Unordered => {
                self.values.swap(index, last);
                self.ids.swap_indices(index, last);
            }
            RemovalOrder::Ordered => {
                self.values[index..=last].rotate_left(1);
                self.ids.rotate_to_back(index, last);
            }
        }
    }

    /// Returns every live item to the pool.
    pub(crate) fn clear(&mut self) {
        let live = self.values.get_mut(..self.len).unwrap_or_default();

        for item in live {
            (self.on_return)(item);
        }

        self.len = 0;

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    #[must_use]
    #[inline]
    pub(crate) fn get(&self, id: usize) -> Option<&T> {
        let index = self.live_index_of(id)?;
        self.values.get(index)
    }

    #[must_use]
    #[inline]
    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        let index = self.live_index_of(id)?;
        self.values.get_mut(index)
    }

    /// The storage index of `id`, if `id` is live.
    #[must_use]
    #[inline]
    pub(crate) fn live_index_of(&self, id: usize) -> Option<usize> {
        let index = *self.ids.ids_to_indices().get(id)?;
        (index < self.len).then_some(index)
    }

    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "len never exceeds the number of stored values"
    )]
    pub(crate) fn live(&self) -> &[T] {
        &self.values[..self.len]
    }

    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "len never exceeds the number of stored values"
    )]
    pub(crate) fn live_mut(&mut self) -> &mut [T] {
        &mut self.values[..self.len]
    }

    /// Iterates over `(id, item)` pairs of the live items in storage order.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        #[expect(
            clippy::indexing_slicing,
            reason = "len never exceeds the capacity of the id map"
        )]
        let ids = &self.ids.indices_to_ids()[..self.len];

        Iter {
            inner: ids.iter().copied().zip(self.live()),
        }
    }

    /// Iterates over `(id, item)` pairs of the live items in storage order, with exclusive access
    /// to the items.
    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, T> {
        let len = self.len;

        #[expect(
            clippy::indexing_slicing,
            reason = "len never exceeds the capacity of the id map or the number of values"
        )]
        let (ids, values) = (
            &self.ids.indices_to_ids()[..len],
            &mut self.values[..len],
        );

        IterMut {
            inner: ids.iter().copied().zip(values.iter_mut()),
        }
    }

    /// Verifies the bijection between identifiers and indices, as well as the packing of
    /// live items.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        assert!(self.len <= self.values.len());
        assert_eq!(self.ids.len(), self.values.len());
        self.ids.integrity_check();
    }
}

impl<T: fmt::Debug> fmt::Debug for DenseSlots<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseSlots")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("live", &self.live())
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}

/// Iterator over `(id, &item)` pairs of the live items of a dense pool, in storage order.
#[derive(Debug)]
pub struct Iter<'a, T> {
    inner: Zip<Copied<slice::Iter<'a, usize>>, slice::Iter<'a, T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (usize, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Iterator over `(id, &mut item)` pairs of the live items of a dense pool, in storage order.
#[derive(Debug)]
pub struct IterMut<'a, T> {
    inner: Zip<Copied<slice::Iter<'a, usize>>, slice::IterMut<'a, T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (usize, &'a mut T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::callbacks::no_reset;

    fn slots(capacity: usize) -> DenseSlots<u32> {
        DenseSlots::new(capacity, Box::new(|| 0), Box::new(|item| *item = 0))
    }

    #[test]
    fn new_slots_are_empty_and_prebuilt() {
        let created = Rc::new(Cell::new(0));
        let created_clone = Rc::clone(&created);

        let slots: DenseSlots<u32> = DenseSlots::new(
            4,
            Box::new(move || {
                created_clone.set(created_clone.get() + 1);
                0
            }),
            no_reset(),
        );

        assert_eq!(slots.len(), 0);
        assert_eq!(slots.capacity(), 4);
        assert_eq!(created.get(), 4);
        #[cfg(debug_assertions)]
        slots.integrity_check();
    }

    #[test]
    fn claim_hands_out_boundary_ids_until_full() {
        let mut slots = slots(3);

        assert_eq!(slots.claim(), Some(0));
        assert_eq!(slots.claim(), Some(1));
        assert_eq!(slots.claim(), Some(2));
        assert!(slots.is_full());
        assert_eq!(slots.claim(), None);
        assert_eq!(slots.len(), 3);
    }

    #[test]
    fn unordered_release_pulls_last_into_hole() {
        let mut slots = slots(6);
        for tag in 0..6 {
            let id = slots.claim().unwrap();
            *slots.get_mut(id).unwrap() = tag + 10;
        }

        slots.release_id(2, RemovalOrder::Unordered);

        assert_eq!(slots.live(), &[10, 11, 15, 13, 14]);
        assert_eq!(slots.ids().ids_to_indices(), &[0, 1, 5, 3, 4, 2]);
        assert_eq!(slots.get(5), Some(&15));
        assert_eq!(slots.get(2), None);
        #[cfg(debug_assertions)]
        slots.integrity_check();

        // The returned identifier is the next one handed out, and it comes back cleared.
        assert_eq!(slots.claim(), Some(2));
        assert_eq!(slots.get(2), Some(&0));
    }

    #[test]
    fn ordered_release_shifts_survivors() {
        let mut slots = slots(6);
        for tag in 0..6 {
            let id = slots.claim().unwrap();
            *slots.get_mut(id).unwrap() = tag + 10;
        }

        slots.release_id(1, RemovalOrder::Ordered);

        assert_eq!(slots.live(), &[10, 12, 13, 14, 15]);
        assert_eq!(slots.ids().indices_to_ids(), &[0, 2, 3, 4, 5, 1]);
        assert_eq!(slots.get(5), Some(&15));
        #[cfg(debug_assertions)]
        slots.integrity_check();
    }

    #[test]
    fn release_last_moves_nothing() {
        let mut slots = slots(3);
        for _ in 0..3 {
            _ = slots.claim();
        }

        slots.release_index(2, RemovalOrder::Unordered);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots.ids(), &IdMap::identity(3));
    }

    #[test]
    fn release_calls_on_return_once() {
        let returned = Rc::new(Cell::new(0));
        let returned_clone = Rc::clone(&returned);

        let mut slots: DenseSlots<u32> = DenseSlots::new(
            2,
            Box::new(|| 0),
            Box::new(move |_| returned_clone.set(returned_clone.get() + 1)),
        );

        let a = slots.claim().unwrap();
        let _b = slots.claim().unwrap();
        slots.release_id(a, RemovalOrder::Unordered);

        assert_eq!(returned.get(), 1);

        slots.clear();
        assert_eq!(returned.get(), 2);
        assert_eq!(slots.len(), 0);
    }

    #[test]
    fn grow_keeps_live_ids_and_adds_identity_slots() {
        let mut slots = slots(2);
        let a = slots.claim().unwrap();
        let b = slots.claim().unwrap();
        *slots.get_mut(a).unwrap() = 7;
        *slots.get_mut(b).unwrap() = 8;
        slots.release_id(a, RemovalOrder::Unordered);
        let a2 = slots.claim().unwrap();

        slots.grow_to(5);

        assert_eq!(slots.capacity(), 5);
        assert_eq!(slots.get(b), Some(&8));
        assert_eq!(slots.get(a2), Some(&0));
        assert_eq!(slots.claim(), Some(2));
        #[cfg(debug_assertions)]
        slots.integrity_check();
    }

    #[test]
    fn grow_by_one_reallocates_geometrically() {
        let mut slots = slots(0);
        let mut reallocations = 0;
        let mut buffer_capacity = slots.values.capacity();

        for capacity in 1..=1_000 {
            slots.grow_to(capacity);
            _ = slots.claim();

            if slots.values.capacity() != buffer_capacity {
                reallocations += 1;
                buffer_capacity = slots.values.capacity();
            }
        }

        assert_eq!(slots.capacity(), 1_000);
        assert_eq!(slots.len(), 1_000);
        assert!(buffer_capacity >= 1_000);
        // Doubling from an empty buffer needs about log2(1000) steps.
        assert!(reallocations <= 12, "{reallocations} reallocations");
        #[cfg(debug_assertions)]
        slots.integrity_check();
    }

    #[test]
    fn iter_pairs_ids_with_items() {
        let mut slots = slots(4);
        for tag in 0..4 {
            let id = slots.claim().unwrap();
            *slots.get_mut(id).unwrap() = tag * 100;
        }
        slots.release_id(0, RemovalOrder::Unordered);

        let pairs: Vec<_> = slots.iter().map(|(id, item)| (id, *item)).collect();
        assert_eq!(pairs, vec![(3, 300), (1, 100), (2, 200)]);
        assert_eq!(slots.iter().len(), 3);

        for (id, item) in slots.iter_mut() {
            *item = u32::try_from(id).unwrap();
        }
        assert_eq!(slots.live(), &[3, 1, 2]);
    }

    #[test]
    fn get_rejects_free_and_unknown_ids() {
        let mut slots = slots(2);
        _ = slots.claim();

        assert!(slots.get(0).is_some());
        assert!(slots.get(1).is_none());
        assert!(slots.get(99).is_none());
        assert_eq!(slots.live_index_of(99), None);
    }
}
