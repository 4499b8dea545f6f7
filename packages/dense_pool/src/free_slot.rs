use std::fmt;
use std::iter::{Enumerate, Zip};
use std::slice;

use tracing::trace;

use crate::callbacks::{Factory, Reset};
use crate::{FreeSlotPoolBuilder, GrowableFreeSlotPoolBuilder, Poolable};

/// Slot storage shared by the fixed and growable free-slot pools.
///
/// Items never move. A parallel vector of flags marks which slots are in use, and requests scan
/// for a free slot starting at a cursor that trails the most recent claim, wrapping around the
/// end of storage.
struct FreeSlots<T> {
    values: Vec<T>,
    in_use: Vec<bool>,
    len: usize,

    /// Slot at which the next scan for a free slot starts. Always 0 or a valid slot index.
    scan_cursor: usize,

    factory: Factory<T>,
    on_return: Reset<T>,
}

impl<T: Poolable> FreeSlots<T> {
    fn new(capacity: usize, mut factory: Factory<T>, on_return: Reset<T>) -> Self {
        let values = (0..capacity).map(|_| factory()).collect();

        Self {
            values,
            in_use: vec![false; capacity],
            len: 0,
            scan_cursor: 0,
            factory,
            on_return,
        }
    }

    /// Finds the first free slot at or after the cursor, wrapping around to the start.
    fn find_free(&self) -> Option<usize> {
        // The cursor is 0 for empty storage, otherwise always a valid slot index.
        let (before, after) = self.in_use.split_at(self.scan_cursor);

        after
            .iter()
            .position(|in_use| !in_use)
            .map(|offset| self.scan_cursor.wrapping_add(offset))
            .or_else(|| before.iter().position(|in_use| !in_use))
    }

    /// Marks the given free slot as in use and stamps its index into the item.
    #[expect(
        clippy::indexing_slicing,
        reason = "callers only pass slot indices that exist in storage"
    )]
    fn occupy(&mut self, slot: usize) -> &mut T {
        debug_assert!(!self.in_use[slot]);

        self.in_use[slot] = true;

        // Cannot overflow because len counts in-use slots and slot exists.
        self.len = self.len.wrapping_add(1);

        let next = slot.wrapping_add(1);
        self.scan_cursor = if next >= self.values.len() { 0 } else { next };

        let item = &mut self.values[slot];
        item.set_pool_index(slot);
        item
    }

    fn claim(&mut self) -> Option<&mut T> {
        let slot = self.find_free()?;
        Some(self.occupy(slot))
    }

    /// Appends a new in-use slot built by the factory. The cursor does not move.
    fn claim_new(&mut self) -> &mut T {
        let slot = self.values.len();

        let mut item = (self.factory)();
        item.set_pool_index(slot);

        self.values.push(item);
        self.in_use.push(true);

        // Cannot overflow because len never exceeds the number of slots.
        self.len = self.len.wrapping_add(1);

        trace!(new_capacity = self.values.len(), "free-slot pool appended a slot");

        let Some(item) = self.values.last_mut() else {
            unreachable!("we just pushed an item");
        };
        item
    }

    fn release(&mut self, slot: usize) {
        let Some(in_use) = self.in_use.get_mut(slot) else {
            panic!(
                "slot {slot} is outside the capacity {} of the pool",
                self.values.len()
            );
        };

        debug_assert!(*in_use, "returned slot {slot} is not in use");

        *in_use = false;
        self.len = self.len.wrapping_sub(1);

        #[expect(
            clippy::indexing_slicing,
            reason = "in_use and values always have the same length"
        )]
        let value = &mut self.values[slot];

        (self.on_return)(value);
    }

    fn clear(&mut self) {
        for (value, in_use) in self.values.iter_mut().zip(self.in_use.iter_mut()) {
            if *in_use {
                *in_use = false;
                (self.on_return)(value);
            }
        }

        self.len = 0;
        self.scan_cursor = 0;

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    fn is_in_use(&self, slot: usize) -> bool {
        self.in_use.get(slot).copied().unwrap_or(false)
    }

    fn get(&self, slot: usize) -> Option<&T> {
        if self.is_in_use(slot) {
            self.values.get(slot)
        } else {
            None
        }
    }

    fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        if self.is_in_use(slot) {
            self.values.get_mut(slot)
        } else {
            None
        }
    }

    fn iter(&self) -> SlotIter<'_, T> {
        SlotIter {
            inner: self.in_use.iter().zip(&self.values).enumerate(),
            remaining: self.len,
        }
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        assert_eq!(self.values.len(), self.in_use.len());
        assert_eq!(
            self.in_use.iter().filter(|in_use| **in_use).count(),
            self.len
        );
        assert!(self.scan_cursor == 0 || self.scan_cursor < self.values.len());

        for (slot, (value, in_use)) in self.values.iter().zip(&self.in_use).enumerate() {
            if *in_use {
                assert_eq!(value.pool_index(), slot);
            }
        }
    }
}

impl<T> fmt::Debug for FreeSlots<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FreeSlots")
            .field("len", &self.len)
            .field("capacity", &self.values.len())
            .field("scan_cursor", &self.scan_cursor)
            .field("in_use", &self.in_use)
            .finish_non_exhaustive()
    }
}

/// Iterator over `(slot, &item)` pairs of the in-use items of a free-slot pool, in slot order.
#[derive(Debug)]
pub struct SlotIter<'a, T> {
    inner: Enumerate<Zip<slice::Iter<'a, bool>, slice::Iter<'a, T>>>,

    /// In-use items not yet yielded, so iteration stops without scanning trailing free slots.
    remaining: usize,
}

impl<'a, T> Iterator for SlotIter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let (slot, (_, value)) = self.inner.find(|(_, (in_use, _))| **in_use)?;
        self.remaining = self.remaining.wrapping_sub(1);
        Some((slot, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for SlotIter<'_, T> {}

/// A fixed-capacity pool that keeps its items in place and tracks free slots with flags.
///
/// Unlike the dense pools, this pool never moves items, so a reference-like handle (the slot
/// index stamped into each item through [`Poolable`]) stays valid without any indirection
/// table. The price is that live items are not contiguous and a request may need to scan for a
/// free slot. The scan starts right after the most recently claimed slot, which makes it
/// cheap for the common pattern of requesting items and returning them in roughly the same
/// order.
///
/// # Example
///
/// ```rust
/// use dense_pool::{FreeSlotPool, Poolable};
///
/// #[derive(Default)]
/// struct Bullet {
///     slot: usize,
///     speed: f32,
/// }
///
/// impl Poolable for Bullet {
///     fn pool_index(&self) -> usize {
///         self.slot
///     }
///
///     fn set_pool_index(&mut self, index: usize) {
///         self.slot = index;
///     }
/// }
///
/// let mut pool = FreeSlotPool::builder()
///     .capacity(2)
///     .factory(Bullet::default)
///     .on_return(|bullet: &mut Bullet| bullet.speed = 0.0)
///     .build()
///     .unwrap();
///
/// let bullet = pool.request().unwrap();
/// bullet.speed = 3.0;
/// let slot = bullet.pool_index();
///
/// assert_eq!(pool.get(slot).unwrap().speed, 3.0);
///
/// pool.return_slot(slot);
/// assert!(pool.is_empty());
/// ```
///
/// # Thread safety
///
/// The pool is meant for a single owner that performs requests and returns serially. It is
/// neither [`Send`] nor [`Sync`] because it stores arbitrary client callbacks.
#[derive(Debug)]
pub struct FreeSlotPool<T> {
    slots: FreeSlots<T>,
}

impl<T: Poolable> FreeSlotPool<T> {
    /// Creates a builder for configuring and constructing a [`FreeSlotPool`].
    ///
    /// A factory callback is mandatory; all other settings are optional.
    #[inline]
    pub fn builder() -> FreeSlotPoolBuilder<T> {
        FreeSlotPoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(capacity: usize, factory: Factory<T>, on_return: Reset<T>) -> Self {
        Self {
            slots: FreeSlots::new(capacity, factory, on_return),
        }
    }

    /// Claims a free slot and returns the item in it, stamped with its slot index.
    ///
    /// Returns `None` if every slot is in use.
    #[must_use]
    pub fn request(&mut self) -> Option<&mut T> {
        if self.slots.len == self.slots.values.len() {
            trace!(capacity = self.slots.values.len(), "free-slot pool exhausted");
            return None;
        }

        self.slots.claim()
    }

    /// Returns an item to the pool, using the slot index the item reports about itself.
    ///
    /// The `on_return` callback is called on the pooled item in that slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot index is outside the capacity of the pool. In debug builds, also
    /// panics if the slot is not in use.
    #[inline]
    pub fn return_element<P: Poolable + ?Sized>(&mut self, element: &P) {
        self.slots.release(element.pool_index());
    }

    /// Returns the item in the given slot to the pool.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the capacity of the pool. In debug builds, also panics if
    /// the slot is not in use.
    #[inline]
    pub fn return_slot(&mut self, slot: usize) {
        self.slots.release(slot);
    }

    /// Returns every in-use item to the pool and moves the scan cursor back to the first slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// The number of items in use.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len
    }

    /// Whether no items are in use.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len == 0
    }

    /// Whether every slot is in use.
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.slots.len == self.slots.values.len()
    }

    /// The number of slots in the pool.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.values.len()
    }

    /// Whether the given slot holds an item that is in use.
    #[must_use]
    #[inline]
    pub fn is_in_use(&self, slot: usize) -> bool {
        self.slots.is_in_use(slot)
    }

    /// The in-use item in the given slot, or `None` if the slot is free or does not exist.
    #[must_use]
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)
    }

    /// Exclusive access to the in-use item in the given slot, or `None` if the slot is free or
    /// does not exist.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)
    }

    /// Iterates over `(slot, item)` pairs of the in-use items, in slot order.
    pub fn iter(&self) -> SlotIter<'_, T> {
        self.slots.iter()
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    #[cfg_attr(not(test), expect(dead_code, reason = "only exercised by tests"))]
    pub(crate) fn integrity_check(&self) {
        self.slots.integrity_check();
    }
}

/// A free-slot pool that appends a new slot whenever a request finds every slot in use.
///
/// Otherwise identical to [`FreeSlotPool`]: items never move and requests scan for a free slot
/// starting at a cursor. Appended slots are created by the factory callback and handed out
/// immediately.
///
/// # Thread safety
///
/// The pool is meant for a single owner that performs requests and returns serially. It is
/// neither [`Send`] nor [`Sync`] because it stores arbitrary client callbacks.
#[derive(Debug)]
pub struct GrowableFreeSlotPool<T> {
    slots: FreeSlots<T>,
}

impl<T: Poolable> GrowableFreeSlotPool<T> {
    /// Creates a builder for configuring and constructing a [`GrowableFreeSlotPool`].
    ///
    /// A factory callback is mandatory; all other settings are optional.
    #[inline]
    pub fn builder() -> GrowableFreeSlotPoolBuilder<T> {
        GrowableFreeSlotPoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(capacity: usize, factory: Factory<T>, on_return: Reset<T>) -> Self {
        Self {
            slots: FreeSlots::new(capacity, factory, on_return),
        }
    }

    /// Claims a free slot, appending a new one if every slot is in use, and returns the item in
    /// it, stamped with its slot index.
    pub fn request(&mut self) -> &mut T {
        if self.slots.len == self.slots.values.len() {
            return self.slots.claim_new();
        }

        match self.slots.find_free() {
            Some(slot) => self.slots.occupy(slot),
            None => unreachable!("len below capacity guarantees a free slot"),
        }
    }

    /// Returns an item to the pool, using the slot index the item reports about itself.
    ///
    /// # Panics
    ///
    /// Panics if the slot index is outside the capacity of the pool. In debug builds, also
    /// panics if the slot is not in use.
    #[inline]
    pub fn return_element<P: Poolable + ?Sized>(&mut self, element: &P) {
        self.slots.release(element.pool_index());
    }

    /// Returns the item in the given slot to the pool.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is outside the capacity of the pool. In debug builds, also panics if
    /// the slot is not in use.
    #[inline]
    pub fn return_slot(&mut self, slot: usize) {
        self.slots.release(slot);
    }

    /// Returns every in-use item to the pool and moves the scan cursor back to the first slot.
    ///
    /// The capacity is retained.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// The number of items in use.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len
    }

    /// Whether no items are in use.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len == 0
    }

    /// The number of slots in the pool. Requests beyond this number grow the pool.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.values.len()
    }

    /// Whether the given slot holds an item that is in use.
    #[must_use]
    #[inline]
    pub fn is_in_use(&self, slot: usize) -> bool {
        self.slots.is_in_use(slot)
    }

    /// The in-use item in the given slot, or `None` if the slot is free or does not exist.
    #[must_use]
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)
    }

    /// Exclusive access to the in-use item in the given slot, or `None` if the slot is free or
    /// does not exist.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)
    }

    /// Iterates over `(slot, item)` pairs of the in-use items, in slot order.
    pub fn iter(&self) -> SlotIter<'_, T> {
        self.slots.iter()
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    #[cfg_attr(not(test), expect(dead_code, reason = "only exercised by tests"))]
    pub(crate) fn integrity_check(&self) {
        self.slots.integrity_check();
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;

    #[derive(Debug)]
    struct Sprite {
        slot: usize,
        x: f32,
        health: i32,
    }

    impl Default for Sprite {
        fn default() -> Self {
            Self {
                slot: 0,
                x: 0.0,
                health: 100,
            }
        }
    }

    impl Sprite {
        fn reset(&mut self) {
            self.x = 0.0;
            self.health = 100;
        }
    }

    impl Poolable for Sprite {
        fn pool_index(&self) -> usize {
            self.slot
        }

        fn set_pool_index(&mut self, index: usize) {
            self.slot = index;
        }
    }

    fn fixed_pool(capacity: usize) -> FreeSlotPool<Sprite> {
        FreeSlotPool::builder()
            .capacity(capacity)
            .factory(Sprite::default)
            .on_return(Sprite::reset)
            .build()
            .unwrap()
    }

    fn growable_pool(capacity: usize) -> GrowableFreeSlotPool<Sprite> {
        GrowableFreeSlotPool::builder()
            .capacity(capacity)
            .factory(Sprite::default)
            .on_return(Sprite::reset)
            .build()
            .unwrap()
    }

    assert_not_impl_any!(FreeSlotPool<Sprite>: Send, Sync);
    assert_not_impl_any!(GrowableFreeSlotPool<Sprite>: Send, Sync);

    #[test]
    fn request_ten_hands_out_slots_in_order() {
        let mut pool = fixed_pool(10);

        let slots: Vec<_> = (0..10)
            .map(|i| {
                let sprite = pool.request().unwrap();
                sprite.x += i as f32;
                sprite.pool_index()
            })
            .collect();

        assert_eq!(slots, (0..10).collect::<Vec<_>>());
        for slot in slots {
            assert_eq!(pool.get(slot).unwrap().x, slot as f32);
        }
        assert!(pool.is_full());
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn request_too_many_returns_none() {
        let mut pool = fixed_pool(10);
        for _ in 0..10 {
            assert!(pool.request().is_some());
        }

        for _ in 0..5 {
            assert!(pool.request().is_none());
        }
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn request_and_return_scenario() {
        let mut pool = fixed_pool(10);
        for i in 0..10 {
            pool.request().unwrap().x = i as f32;
        }

        for slot in 5..8 {
            let handle = Sprite {
                slot,
                ..Sprite::default()
            };
            pool.return_element(&handle);
        }

        assert_eq!(pool.len(), 7);
        assert_eq!(pool.get(9).unwrap().x, 9.0);
        assert!(pool.get(6).is_none());

        let reused: Vec<_> = (0..3)
            .map(|_| {
                let sprite = pool.request().unwrap();
                assert_eq!(sprite.x, 0.0);
                assert_eq!(sprite.health, 100);
                sprite.pool_index()
            })
            .collect();

        assert_eq!(reused, vec![5, 6, 7]);
        assert_eq!(pool.len(), 10);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn scan_starts_after_last_claim_and_wraps() {
        let mut pool = fixed_pool(4);
        for _ in 0..4 {
            _ = pool.request();
        }

        // The cursor wrapped to slot 0 after the fourth claim.
        pool.return_slot(2);
        pool.return_slot(0);

        assert_eq!(pool.request().unwrap().pool_index(), 0);
        assert_eq!(pool.request().unwrap().pool_index(), 2);

        pool.return_slot(1);
        pool.return_slot(3);

        // The cursor now sits at slot 3, so slot 3 is preferred over slot 1.
        assert_eq!(pool.request().unwrap().pool_index(), 3);
        assert_eq!(pool.request().unwrap().pool_index(), 1);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn clear_frees_everything_and_resets_cursor() {
        let mut pool = fixed_pool(3);
        for _ in 0..2 {
            pool.request().unwrap().health = 1;
        }

        pool.clear();

        assert!(pool.is_empty());
        assert!(!pool.is_in_use(0));
        let sprite = pool.request().unwrap();
        assert_eq!(sprite.pool_index(), 0);
        assert_eq!(sprite.health, 100);
    }

    #[test]
    fn zero_capacity_fixed_pool_is_always_exhausted() {
        let mut pool = fixed_pool(0);

        assert!(pool.request().is_none());
        assert!(pool.is_full());
        assert!(pool.is_empty());
    }

    #[test]
    fn get_rejects_free_and_unknown_slots() {
        let mut pool = fixed_pool(2);
        let slot = pool.request().unwrap().pool_index();

        assert!(pool.get_mut(slot).is_some());
        assert!(pool.get(1).is_none());
        assert!(pool.get(7).is_none());
        assert!(!pool.is_in_use(7));
    }

    #[test]
    fn iter_yields_only_in_use_slots() {
        let mut pool = fixed_pool(6);
        for i in 0..6 {
            pool.request().unwrap().x = i as f32;
        }
        pool.return_slot(1);
        pool.return_slot(4);
        pool.return_slot(5);

        let iter = pool.iter();
        assert_eq!(iter.len(), 3);

        let live: Vec<_> = iter.map(|(slot, sprite)| (slot, sprite.x)).collect();
        assert_eq!(live, vec![(0, 0.0), (2, 2.0), (3, 3.0)]);

        pool.clear();
        assert_eq!(pool.iter().count(), 0);
    }

    #[test]
    fn growable_iter_includes_appended_slots() {
        let mut pool = growable_pool(1);
        for i in 0..3 {
            pool.request().health = i;
        }
        pool.return_slot(0);

        let live: Vec<_> = pool
            .iter()
            .map(|(slot, sprite)| (slot, sprite.pool_index(), sprite.health))
            .collect();
        assert_eq!(live, vec![(1, 1, 1), (2, 2, 2)]);
    }

    #[test]
    #[should_panic]
    fn return_slot_outside_capacity_panics() {
        let mut pool = fixed_pool(2);
        pool.return_slot(2);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn return_free_slot_panics_in_debug() {
        let mut pool = fixed_pool(2);
        _ = pool.request();
        pool.return_slot(1);
    }

    #[test]
    fn growable_request_too_many_appends() {
        let mut pool = growable_pool(10);

        for i in 0..15 {
            let sprite = pool.request();
            sprite.x = i as f32;
            assert_eq!(sprite.pool_index(), i);
        }

        assert_eq!(pool.len(), 15);
        assert_eq!(pool.capacity(), 15);
        for slot in 0..15 {
            assert_eq!(pool.get(slot).unwrap().x, slot as f32);
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn growable_reuses_free_slots_before_appending() {
        let mut pool = growable_pool(10);
        for _ in 0..10 {
            pool.request().x = 1.0;
        }

        for slot in 5..8 {
            pool.return_slot(slot);
        }
        assert_eq!(pool.len(), 7);

        for _ in 0..3 {
            let sprite = pool.request();
            assert!((5..8).contains(&sprite.pool_index()));
            assert_eq!(sprite.x, 0.0);
        }

        assert_eq!(pool.capacity(), 10);
        assert_eq!(pool.request().pool_index(), 10);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn growable_zero_capacity_appends() {
        let mut pool = growable_pool(0);

        assert_eq!(pool.request().pool_index(), 0);
        assert_eq!(pool.request().pool_index(), 1);
        assert_eq!(pool.capacity(), 2);

        let handle = Sprite {
            slot: 0,
            ..Sprite::default()
        };
        pool.return_element(&handle);

        assert_eq!(pool.request().pool_index(), 0);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn growable_clear_keeps_capacity() {
        let mut pool = growable_pool(1);
        for _ in 0..4 {
            pool.request().health = 5;
        }

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.request().health, 100);
    }
}
