use std::fmt;
use std::ops::{Index, IndexMut};

use tracing::{debug, trace};

use crate::callbacks::{Relocate, Reset};
use crate::resizable::next_capacity;
use crate::{IdMap, ValuePoolBuilder};

/// A dense pool of plain values that relocates items by copying their logical state through a
/// client-supplied callback instead of by swapping them.
///
/// This suits items that embed buffers which must stay with their slot: when a returned item
/// leaves a hole, the pool copies the last live item into the hole with the `on_move` callback
/// and then resets the vacated last slot with the `on_clear` callback. Neither the buffers nor
/// the items themselves ever change places, only the state the callbacks copy.
///
/// New slots are created with [`Default`] and then passed through the optional `on_init`
/// callback, both at construction and whenever the pool grows. Use it to allocate per-slot
/// buffers once, up front.
///
/// Capacity grows like in [`ResizableDensePool`][crate::ResizableDensePool]: doubled on
/// demand, clamped to a maximum. A request fails with `None` only when the pool is at its
/// maximum capacity and every slot is live.
///
/// Items are typically modified in place after they are requested. Use [`at_id()`][Self::at_id]
/// and [`at_id_mut()`][Self::at_id_mut] to reach an item by identifier, or
/// [`at()`][Self::at] and indexing to reach it by storage index.
///
/// # Example
///
/// ```rust
/// use dense_pool::ValuePool;
///
/// #[derive(Default)]
/// struct Body {
///     x: f32,
///     trail: Vec<f32>,
/// }
///
/// let mut pool = ValuePool::builder()
///     .capacity(4)
///     .max_capacity(16)
///     .on_init(|body: &mut Body| body.trail.reserve(32))
///     .on_clear(|body: &mut Body| {
///         body.x = 0.0;
///         body.trail.clear();
///     })
///     .on_move(|from: &Body, to: &mut Body| {
///         to.x = from.x;
///         to.trail.clone_from(&from.trail);
///     })
///     .build()
///     .unwrap();
///
/// let a = pool.request_id().unwrap();
/// let b = pool.request_id().unwrap();
/// pool.at_id_mut(b).x = 2.0;
/// pool.at_id_mut(b).trail.push(1.0);
///
/// pool.return_id(a);
///
/// assert_eq!(pool.at_id(b).trail, vec![1.0]);
/// assert_eq!(pool.index_of(b), 0);
/// ```
///
/// # Thread safety
///
/// The pool is meant for a single owner that performs requests and returns serially. It is
/// neither [`Send`] nor [`Sync`] because it stores arbitrary client callbacks.
pub struct ValuePool<T> {
    values: Vec<T>,
    ids: IdMap,

    /// Number of live items. All of them are stored at the front of `values`.
    len: usize,

    /// The capacity will never grow beyond this.
    max_capacity: usize,

    on_clear: Reset<T>,
    on_move: Relocate<T>,
    on_init: Option<Reset<T>>,
}

impl<T: Default> ValuePool<T> {
    /// Creates a builder for configuring and constructing a [`ValuePool`].
    ///
    /// The `on_clear` and `on_move` callbacks are mandatory; all other settings are optional.
    #[inline]
    pub fn builder() -> ValuePoolBuilder<T> {
        ValuePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(
        capacity: usize,
        max_capacity: usize,
        on_clear: Reset<T>,
        on_move: Relocate<T>,
        on_init: Option<Reset<T>>,
    ) -> Self {
        debug_assert!(capacity <= max_capacity);

        let mut pool = Self {
            values: Vec::new(),
            ids: IdMap::identity(0),
            len: 0,
            max_capacity,
            on_clear,
            on_move,
            on_init,
        };

        pool.grow_to(capacity);
        pool
    }

    /// Claims a free slot and returns its identifier, doubling the capacity of the pool first
    /// if every slot is live.
    ///
    /// The item in the slot is in the state left by `on_clear` (or by `Default` and `on_init`
    /// if the slot has never been used).
    ///
    /// Returns `None` if the pool is already at its maximum capacity and every slot is live.
    #[must_use]
    pub fn request_id(&mut self) -> Option<usize> {
        if self.len == self.values.len() {
            let capacity = self.values.len();

            if capacity >= self.max_capacity {
                trace!(
                    capacity,
                    max_capacity = self.max_capacity,
                    "value pool exhausted"
                );
                return None;
            }

            self.resize(next_capacity(capacity, self.max_capacity));
        }

        let id = self.ids.id_at(self.len);

        // Cannot overflow because len < capacity.
        self.len = self.len.wrapping_add(1);

        Some(id)
    }

    /// Grows the pool to the given capacity, clamped to the maximum capacity.
    ///
    /// Does nothing if the pool already has at least that capacity; the pool never shrinks.
    /// All live identifiers remain valid and keep resolving to the same items.
    pub fn resize(&mut self, new_capacity: usize) {
        let old_capacity = self.values.len();
        let new_capacity = new_capacity.min(self.max_capacity);

        if new_capacity <= old_capacity {
            return;
        }

        debug!(
            old_capacity,
            new_capacity,
            max_capacity = self.max_capacity,
            "resizing value pool"
        );

        self.grow_to(new_capacity);
    }

    /// Ensures that at least `additional` more requests can succeed without resizing, or as
    /// many as the maximum capacity allows.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len.saturating_add(additional);
        self.resize(required);
    }

    /// Absorbs the live items of another pool, requesting a slot for each and copying the
    /// item's state into it with the `on_move` callback.
    ///
    /// Stops without error once this pool is exhausted. Returns the number of items that were
    /// absorbed; `other` is left unchanged.
    pub fn append(&mut self, other: &Self) -> usize {
        let mut absorbed: usize = 0;

        for source in other.live() {
            let Some(id) = self.request_id() else {
                trace!(
                    absorbed,
                    remaining = other.len().saturating_sub(absorbed),
                    "value pool filled up while appending"
                );
                break;
            };

            let index = self.ids.index_of(id);

            #[expect(
                clippy::indexing_slicing,
                reason = "the index of an identifier we just claimed is within capacity"
            )]
            let target = &mut self.values[index];

            (self.on_move)(source, target);

            absorbed = absorbed.wrapping_add(1);
        }

        absorbed
    }

    fn grow_to(&mut self, new_capacity: usize) {
        let old_capacity = self.values.len();

        self.values
            .reserve_exact(new_capacity.saturating_sub(old_capacity));

        for _ in old_capacity..new_capacity {
            let mut value = T::default();

            if let Some(on_init) = self.on_init.as_mut() {
                on_init(&mut value);
            }

            self.values.push(value);
        }

        self.ids.grow_to(new_capacity);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }
}

impl<T> ValuePool<T> {
    /// Returns the item with the given identifier to the pool.
    ///
    /// The state of the last live item is copied into the returned item's slot with
    /// `on_move`, after which the last slot is reset with `on_clear`. If the returned item is
    /// the last live item, it is only reset.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never issued by this pool. In debug builds, also panics if `id` is
    /// not currently live.
    #[inline]
    pub fn return_id(&mut self, id: usize) {
        let index = self.ids.index_of(id);
        self.return_index(index);
    }

    /// Returns the item at the given storage index to the pool.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity of the pool. In debug builds, also panics if
    /// `index` is not within the live range.
    #[expect(
        clippy::indexing_slicing,
        reason = "the caller guarantees the index is live, and live indices are within capacity"
    )]
    pub fn return_index(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "returned storage index {index} is not live (live count {})",
            self.len
        );

        self.len = self.len.wrapping_sub(1);
        let last = self.len;

        if index == last {
            (self.on_clear)(&mut self.values[index]);
            return;
        }

        // index < last, so the source lives in the tail and the destination in the head.
        let (head, tail) = self.values.split_at_mut(last);
        let last_value = &mut tail[0];

        (self.on_move)(last_value, &mut head[index]);
        (self.on_clear)(last_value);

        self.ids.swap_indices(index, last);
    }

    /// Returns every live item to the pool, calling `on_clear` on each of them.
    pub fn clear(&mut self) {
        #[expect(
            clippy::indexing_slicing,
            reason = "len never exceeds the number of stored values"
        )]
        let live = &mut self.values[..self.len];

        for value in live {
            (self.on_clear)(value);
        }

        self.len = 0;

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// The live item at the given storage index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not within the live range.
    #[must_use]
    #[inline]
    pub fn at(&self, index: usize) -> &T {
        self.live()
            .get(index)
            .expect("storage index is not within the live range of the pool")
    }

    /// Exclusive access to the live item at the given storage index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not within the live range.
    #[must_use]
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        self.live_mut()
            .get_mut(index)
            .expect("storage index is not within the live range of the pool")
    }

    /// The live item with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    #[must_use]
    #[inline]
    pub fn at_id(&self, id: usize) -> &T {
        self.at(self.ids.index_of(id))
    }

    /// Exclusive access to the live item with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not live.
    #[must_use]
    #[inline]
    pub fn at_id_mut(&mut self, id: usize) -> &mut T {
        let index = self.ids.index_of(id);
        self.at_mut(index)
    }

    /// The live item with the given identifier, or `None` if the identifier is not live.
    #[must_use]
    #[inline]
    pub fn get(&self, id: usize) -> Option<&T> {
        let index = *self.ids.ids_to_indices().get(id)?;
        self.live().get(index)
    }

    /// Exclusive access to the live item with the given identifier, or `None` if the
    /// identifier is not live.
    #[must_use]
    #[inline]
    pub fn get_mut(&mut self, id: usize) -> Option<&mut T> {
        let index = *self.ids.ids_to_indices().get(id)?;
        self.live_mut().get_mut(index)
    }

    /// The number of live items.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the pool has no live items.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every slot is live and the pool cannot grow any further.
    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.values.len() && self.values.len() >= self.max_capacity
    }

    /// The number of items the pool currently holds, live or free.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// The capacity that the pool will never grow beyond.
    #[must_use]
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// The live items as a contiguous slice, in storage order.
    #[must_use]
    #[inline]
    #[expect(
        clippy::indexing_slicing,
        reason = "len never exceeds the number of stored values"
    )]
    pub fn live(&self) -> &[T] {
        &self.values[..self.len]
    }

    /// The live items as a contiguous exclusive slice, in storage order.
    #[must_use]
    #[inline]
    #[expect(
        clippy::indexing_slicing,
        reason = "len never exceeds the number of stored values"
    )]
    pub fn live_mut(&mut self) -> &mut [T] {
        &mut self.values[..self.len]
    }

    /// The storage index currently occupied by the item with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the capacity of the pool.
    #[must_use]
    #[inline]
    pub fn index_of(&self, id: usize) -> usize {
        self.ids.index_of(id)
    }

    /// The identifier of the item currently stored at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the capacity of the pool.
    #[must_use]
    #[inline]
    pub fn id_at(&self, index: usize) -> usize {
        self.ids.id_at(index)
    }

    /// The identifier-to-index table, covering every slot of the pool.
    #[must_use]
    #[inline]
    pub fn ids_to_indices(&self) -> &[usize] {
        self.ids.ids_to_indices()
    }

    /// The index-to-identifier table, covering every slot of the pool.
    #[must_use]
    #[inline]
    pub fn indices_to_ids(&self) -> &[usize] {
        self.ids.indices_to_ids()
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        assert!(self.len <= self.values.len());
        assert!(self.values.len() <= self.max_capacity);
        assert_eq!(self.ids.len(), self.values.len());
        self.ids.integrity_check();
    }
}

impl<T> Index<usize> for ValuePool<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.at(index)
    }
}

impl<T> IndexMut<usize> for ValuePool<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.at_mut(index)
    }
}

impl<T: fmt::Debug> fmt::Debug for ValuePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePool")
            .field("len", &self.len)
            .field("capacity", &self.values.len())
            .field("max_capacity", &self.max_capacity)
            .field("live", &self.live())
            .field("ids", &self.ids)
            .field("has_on_init", &self.on_init.is_some())
            .finish_non_exhaustive()
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
    use std::cell::Cell;
    use std::rc::Rc;

    use static_assertions::assert_not_impl_any;

    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Point {
        x: f32,
        y: f32,
        health: i32,
    }

    fn point_pool(capacity: usize, max_capacity: usize) -> ValuePool<Point> {
        ValuePool::builder()
            .capacity(capacity)
            .max_capacity(max_capacity)
            .on_clear(|point: &mut Point| *point = Point::default())
            .on_move(|from: &Point, to: &mut Point| {
                to.x = from.x;
                to.y = from.y;
                to.health = from.health;
            })
            .build()
            .unwrap()
    }

    /// An item with a callback, relocated field by field.
    #[derive(Default)]
    struct Timer {
        remaining: f32,
        callback: Option<Rc<dyn Fn()>>,
    }

    fn timer_pool(capacity: usize) -> ValuePool<Timer> {
        ValuePool::builder()
            .capacity(capacity)
            .max_capacity(1000)
            .on_clear(|timer: &mut Timer| {
                timer.remaining = 0.0;
                timer.callback = None;
            })
            .on_move(|from: &Timer, to: &mut Timer| {
                to.remaining = from.remaining;
                to.callback.clone_from(&from.callback);
            })
            .build()
            .unwrap()
    }

    /// An item embedding fixed-size buffers that are allocated once per slot.
    #[derive(Default)]
    struct Buffers {
        x: Vec<f32>,
        health: Vec<i32>,
    }

    const BUFFER_LEN: usize = 256;

    fn buffer_pool(
        capacity: usize,
        max_capacity: usize,
        inits: Rc<Cell<usize>>,
    ) -> ValuePool<Buffers> {
        ValuePool::builder()
            .capacity(capacity)
            .max_capacity(max_capacity)
            .on_init(move |buffers: &mut Buffers| {
                inits.set(inits.get() + 1);
                buffers.x = vec![0.0; BUFFER_LEN];
                buffers.health = vec![0; BUFFER_LEN];
            })
            .on_clear(|buffers: &mut Buffers| {
                buffers.x.fill(0.0);
                buffers.health.fill(0);
            })
            .on_move(|from: &Buffers, to: &mut Buffers| {
                to.x.copy_from_slice(&from.x);
                to.health.copy_from_slice(&from.health);
            })
            .build()
            .unwrap()
    }

    assert_not_impl_any!(ValuePool<Point>: Send, Sync);

    #[test]
    fn request_ten_and_read_back() {
        let mut pool = point_pool(10, 1000);

        let ids: Vec<_> = (0..10).map(|_| pool.request_id().unwrap()).collect();

        for i in 0..pool.len() {
            pool[i].x += i as f32;
        }

        for &id in &ids {
            assert_eq!(pool.at_id(id).x, id as f32);
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn request_too_many_resizes() {
        let mut pool = point_pool(10, 1000);

        let ids: Vec<_> = (0..15).map(|_| pool.request_id().unwrap()).collect();

        for i in 0..pool.len() {
            pool.at_mut(i).x += i as f32;
        }

        for &id in &ids {
            assert_eq!(pool.at_id(id).x, id as f32);
        }
        assert_eq!(pool.len(), 15);
        assert_eq!(pool.capacity(), 20);
    }

    #[test]
    fn request_and_return_scenario() {
        let mut pool = point_pool(10, 1000);

        let ids: Vec<_> = (0..10).map(|_| pool.request_id().unwrap()).collect();
        for i in 0..pool.len() {
            pool[i].x += i as f32;
        }

        for &id in &ids[5..8] {
            pool.return_id(id);
        }

        assert_eq!(pool.len(), 7);
        assert_eq!(pool.at_id(ids[9]).x, 9.0);

        let new_ids: Vec<_> = (0..3).map(|_| pool.request_id().unwrap()).collect();

        assert_eq!(pool.len(), 10);
        for &id in &new_ids {
            assert_eq!(pool.at_id(id).x, 0.0);
        }
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn callbacks_survive_relocation() {
        let passes = Rc::new(Cell::new(0));
        let mut pool = timer_pool(10);

        let ids: Vec<_> = (0..15)
            .map(|i| {
                let id = pool.request_id().unwrap();
                let passes = Rc::clone(&passes);
                let timer = pool.at_id_mut(id);
                timer.remaining = i as f32;
                timer.callback = Some(Rc::new(move || passes.set(passes.get() + 1)));
                id
            })
            .collect();

        // Shuffle the storage so that most items get relocated.
        pool.return_id(ids[0]);
        pool.return_id(ids[3]);

        for (i, &id) in ids.iter().enumerate() {
            if i == 0 || i == 3 {
                continue;
            }

            let timer = pool.at_id(id);
            assert_eq!(timer.remaining, i as f32);
            (timer.callback.as_ref().unwrap())();
        }

        assert_eq!(passes.get(), 13);
    }

    #[test]
    fn returned_slot_is_cleared_and_last_slot_moved() {
        let mut pool = timer_pool(3);
        let ids: Vec<_> = (0..3).map(|_| pool.request_id().unwrap()).collect();
        for (i, &id) in ids.iter().enumerate() {
            pool.at_id_mut(id).remaining = (i + 1) as f32;
            pool.at_id_mut(id).callback = Some(Rc::new(|| {}));
        }

        pool.return_id(ids[0]);

        assert_eq!(pool.index_of(ids[2]), 0);
        assert_eq!(pool.at(0).remaining, 3.0);
        assert_eq!(pool.index_of(ids[0]), 2);

        let reused = pool.request_id().unwrap();
        assert_eq!(reused, ids[0]);
        assert_eq!(pool.at_id(reused).remaining, 0.0);
        assert!(pool.at_id(reused).callback.is_none());
    }

    #[test]
    fn fill_to_max_with_identifier_writes() {
        let mut pool = point_pool(10, 20);

        for _ in 0..pool.max_capacity() {
            let id = pool.request_id().unwrap();
            *pool.at_id_mut(id) = Point {
                x: 1.0,
                y: 0.0,
                health: 0,
            };
        }

        assert_eq!(pool[0].x, 1.0);
        assert_eq!(pool[10].x, 1.0);
        assert!(pool.is_full());
        assert_eq!(pool.request_id(), None);
        assert_eq!(pool.len(), 20);
    }

    #[test]
    fn fill_to_max_with_index_writes() {
        let mut pool = point_pool(10, 20);

        for _ in 0..pool.max_capacity() {
            let id = pool.request_id().unwrap();
            let index = pool.ids_to_indices()[id];
            pool[index] = Point {
                x: 1.0,
                y: 2.0,
                health: 3,
            };
        }

        assert_eq!(pool[10].x, 1.0);
        assert_eq!(pool[19].health, 3);
    }

    #[test]
    fn init_runs_for_every_created_slot() {
        let inits = Rc::new(Cell::new(0));
        let mut pool = buffer_pool(4, 10, Rc::clone(&inits));

        assert_eq!(inits.get(), 4);

        let ids: Vec<_> = (0..5).map(|_| pool.request_id().unwrap()).collect();
        assert_eq!(pool.capacity(), 8);
        assert_eq!(inits.get(), 8);

        for &id in &ids {
            let buffers = pool.at_id_mut(id);
            assert_eq!(buffers.x.len(), BUFFER_LEN);
            buffers.x[7] = id as f32;
            buffers.health[BUFFER_LEN - 1] = 100;
        }

        pool.return_id(ids[1]);

        let last = pool.at_id(ids[4]);
        assert_eq!(last.x[7], 4.0);
        assert_eq!(last.health[BUFFER_LEN - 1], 100);

        let reused = pool.request_id().unwrap();
        assert!(pool.at_id(reused).x.iter().all(|&x| x == 0.0));
        assert_eq!(inits.get(), 8);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    fn append_copies_live_items() {
        let mut source = point_pool(4, 4);
        for i in 0..3 {
            let id = source.request_id().unwrap();
            source.at_id_mut(id).health = i + 1;
        }
        let returned = source.id_at(0);
        source.return_id(returned);

        let mut target = point_pool(1, 10);
        let existing = target.request_id().unwrap();
        target.at_id_mut(existing).health = 50;

        let absorbed = target.append(&source);

        assert_eq!(absorbed, 2);
        assert_eq!(target.len(), 3);
        let healths: Vec<_> = target.live().iter().map(|point| point.health).collect();
        assert_eq!(healths, vec![50, 3, 2]);
        assert_eq!(source.len(), 2);
        #[cfg(debug_assertions)]
        target.integrity_check();
    }

    #[test]
    fn append_stops_silently_when_exhausted() {
        let mut source = point_pool(8, 8);
        for i in 0..8 {
            let id = source.request_id().unwrap();
            source.at_id_mut(id).health = i;
        }

        let mut target = point_pool(2, 5);
        let absorbed = target.append(&source);

        assert_eq!(absorbed, 5);
        assert_eq!(target.len(), 5);
        assert!(target.is_full());
        let healths: Vec<_> = target.live().iter().map(|point| point.health).collect();
        assert_eq!(healths, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn append_empty_source_is_noop() {
        let source = point_pool(3, 3);
        let mut target = point_pool(3, 3);

        assert_eq!(target.append(&source), 0);
        assert!(target.is_empty());
    }

    #[test]
    fn clear_resets_every_live_item() {
        let mut pool = point_pool(4, 4);
        for _ in 0..4 {
            let id = pool.request_id().unwrap();
            pool.at_id_mut(id).y = 5.0;
        }

        pool.clear();

        assert!(pool.is_empty());
        for _ in 0..4 {
            let id = pool.request_id().unwrap();
            assert_eq!(*pool.at_id(id), Point::default());
        }
    }

    #[test]
    fn get_returns_none_for_free_ids() {
        let mut pool = point_pool(3, 3);
        let id = pool.request_id().unwrap();

        assert!(pool.get(id).is_some());
        assert!(pool.get_mut(id).is_some());
        assert!(pool.get(2).is_none());
        assert!(pool.get(42).is_none());
    }

    #[test]
    fn reserve_and_resize_clamp_to_max() {
        let mut pool = point_pool(0, 6);

        pool.reserve(3);
        assert_eq!(pool.capacity(), 3);

        pool.resize(100);
        assert_eq!(pool.capacity(), 6);

        pool.resize(2);
        assert_eq!(pool.capacity(), 6);
        #[cfg(debug_assertions)]
        pool.integrity_check();
    }

    #[test]
    #[should_panic]
    fn at_beyond_live_range_panics() {
        let mut pool = point_pool(4, 4);
        _ = pool.request_id();
        _ = pool.at(1);
    }

    #[test]
    fn debug_output_lists_live_items() {
        let mut pool = point_pool(2, 2);
        _ = pool.request_id();

        let output = format!("{pool:?}");
        assert!(output.contains("ValuePool"));
        assert!(output.contains("Point"));
    }
}
