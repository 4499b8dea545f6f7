use std::fmt;

use crate::callbacks::{Factory, Reset, no_reset};
use crate::error::Result;
use crate::{
    DensePool, DenseSlots, Error, FreeSlotPool, GrowableDensePool, GrowableFreeSlotPool, Poolable,
    RemovalOrder, ResizableDensePool,
};

/// Settings shared by every builder of reference-style dense pools.
struct SlotsConfig<T> {
    capacity: usize,
    factory: Option<Factory<T>>,
    on_return: Option<Reset<T>>,
}

impl<T> SlotsConfig<T> {
    fn new() -> Self {
        Self {
            capacity: 0,
            factory: None,
            on_return: None,
        }
    }

    fn into_parts(self) -> Result<(usize, Factory<T>, Reset<T>)> {
        let factory = self.factory.ok_or(Error::MissingCallback {
            callback: "factory",
        })?;

        Ok((
            self.capacity,
            factory,
            self.on_return.unwrap_or_else(no_reset),
        ))
    }

    fn into_slots(self) -> Result<DenseSlots<T>> {
        let (capacity, factory, on_return) = self.into_parts()?;
        Ok(DenseSlots::new(capacity, factory, on_return))
    }
}

impl<T> fmt::Debug for SlotsConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotsConfig")
            .field("capacity", &self.capacity)
            .field("has_factory", &self.factory.is_some())
            .field("has_on_return", &self.on_return.is_some())
            .finish()
    }
}

/// Builder for creating an instance of [`DensePool`].
///
/// The factory callback is mandatory, whereas other settings are optional. The capacity
/// defaults to zero, which yields a pool that is always exhausted.
///
/// # Example
///
/// ```
/// use dense_pool::DensePool;
///
/// let pool = DensePool::builder()
///     .capacity(16)
///     .factory(|| [0_u8; 64])
///     .on_return(|buffer| buffer.fill(0))
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.capacity(), 16);
/// ```
#[derive(Debug)]
#[must_use]
pub struct DensePoolBuilder<T> {
    config: SlotsConfig<T>,
}

impl<T> DensePoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            config: SlotsConfig::new(),
        }
    }

    /// Sets the number of items the pool holds. All of them are created when the pool is built.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the callback that creates the items of the pool.
    #[inline]
    pub fn factory(mut self, factory: impl FnMut() -> T + 'static) -> Self {
        self.config.factory = Some(Box::new(factory));
        self
    }

    /// Sets the callback that resets an item when it is returned to the pool.
    ///
    /// If not set, returned items keep whatever state they had.
    #[inline]
    pub fn on_return(mut self, on_return: impl FnMut(&mut T) + 'static) -> Self {
        self.config.on_return = Some(Box::new(on_return));
        self
    }

    /// Builds the pool, creating every item with the factory callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if no factory callback has been set.
    #[inline]
    pub fn build(self) -> Result<DensePool<T>> {
        Ok(DensePool::from_slots(self.config.into_slots()?))
    }
}

/// Builder for creating an instance of [`GrowableDensePool`].
///
/// The factory callback is mandatory, whereas other settings are optional. The initial capacity
/// defaults to zero, in which case the first request creates the first item.
#[derive(Debug)]
#[must_use]
pub struct GrowableDensePoolBuilder<T> {
    config: SlotsConfig<T>,
}

impl<T> GrowableDensePoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            config: SlotsConfig::new(),
        }
    }

    /// Sets the number of items created when the pool is built.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the callback that creates the items of the pool, both initially and on growth.
    #[inline]
    pub fn factory(mut self, factory: impl FnMut() -> T + 'static) -> Self {
        self.config.factory = Some(Box::new(factory));
        self
    }

    /// Sets the callback that resets an item when it is returned to the pool.
    #[inline]
    pub fn on_return(mut self, on_return: impl FnMut(&mut T) + 'static) -> Self {
        self.config.on_return = Some(Box::new(on_return));
        self
    }

    /// Builds the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if no factory callback has been set.
    #[inline]
    pub fn build(self) -> Result<GrowableDensePool<T>> {
        Ok(GrowableDensePool::from_slots(self.config.into_slots()?))
    }
}

/// Builder for creating an instance of [`ResizableDensePool`].
///
/// The factory callback is mandatory, whereas other settings are optional. The initial
/// capacity defaults to zero and the maximum capacity to [`usize::MAX`], meaning the pool keeps
/// doubling for as long as memory allows.
///
/// # Example
///
/// ```
/// use dense_pool::{RemovalOrder, ResizableDensePool};
///
/// let pool = ResizableDensePool::builder()
///     .capacity(4)
///     .max_capacity(1024)
///     .factory(String::new)
///     .on_return(String::clear)
///     .removal_order(RemovalOrder::Ordered)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.capacity(), 4);
/// assert_eq!(pool.max_capacity(), 1024);
/// ```
#[derive(Debug)]
#[must_use]
pub struct ResizableDensePoolBuilder<T> {
    config: SlotsConfig<T>,
    max_capacity: usize,
    removal_order: RemovalOrder,
}

impl<T> ResizableDensePoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            config: SlotsConfig::new(),
            max_capacity: usize::MAX,
            removal_order: RemovalOrder::default(),
        }
    }

    /// Sets the number of items created when the pool is built.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the capacity that the pool will never grow beyond.
    #[inline]
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Sets the callback that creates the items of the pool, both initially and on growth.
    #[inline]
    pub fn factory(mut self, factory: impl FnMut() -> T + 'static) -> Self {
        self.config.factory = Some(Box::new(factory));
        self
    }

    /// Sets the callback that resets an item when it is returned to the pool.
    #[inline]
    pub fn on_return(mut self, on_return: impl FnMut(&mut T) + 'static) -> Self {
        self.config.on_return = Some(Box::new(on_return));
        self
    }

    /// Sets how the pool closes the gap left by a returned item. See [`RemovalOrder`].
    #[inline]
    pub fn removal_order(mut self, removal_order: RemovalOrder) -> Self {
        self.removal_order = removal_order;
        self
    }

    /// Builds the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if no factory callback has been set, or
    /// [`Error::MaxCapacityBelowInitial`] if the maximum capacity is below the initial one.
    pub fn build(self) -> Result<ResizableDensePool<T>> {
        if self.max_capacity < self.config.capacity {
            return Err(Error::MaxCapacityBelowInitial {
                capacity: self.config.capacity,
                max_capacity: self.max_capacity,
            });
        }

        Ok(ResizableDensePool::from_parts(
            self.config.into_slots()?,
            self.max_capacity,
            self.removal_order,
        ))
    }
}

/// Builder for creating an instance of [`FreeSlotPool`].
///
/// The factory callback is mandatory, whereas other settings are optional. The capacity
/// defaults to zero, which yields a pool that is always exhausted.
#[derive(Debug)]
#[must_use]
pub struct FreeSlotPoolBuilder<T> {
    config: SlotsConfig<T>,
}

impl<T: Poolable> FreeSlotPoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            config: SlotsConfig::new(),
        }
    }

    /// Sets the number of slots in the pool. Every slot is filled by the factory when the pool
    /// is built.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the callback that creates the items of the pool.
    #[inline]
    pub fn factory(mut self, factory: impl FnMut() -> T + 'static) -> Self {
        self.config.factory = Some(Box::new(factory));
        self
    }

    /// Sets the callback that resets an item when it is returned to the pool.
    #[inline]
    pub fn on_return(mut self, on_return: impl FnMut(&mut T) + 'static) -> Self {
        self.config.on_return = Some(Box::new(on_return));
        self
    }

    /// Builds the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if no factory callback has been set.
    #[inline]
    pub fn build(self) -> Result<FreeSlotPool<T>> {
        let (capacity, factory, on_return) = self.config.into_parts()?;
        Ok(FreeSlotPool::new_inner(capacity, factory, on_return))
    }
}

/// Builder for creating an instance of [`GrowableFreeSlotPool`].
///
/// The factory callback is mandatory, whereas other settings are optional. The initial capacity
/// defaults to zero, in which case the first request appends the first slot.
#[derive(Debug)]
#[must_use]
pub struct GrowableFreeSlotPoolBuilder<T> {
    config: SlotsConfig<T>,
}

impl<T: Poolable> GrowableFreeSlotPoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            config: SlotsConfig::new(),
        }
    }

    /// Sets the number of slots created when the pool is built.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the callback that creates the items of the pool, both initially and on growth.
    #[inline]
    pub fn factory(mut self, factory: impl FnMut() -> T + 'static) -> Self {
        self.config.factory = Some(Box::new(factory));
        self
    }

    /// Sets the callback that resets an item when it is returned to the pool.
    #[inline]
    pub fn on_return(mut self, on_return: impl FnMut(&mut T) + 'static) -> Self {
        self.config.on_return = Some(Box::new(on_return));
        self
    }

    /// Builds the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if no factory callback has been set.
    #[inline]
    pub fn build(self) -> Result<GrowableFreeSlotPool<T>> {
        let (capacity, factory, on_return) = self.config.into_parts()?;
        Ok(GrowableFreeSlotPool::new_inner(capacity, factory, on_return))
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;

    #[derive(Debug, Default)]
    struct Slotted(usize);

    impl Poolable for Slotted {
        fn pool_index(&self) -> usize {
            self.0
        }

        fn set_pool_index(&mut self, index: usize) {
            self.0 = index;
        }
    }

    assert_not_impl_any!(DensePoolBuilder<u32>: Send, Sync);
    assert_not_impl_any!(ResizableDensePoolBuilder<u32>: Send, Sync);

    #[test]
    fn missing_factory_is_an_error() {
        let result = DensePool::<u32>::builder().capacity(3).build();
        assert_eq!(
            result.unwrap_err(),
            Error::MissingCallback {
                callback: "factory"
            }
        );

        let result = GrowableDensePool::<u32>::builder().build();
        assert!(matches!(result, Err(Error::MissingCallback { .. })));

        let result = ResizableDensePool::<u32>::builder().build();
        assert!(matches!(result, Err(Error::MissingCallback { .. })));

        let result = FreeSlotPool::<Slotted>::builder().capacity(2).build();
        assert!(matches!(result, Err(Error::MissingCallback { .. })));

        let result = GrowableFreeSlotPool::<Slotted>::builder().build();
        assert!(matches!(result, Err(Error::MissingCallback { .. })));
    }

    #[test]
    fn defaults_yield_empty_pools() {
        let pool = DensePool::builder().factory(|| 1_u8).build().unwrap();
        assert_eq!(pool.capacity(), 0);

        let pool = GrowableDensePool::builder().factory(|| 1_u8).build().unwrap();
        assert_eq!(pool.capacity(), 0);

        let pool = ResizableDensePool::builder().factory(|| 1_u8).build().unwrap();
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.max_capacity(), usize::MAX);
        assert_eq!(pool.removal_order(), RemovalOrder::Unordered);
    }

    #[test]
    fn free_slot_builders_prefill_capacity() {
        let pool = FreeSlotPool::builder()
            .capacity(3)
            .factory(Slotted::default)
            .build()
            .unwrap();
        assert_eq!(pool.capacity(), 3);

        let pool = GrowableFreeSlotPool::builder()
            .factory(Slotted::default)
            .build()
            .unwrap();
        assert_eq!(pool.capacity(), 0);
    }

    #[test]
    fn max_capacity_below_initial_is_an_error() {
        let result = ResizableDensePool::builder()
            .capacity(8)
            .max_capacity(4)
            .factory(|| 0_u32)
            .build();

        assert_eq!(
            result.unwrap_err(),
            Error::MaxCapacityBelowInitial {
                capacity: 8,
                max_capacity: 4
            }
        );
    }

    #[test]
    fn max_capacity_equal_to_initial_is_fine() {
        let pool = ResizableDensePool::builder()
            .capacity(4)
            .max_capacity(4)
            .factory(|| 0_u32)
            .build()
            .unwrap();

        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn builder_debug_reports_configuration() {
        let builder = DensePool::builder().capacity(2).factory(|| 0_u16);
        let output = format!("{builder:?}");

        assert!(output.contains("has_factory: true"));
        assert!(output.contains("capacity: 2"));
    }
}
