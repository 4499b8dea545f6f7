use std::fmt;

use crate::callbacks::{Relocate, Reset};
use crate::error::Result;
use crate::{Error, ValuePool};

/// Builder for creating an instance of [`ValuePool`].
///
/// The `on_clear` and `on_move` callbacks are mandatory, whereas other settings are optional.
/// The initial capacity defaults to zero and the maximum capacity to [`usize::MAX`].
///
/// # Example
///
/// ```
/// use dense_pool::ValuePool;
///
/// let pool = ValuePool::builder()
///     .capacity(8)
///     .max_capacity(64)
///     .on_clear(|value: &mut (u32, f32)| *value = (0, 0.0))
///     .on_move(|from: &(u32, f32), to: &mut (u32, f32)| *to = *from)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.capacity(), 8);
/// ```
#[must_use]
pub struct ValuePoolBuilder<T> {
    capacity: usize,
    max_capacity: usize,
    on_clear: Option<Reset<T>>,
    on_move: Option<Relocate<T>>,
    on_init: Option<Reset<T>>,
}

impl<T: Default> ValuePoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            max_capacity: usize::MAX,
            on_clear: None,
            on_move: None,
            on_init: None,
        }
    }

    /// Sets the number of slots created when the pool is built.
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the capacity that the pool will never grow beyond.
    #[inline]
    pub fn max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Sets the callback that resets an item to its logical empty state when it is returned,
    /// when the pool is cleared and when a slot is vacated by relocation.
    #[inline]
    pub fn on_clear(mut self, on_clear: impl FnMut(&mut T) + 'static) -> Self {
        self.on_clear = Some(Box::new(on_clear));
        self
    }

    /// Sets the callback that copies the logical state of one item into another.
    ///
    /// The pool uses it to fill the hole left by a returned item with the last live item, and
    /// to copy items in from another pool in [`ValuePool::append()`].
    #[inline]
    pub fn on_move(mut self, on_move: impl FnMut(&T, &mut T) + 'static) -> Self {
        self.on_move = Some(Box::new(on_move));
        self
    }

    /// Sets a callback that prepares every freshly created slot, for example by allocating
    /// buffers that the item keeps for its whole lifetime.
    ///
    /// It runs once per slot, right after the slot is created with [`Default`], both when the
    /// pool is built and when it grows.
    #[inline]
    pub fn on_init(mut self, on_init: impl FnMut(&mut T) + 'static) -> Self {
        self.on_init = Some(Box::new(on_init));
        self
    }

    /// Builds the pool, creating and initializing every slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCallback`] if `on_clear` or `on_move` has not been set, or
    /// [`Error::MaxCapacityBelowInitial`] if the maximum capacity is below the initial one.
    pub fn build(self) -> Result<ValuePool<T>> {
        if self.max_capacity < self.capacity {
            return Err(Error::MaxCapacityBelowInitial {
                capacity: self.capacity,
                max_capacity: self.max_capacity,
            });
        }

        let on_clear = self.on_clear.ok_or(Error::MissingCallback {
            callback: "on_clear",
        })?;
        let on_move = self.on_move.ok_or(Error::MissingCallback {
            callback: "on_move",
        })?;

        Ok(ValuePool::new_inner(
            self.capacity,
            self.max_capacity,
            on_clear,
            on_move,
            self.on_init,
        ))
    }
}

impl<T> fmt::Debug for ValuePoolBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuePoolBuilder")
            .field("capacity", &self.capacity)
            .field("max_capacity", &self.max_capacity)
            .field("has_on_clear", &self.on_clear.is_some())
            .field("has_on_move", &self.on_move.is_some())
            .field("has_on_init", &self.on_init.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_callbacks_are_reported_by_name() {
        let result = ValuePool::<u32>::builder()
            .on_move(|from: &u32, to: &mut u32| *to = *from)
            .build();
        assert_eq!(
            result.unwrap_err(),
            Error::MissingCallback {
                callback: "on_clear"
            }
        );

        let result = ValuePool::<u32>::builder()
            .on_clear(|value: &mut u32| *value = 0)
            .build();
        assert_eq!(
            result.unwrap_err(),
            Error::MissingCallback {
                callback: "on_move"
            }
        );
    }

    #[test]
    fn max_capacity_below_initial_is_an_error() {
        let result = ValuePool::<u32>::builder()
            .capacity(10)
            .max_capacity(5)
            .on_clear(|value: &mut u32| *value = 0)
            .on_move(|from: &u32, to: &mut u32| *to = *from)
            .build();

        assert!(matches!(
            result,
            Err(Error::MaxCapacityBelowInitial {
                capacity: 10,
                max_capacity: 5
            })
        ));
    }

    #[test]
    fn debug_lists_configured_callbacks() {
        let builder = ValuePool::<u32>::builder()
            .capacity(3)
            .on_clear(|value: &mut u32| *value = 0);

        let output = format!("{builder:?}");

        assert!(output.contains("has_on_clear: true"));
        assert!(output.contains("has_on_move: false"));
    }
}
