//! Boxed callback types that pools store at construction time.

/// Produces a fresh item for a newly allocated slot.
pub(crate) type Factory<T> = Box<dyn FnMut() -> T>;

/// Resets an item in place to its logical empty state. Used both for the `on_return` callback
/// of reference-style pools and for the `on_clear` and `on_init` callbacks of value pools.
pub(crate) type Reset<T> = Box<dyn FnMut(&mut T)>;

/// Copies the logical state of the first item into the second.
pub(crate) type Relocate<T> = Box<dyn FnMut(&T, &mut T)>;

/// Callback used when the client does not supply one.
#[must_use]
pub(crate) fn no_reset<T>() -> Reset<T> {
    Box::new(|_| {})
}
