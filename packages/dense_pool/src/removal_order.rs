/// Determines how a [`ResizableDensePool`][crate::ResizableDensePool] closes the hole left
/// behind when an item is returned.
///
/// By default, the last live item is moved into the hole, which is O(1) but does not preserve
/// the relative order of the live items.
///
/// # Examples
///
/// ```
/// use dense_pool::{RemovalOrder, ResizableDensePool};
///
/// let pool = ResizableDensePool::builder()
///     .capacity(8)
///     .max_capacity(64)
///     .factory(|| 0_u32)
///     .removal_order(RemovalOrder::Ordered)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.removal_order(), RemovalOrder::Ordered);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum RemovalOrder {
    /// The last live item is moved into the vacated slot. This is the default.
    ///
    /// Removal is O(1) but the relative order of the live items changes.
    #[default]
    Unordered,

    /// Every live item after the vacated slot is shifted down by one slot.
    ///
    /// Removal is O(k) where k is the number of live items after the removed one, in exchange
    /// for the live items always remaining in the order they were requested in.
    Ordered,
}
