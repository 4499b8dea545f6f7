/// An item that remembers its own position in a pool.
///
/// Pools that hand out item references instead of bare identifiers stamp the item with its
/// identifier (dense pools) or slot index (free-slot pools) when the item is requested. The item
/// then reports that value back when it is returned, so the caller does not need to keep track
/// of it separately.
///
/// # Example
///
/// ```
/// use dense_pool::Poolable;
///
/// #[derive(Default)]
/// struct Particle {
///     pool_index: usize,
///     x: f32,
/// }
///
/// impl Poolable for Particle {
///     fn pool_index(&self) -> usize {
///         self.pool_index
///     }
///
///     fn set_pool_index(&mut self, index: usize) {
///         self.pool_index = index;
///     }
/// }
/// ```
pub trait Poolable {
    /// The identifier or slot index most recently stamped into this item by a pool.
    fn pool_index(&self) -> usize;

    /// Records the identifier or slot index assigned to this item by a pool.
    fn set_pool_index(&mut self, index: usize);
}
