//! Dense object pools that hand out stable identifiers while keeping live items contiguous.
//!
//! This crate provides a family of pools for workloads that request and return many small items
//! at a high rate and iterate over all live items frequently, such as particles, projectiles or
//! timers in a simulation loop. All items are created up front (or when the pool grows) and are
//! reused afterwards, so steady-state operation does not allocate.
//!
//! # Pools
//!
//! - [`DensePool`] has a fixed capacity. Requests fail with `None` once every slot is live.
//! - [`GrowableDensePool`] grows by one item whenever it runs out of free slots.
//! - [`ResizableDensePool`] doubles its capacity on demand, up to a configured maximum, and can
//!   optionally preserve the relative order of live items on removal (see [`RemovalOrder`]).
//! - [`ValuePool`] stores plain values that are relocated through a client-supplied copy
//!   callback rather than swapped, which suits items embedding per-slot buffers.
//! - [`FreeSlotPool`] and [`GrowableFreeSlotPool`] never move items at all. They track free
//!   slots with flags and find them with a round-robin scan.
//!
//! # Identifiers
//!
//! The dense pools keep every live item within a contiguous prefix of storage. When an item is
//! returned, another item may be moved into the hole it leaves. To let callers keep referring to
//! items across such moves, each slot has a permanent identifier and the pool maintains a
//! bidirectional mapping between identifiers and storage indices. An identifier keeps resolving
//! to the same item from the moment it is requested until it is returned.
//!
//! Items that implement [`Poolable`] can be requested and returned directly; the pool stamps the
//! identifier (or slot index, for free-slot pools) into the item when it is requested.
//!
//! # Example
//!
//! ```rust
//! use dense_pool::DensePool;
//!
//! let mut pool = DensePool::builder()
//!     .capacity(100)
//!     .factory(|| (0.0_f32, 0.0_f32))
//!     .on_return(|position| *position = (0.0, 0.0))
//!     .build()
//!     .unwrap();
//!
//! let a = pool.request_id().unwrap();
//! let b = pool.request_id().unwrap();
//! *pool.get_mut(b).unwrap() = (1.0, 2.0);
//!
//! pool.return_id(a);
//!
//! // Iterating over live items is a plain slice walk.
//! for position in pool.live_mut() {
//!     position.0 += 1.0;
//! }
//!
//! assert_eq!(pool.get(b), Some(&(2.0, 2.0)));
//! ```
//!
//! # Exhaustion and contract violations
//!
//! Running out of capacity is an ordinary outcome and is reported as `None`. Returning an
//! identifier that is not live is a caller error that is only detected by assertions in debug
//! builds. Configuration mistakes, such as a missing factory callback, are reported as an
//! [`Error`] when the pool is built.
//!
//! # Thread safety
//!
//! All pools are single-owner structures that store arbitrary client callbacks. They are neither
//! [`Send`] nor [`Sync`].

mod builder;
mod callbacks;
mod error;
mod free_slot;
mod growable;
mod id_map;
mod pool;
mod poolable;
mod removal_order;
mod resizable;
mod slots;
mod value_builder;
mod value_pool;

pub use builder::{
    DensePoolBuilder, FreeSlotPoolBuilder, GrowableDensePoolBuilder, GrowableFreeSlotPoolBuilder,
    ResizableDensePoolBuilder,
};
pub use error::Error;
pub use free_slot::{FreeSlotPool, GrowableFreeSlotPool, SlotIter};
pub use growable::GrowableDensePool;
pub(crate) use id_map::IdMap;
pub use pool::DensePool;
pub use poolable::Poolable;
pub use removal_order::RemovalOrder;
pub use resizable::ResizableDensePool;
pub(crate) use slots::DenseSlots;
pub use slots::{Iter, IterMut};
pub use value_builder::ValuePoolBuilder;
pub use value_pool::ValuePool;
