//! # memocache
//!
//! Bounded LRU memoization cache for pure functions.
//!
//! ## Architecture
//! - **Index**: AHash map from key to arena slot (O(1))
//! - **Recency list**: intrusive doubly-linked list over the arena (O(1))
//! - **Guard**: one `parking_lot` mutex, never held while the wrapped
//!   function runs
//!
//! ```
//! use memocache::MemoCache;
//!
//! let cache = MemoCache::new(5, |n: u64| (1..=n).product::<u64>());
//! assert_eq!(cache.call(5), 120);
//! assert_eq!(cache.call(5), 120);
//! assert_eq!(cache.stats().hits(), 1);
//! ```

#![warn(missing_docs)]

mod cache;
mod error;
mod lru;
mod stats;

pub use cache::{MemoCache, U64Cache};
pub use error::{Error, Result};
pub use lru::{Keys, LruCache};
pub use stats::{CacheStats, StatsSnapshot};
