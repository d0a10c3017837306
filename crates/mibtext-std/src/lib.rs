//! mibtext-std: filesystem conveniences around `mibtext-core`.
//!
//! Directory batch loading with a pluggable front end, skip lists, a
//! `tracing`-backed load reporter, and a fingerprinted store cache for
//! fast startup.

pub mod cache;
pub mod loader;
pub mod report;
pub mod skiplist;

pub use cache::{load_cache, load_cache_verified, save_cache, CacheError};
pub use loader::{BatchLoader, LoadError};
pub use report::TracingReporter;
pub use skiplist::SkipList;

pub use mibtext_core;
