//! # logship Testkit
//!
//! Test utilities for logship.
//!
//! This crate provides:
//! - A fault-injecting [`LogStorage`](logship_storage::LogStorage) wrapper
//! - Recording doubles for the sync trigger, upload strategy and status store
//! - Collector fixtures
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use logship_testkit::prelude::*;
//! use logship_storage::LogStorage;
//!
//! let plan = SharedFaultPlan::default();
//! plan.lock().fail_add = true;
//!
//! let mut collector = collector_with_storage(Box::new(FaultyStorage::new(plan.clone())));
//! assert!(collector.add_record("dropped").is_err());
//! assert_eq!(plan.lock().buffer_releases, 1);
//! assert_eq!(collector.storage().unwrap().total_size(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod doubles;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::doubles::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use doubles::*;
pub use fixtures::*;
pub use generators::*;
