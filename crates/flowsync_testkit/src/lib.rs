//! # Flowsync Testkit
//!
//! Test utilities for Flowsync.
//!
//! This crate provides:
//! - Service fixtures and the demo product catalog
//! - Property-based test generators using proptest
//! - Common sync scenarios (populated, fully synced)
//!
//! ## Usage
//!
//! ```rust
//! use flowsync_testkit::with_demo_service;
//!
//! with_demo_service(|service| {
//!     let report = service.trigger_heartbeat(1_000).unwrap();
//!     assert!(report.new_rows > 0);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
