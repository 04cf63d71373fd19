//! # TTL Registry
//!
//! An in-memory registry mapping opaque numeric identifiers to expiration
//! timestamps, with a reverse index from expiration timestamp to the set of
//! identifiers expiring at that second.
//!
//! ## Features
//!
//! - Forward index (identifier → expiry) as the source of truth, reverse
//!   index (expiry → identifiers) so a sweep only touches elapsed buckets
//! - Every read cross-checks both indices and reports disagreement as a
//!   distinct error instead of tolerating it
//! - Thread-safe: one reader/writer lock spans both indices, so reads never
//!   observe a half-applied update or sweep
//! - Optional background sweeper task per registry instance
//!
//! ## Example
//!
//! ```rust
//! use ttl_registry::{Registry, EXPIRED};
//!
//! let registry = Registry::new();
//!
//! // Record an expiration for identifier 42
//! registry.set_ttl(42, 1_900_000_000);
//! assert_eq!(registry.ttl(42).unwrap(), 1_900_000_000);
//!
//! // Mark it expired immediately; it stays queryable until swept
//! registry.expire(42);
//! assert_eq!(registry.ttl(42).unwrap(), EXPIRED);
//!
//! // Reclaim everything whose expiry has passed
//! registry.sweep(1_900_000_000);
//! assert!(registry.ttl(42).is_err());
//! ```
//!
//! ## Background sweeping
//!
//! ```rust,no_run
//! use ttl_registry::{Registry, Sweeper, SweeperConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Registry::new();
//!
//!     let config = SweeperConfig::default()
//!         .with_sweep_interval(Duration::from_secs(30));
//!     let sweeper = Sweeper::spawn(registry.clone(), config);
//!
//!     registry.set_ttl(7, ttl_registry::unix_now() + 300);
//!
//!     // ... later, stop the sweeper
//!     registry.shutdown();
//!     sweeper.await.unwrap();
//! }
//! ```

mod config;
mod error;
mod registry;
mod sweeper;

pub use config::SweeperConfig;
pub use error::TtlError;
pub use registry::{Registry, EXPIRED};
pub use sweeper::{unix_now, Sweeper};
