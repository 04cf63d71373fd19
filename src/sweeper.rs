//! Background sweep task.
//!
//! The registry itself never sweeps on its own; spawn a [`Sweeper`] to
//! reclaim elapsed identifiers on a timer, or call
//! [`Registry::sweep`](crate::Registry::sweep) directly.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SweeperConfig;
use crate::registry::Registry;

/// Current wall-clock time as Unix-epoch seconds.
///
/// This is the clock the sweeper passes to
/// [`Registry::sweep`](crate::Registry::sweep); callers invoking sweeps
/// manually against real time can use it too.
pub fn unix_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
        // Clock before the epoch: treat as time zero, nothing has elapsed
        Err(_) => 0,
    }
}

/// Periodic sweep task for a [`Registry`].
///
/// Runs [`Registry::sweep`](crate::Registry::sweep) against the wall clock
/// on a fixed interval until [`Registry::shutdown`](crate::Registry::shutdown)
/// is called.
///
/// # Example
///
/// ```rust,no_run
/// use ttl_registry::{Registry, Sweeper, SweeperConfig};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let registry = Registry::new();
///     let config = SweeperConfig::default()
///         .with_sweep_interval(Duration::from_secs(30));
///     let handle = Sweeper::spawn(registry.clone(), config);
///
///     // ...
///
///     registry.shutdown();
///     handle.await.unwrap();
/// }
/// ```
pub struct Sweeper {
    registry: Registry,
    interval: Duration,
    /// Subscribed at construction so a shutdown sent before the task first
    /// polls is still observed
    shutdown_rx: watch::Receiver<bool>,
}

impl Sweeper {
    /// Creates a sweeper for the given registry.
    pub fn new(registry: Registry, config: SweeperConfig) -> Self {
        let shutdown_rx = registry.subscribe_shutdown();
        Self {
            registry,
            interval: config.sweep_interval,
            shutdown_rx,
        }
    }

    /// Spawns the sweeper as a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn spawn(registry: Registry, config: SweeperConfig) -> JoinHandle<()> {
        tokio::spawn(Self::new(registry, config).run())
    }

    /// Runs the sweep loop until shutdown is signalled.
    pub async fn run(self) {
        let Sweeper {
            registry,
            interval,
            mut shutdown_rx,
        } = self;

        let mut ticker = tokio::time::interval(interval);
        // Skip the immediate first tick; wait a full interval before sweeping
        ticker.tick().await;

        info!(interval_secs = interval.as_secs(), "expiry sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = registry.sweep(unix_now());
                    if removed > 0 {
                        debug!(removed, "swept expired identifiers");
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("expiry sweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TtlError;

    #[tokio::test]
    async fn test_background_sweep_removes_elapsed() {
        let registry = Registry::new();
        registry.set_ttl(1, unix_now() + 600);
        registry.expire(2);

        let config = SweeperConfig::default().with_sweep_interval(Duration::from_millis(20));
        let _handle = Sweeper::spawn(registry.clone(), config);

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(registry.ttl(2), Err(TtlError::NoSuchIdentifier));
        assert!(registry.ttl(1).is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_stops_sweeper() {
        let registry = Registry::new();
        let config = SweeperConfig::default().with_sweep_interval(Duration::from_millis(10));
        let handle = Sweeper::spawn(registry.clone(), config);

        registry.shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop after shutdown")
            .expect("sweeper task panicked");
    }

    #[tokio::test]
    async fn test_no_sweep_before_first_interval() {
        let registry = Registry::new();
        registry.expire(1);

        let config = SweeperConfig::default().with_sweep_interval(Duration::from_secs(3600));
        let _handle = Sweeper::spawn(registry.clone(), config);

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Interval has not elapsed; the expired entry is still queryable
        assert_eq!(registry.ttl(1), Ok(crate::registry::EXPIRED));
    }

    #[test]
    fn test_unix_now_is_past_2020() {
        assert!(unix_now() > 1_577_836_800);
    }
}
