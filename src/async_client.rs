//! Async wrapper around [`TriplogSdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//! DuckDB queries are CPU-bound but fast, making this approach efficient.
//!
//! # Example
//!
//! ```no_run
//! use triplog_sdk::AsyncTriplogSdk;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncTriplogSdk::builder().build().await.unwrap();
//!
//!     // Run any sync SDK method via closure
//!     let trips = sdk.run(|s| {
//!         s.trips().search(&Default::default())
//!     }).await.unwrap();
//!
//!     // Convenience method for raw SQL
//!     let rows = sdk.sql("SELECT COUNT(*) FROM positions", &[]).await.unwrap();
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{Result, TriplogError};
use crate::models::Trip;
use crate::TriplogSdk;

// ---------------------------------------------------------------------------
// AsyncTriplogSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncTriplogSdk`] instance.
pub struct AsyncTriplogSdkBuilder {
    data_dir: Option<PathBuf>,
    offline: bool,
    in_memory: bool,
    timeout: Duration,
}

impl Default for AsyncTriplogSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            offline: false,
            in_memory: false,
            timeout: Duration::from_secs(120),
        }
    }
}

impl AsyncTriplogSdkBuilder {
    /// Set a custom data directory.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Use an in-memory database instead of the file in the data directory.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Set the HTTP request timeout for export downloads.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the async SDK, initializing the store and DuckDB connection.
    ///
    /// Initialization runs on the blocking thread pool so it won't block
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncTriplogSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = TriplogSdk::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            builder = builder
                .offline(self.offline)
                .in_memory(self.in_memory)
                .timeout(self.timeout);
            let sdk = builder.build()?;
            Ok(AsyncTriplogSdk {
                inner: Arc::new(Mutex::new(sdk)),
            })
        })
        .await
        .map_err(|e| TriplogError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncTriplogSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`TriplogSdk`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The underlying [`TriplogSdk`] is
/// protected by a [`Mutex`] since it uses `RefCell` internally.
///
/// # Usage
///
/// Use [`run()`](Self::run) to execute any sync SDK method:
///
/// ```no_run
/// # use triplog_sdk::AsyncTriplogSdk;
/// # async fn example() -> triplog_sdk::Result<()> {
/// let sdk = AsyncTriplogSdk::builder().build().await?;
/// let trips = sdk.run(|s| s.trips().search(&Default::default())).await?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncTriplogSdk {
    inner: Arc<Mutex<TriplogSdk>>,
}

impl AsyncTriplogSdk {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncTriplogSdkBuilder {
        AsyncTriplogSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives an `&TriplogSdk` reference and should return
    /// a `Result<T>`. The operation runs on a dedicated blocking thread,
    /// keeping the async event loop free.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use triplog_sdk::AsyncTriplogSdk;
    /// # async fn example() -> triplog_sdk::Result<()> {
    /// # let sdk = AsyncTriplogSdk::builder().build().await?;
    /// let samples = sdk.run(|s| {
    ///     s.positions().samples_by_trip(42)
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TriplogSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| TriplogError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TriplogError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Execute a raw SQL query asynchronously.
    ///
    /// Convenience wrapper around [`run()`](Self::run) for
    /// [`TriplogSdk::sql()`].
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |s| s.sql(&query, &params)).await
    }

    /// Recompute and persist one trip's stats asynchronously, returning the
    /// updated trip.
    pub async fn update_stats(&self, trip_id: i64) -> Result<Trip> {
        self.run(move |s| s.update_stats().run(trip_id)).await
    }

    /// Load and return the export metadata asynchronously.
    pub async fn meta(&self) -> Result<serde_json::Value> {
        self.run(|s| s.meta()).await
    }

    /// Check for a newer export and reset tables if stale.
    pub async fn refresh(&self) -> Result<bool> {
        self.run(|s| s.refresh()).await
    }

    /// Return the list of currently loaded DuckDB table names.
    pub async fn tables(&self) -> Result<Vec<String>> {
        self.run(|s| Ok(s.tables())).await
    }

    /// Close the SDK, releasing all resources.
    pub async fn close(self) -> Result<()> {
        tokio::task::spawn_blocking(move || {
            let sdk = self
                .inner
                .lock()
                .map_err(|_| TriplogError::InvalidArgument("SDK lock poisoned".into()))?;
            // Dropping the MutexGuard drops the SDK
            drop(sdk);
            Ok(())
        })
        .await
        .map_err(|e| TriplogError::InvalidArgument(format!("Task join error: {e}")))?
    }
}
