//! Triplog SDK for Rust.
//!
//! Provides a high-level client for querying GPS tracker telemetry exported
//! by the Triplog platform. Exports are downloaded as NDJSON and JSON files,
//! kept in a local data directory, loaded into an in-process DuckDB database,
//! and queried through typed, per-domain interfaces. Derived data (the trip
//! movement/speed statistics) is computed in Rust and written back onto the
//! trip rows.
//!
//! # Quick start
//!
//! ```no_run
//! use triplog_sdk::TriplogSdk;
//!
//! let sdk = TriplogSdk::builder().build().unwrap();
//!
//! // Query a trip and its trail
//! let trip = sdk.trips().get_by_id(42).unwrap();
//! let trail = sdk.positions().by_trip(42).unwrap();
//!
//! // Recompute the trip's movement/speed stats
//! let trip = sdk.update_stats().run(42).unwrap();
//! ```

pub mod actions;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod seed;
pub mod sql_builder;
pub mod stats;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncTriplogSdk;
pub use connection::Connection;
pub use error::{Result, TriplogError};
pub use sql_builder::SqlBuilder;
pub use store::StoreManager;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// TriplogSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`TriplogSdk`] instance.
///
/// Use [`TriplogSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](TriplogSdkBuilder::build) to create the SDK.
pub struct TriplogSdkBuilder {
    data_dir: Option<PathBuf>,
    offline: bool,
    in_memory: bool,
    timeout: Duration,
}

impl Default for TriplogSdkBuilder {
    fn default() -> Self {
        Self {
            data_dir: None,
            offline: false,
            in_memory: false,
            timeout: Duration::from_secs(120),
        }
    }
}

impl TriplogSdkBuilder {
    /// Set a custom data directory.
    ///
    /// If not set, the platform-appropriate default cache directory is used
    /// (e.g. `~/.cache/triplog-sdk` on Linux, `~/Library/Caches/triplog-sdk`
    /// on macOS, `%LOCALAPPDATA%\triplog-sdk` on Windows).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable offline mode.
    ///
    /// When offline, the SDK never downloads from the platform and only uses
    /// previously downloaded export files. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Use an in-memory database instead of the `triplog.duckdb` file in the
    /// data directory.
    ///
    /// In-memory databases start empty every run; stats written back to trip
    /// rows live only as long as the SDK. Defaults to `false`.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Set the HTTP request timeout for export downloads.
    ///
    /// Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the SDK, initializing the store and DuckDB connection.
    ///
    /// This may trigger a staleness check against the platform (unless
    /// offline mode is enabled) but does **not** download any export files
    /// eagerly -- they are fetched lazily on first query.
    pub fn build(self) -> Result<TriplogSdk> {
        let store = StoreManager::new(self.data_dir, self.offline, self.timeout)?;
        let conn = Connection::new(store, self.in_memory)?;
        Ok(TriplogSdk { conn })
    }
}

// ---------------------------------------------------------------------------
// TriplogSdk
// ---------------------------------------------------------------------------

/// The main entry point for the Triplog SDK.
///
/// Wraps a [`Connection`] (which owns the [`StoreManager`] and DuckDB
/// database) and exposes domain-specific query interfaces as lightweight
/// borrowing wrappers.
///
/// Created via [`TriplogSdk::builder()`].
pub struct TriplogSdk {
    conn: Connection,
}

impl TriplogSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> TriplogSdkBuilder {
        TriplogSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the trip query interface.
    ///
    /// Returns a lightweight wrapper that borrows from the underlying
    /// connection and provides methods for querying and updating trip rows.
    pub fn trips(&self) -> queries::trips::TripQuery<'_> {
        queries::trips::TripQuery::new(&self.conn)
    }

    /// Access the position query interface.
    pub fn positions(&self) -> queries::positions::PositionQuery<'_> {
        queries::positions::PositionQuery::new(&self.conn)
    }

    /// Access the language query interface.
    ///
    /// Language data is loaded from `languages.json` via the store manager.
    pub fn languages(&self) -> queries::languages::LanguageQuery<'_> {
        queries::languages::LanguageQuery::new(&self.conn)
    }

    // -- Action accessors --------------------------------------------------

    /// Access the stats-update action.
    ///
    /// Recomputes a trip's movement/speed summary from its position trail
    /// and overwrites the stored value.
    pub fn update_stats(&self) -> actions::update_stats::UpdateStats<'_> {
        actions::update_stats::UpdateStats::new(&self.conn)
    }

    /// Access the synthetic trip seeder.
    ///
    /// Useful for demos and tests: inserts a generated trip with a plausible
    /// position trail, creating the telemetry tables if needed.
    pub fn seed(&self) -> seed::TripSeeder<'_> {
        seed::TripSeeder::new(&self.conn)
    }

    // -- Metadata and utility methods --------------------------------------

    /// Load and return the export metadata (stamp, counts, etc.).
    ///
    /// Fetches `Meta.json` from the store (downloading if necessary) and
    /// returns the parsed JSON object.
    pub fn meta(&self) -> Result<serde_json::Value> {
        self.conn.store.borrow_mut().load_json("meta")
    }

    /// Return the list of currently loaded DuckDB table names.
    ///
    /// Tables are loaded lazily on first query, so this list grows as
    /// different query interfaces are used.
    pub fn tables(&self) -> Vec<String> {
        self.conn.tables()
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Provides escape-hatch access for queries not covered by the
    /// domain-specific interfaces.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    ///
    /// # Returns
    ///
    /// A vector of rows, each represented as a `HashMap<String, serde_json::Value>`.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Check for a newer export and reset tables if stale.
    ///
    /// Returns `true` if the local data was stale and tables were dropped
    /// (meaning subsequent queries will re-download exports), or `false` if
    /// already up to date.
    pub fn refresh(&self) -> Result<bool> {
        let stale = self.conn.store.borrow_mut().is_stale()?;
        if stale {
            self.conn.store.borrow().clear()?;
            self.conn.reset_tables();
            eprintln!("Triplog exports were stale; local files cleared and tables reset");
        }
        Ok(stale)
    }

    /// Consume the SDK and release all resources.
    ///
    /// Closes the DuckDB connection and HTTP client. This is called
    /// automatically when the SDK is dropped, but can be invoked explicitly
    /// for deterministic cleanup.
    pub fn close(self) {
        // Connection and StoreManager are dropped automatically
        drop(self);
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Return a mutable reference to the underlying [`Connection`].
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for TriplogSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.conn.tables();
        let store = self.conn.store.borrow();
        write!(
            f,
            "TriplogSdk(data_dir={}, tables=[{}], offline={})",
            store.data_dir.display(),
            tables.join(", "),
            store.offline
        )
    }
}
