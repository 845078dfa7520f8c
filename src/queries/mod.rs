//! Query modules for the Triplog SDK.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) (or the
//! [`StoreManager`](crate::store::StoreManager) for JSON-document queries)
//! and exposes methods returning `Result<T>` with typed model payloads.

pub mod languages;
pub mod positions;
pub mod trips;

pub use languages::LanguageQuery;
pub use positions::PositionQuery;
pub use trips::{SearchTripsParams, TripQuery};
