//! Query modules for the results store.
//!
//! Each module provides a query struct that borrows either a
//! [`Connection`](crate::connection::Connection) or a
//! [`PrimaryStore`](crate::store::PrimaryStore) and returns `Result<T>`.

pub mod aggregations;
pub mod results;

pub use aggregations::AggregationQuery;
pub use results::ResultQuery;
