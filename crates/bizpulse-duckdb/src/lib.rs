pub mod analytics_impl;
pub mod backend;
pub mod filters;
pub mod queries;
pub mod schema;

pub use backend::DuckDbBackend;
pub use filters::{Filter, FilterOp, FilterValue, Table};

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `bizpulse_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
