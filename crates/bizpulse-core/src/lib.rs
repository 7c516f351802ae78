pub mod analytics;
pub mod buckets;
pub mod config;
pub mod error;
pub mod event;
pub mod ranking;
