//! ch-glance - A small ClickHouse HTTP client.
//!
//! Sends SQL statements to the ClickHouse HTTP interface and turns the
//! `JSONCompact` responses into typed tables.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod output;
