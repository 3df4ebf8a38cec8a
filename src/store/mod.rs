//! Persistence layer: libSQL-backed storage for clients, designers and portfolios.

pub mod libsql_backend;
pub mod migrations;
pub mod models;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, ProvisionedDesigner};
