// Database service module
// SQLite connection and schema management for the task/event stores

mod connection;
pub mod migrations;
mod schema;

pub use connection::Database;
