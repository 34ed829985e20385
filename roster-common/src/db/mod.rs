//! SQLite storage layer

pub mod init;
pub mod store;

pub use init::init_database;
