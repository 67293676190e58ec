// src/db/mod.rs
//
// Database module
//
// Provides:
// - Connection pooling
// - Transaction scoping
// - Schema migrations

pub mod connection;
pub mod migrations;

pub use connection::{
    create_connection_pool, create_test_connection, get_connection, with_read_transaction, with_write_transaction,
    ConnectionPool, PooledConn,
};

pub use migrations::{
    get_database_stats, initialize_database, verify_database_integrity, DatabaseStats,
};
