//! SQLite backend for the Trattoria engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
