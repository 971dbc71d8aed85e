//! SQLite catalog of books and their authors.
//!
//! The catalog is the source of truth for everything that has been ingested.
//!
//! # Architecture
//! The catalog stores two entity types:
//! - **Authors**: identified by exact name, with an optional lifespan. An
//!   author exists only while at least one book references it.
//! - **Books**: identified by the id the upstream source assigned them, each
//!   referencing exactly one author.
//!
//! All writes go through a [`Transaction`]; single-call methods on the
//! [`Repository`] open and commit one for you.

mod db;
pub mod error;
pub mod models;
mod repo;
mod transaction;

pub use crate::db::Database;
pub use crate::repo::Repository;
pub use crate::transaction::Transaction;
