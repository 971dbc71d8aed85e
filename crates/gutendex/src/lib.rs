//! Candidate book records and lookup clients for Gutendex-style search APIs.
//!
//! The lookup is a collaborator of the catalog: it turns a free-text title
//! into zero or more [`Candidate`](models::Candidate) records and knows
//! nothing about persistence.

pub mod error;
pub mod lookup;
pub mod models;
mod parse;

pub use crate::lookup::{Lookup, LookupHandle};
pub use crate::parse::{parse_search_page, parse_search_text};
