//! Shared domain model for the contextdb retrieval pipeline.
//!
//! Holds the types that cross crate boundaries (documents, chunks, index
//! points, search results, payload filters), the error taxonomy, the
//! capability traits implemented by the embedding/index/persistence crates,
//! embedding settings resolution, and the Figment configuration loader.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod filter;
pub mod settings;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
