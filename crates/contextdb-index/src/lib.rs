//! Vector index client: stores and retrieves embedded chunks with payloads
//! and typed metadata filters.
//!
//! The concrete client targets a Qdrant-style REST service; everything else
//! in the workspace depends only on the `VectorIndex` trait from
//! `contextdb-core`, so the backend stays swappable.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod point;
pub mod qdrant;

pub use point::{point_id, sanitize_payload};
pub use qdrant::QdrantIndex;
