//! Retrieval and augmentation engine.
//!
//! Turns a user query into an augmented prompt: embed the query, search
//! the vector index within a document scope, fuse semantic and keyword
//! scores, re-rank, and wrap the survivors in an instruction template with
//! citations. Falls back to the unmodified query whenever nothing relevant
//! is found.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod engine;
pub mod keywords;
pub mod limits;
pub mod prompt;
pub mod scoring;

pub use engine::{RetrievalEngine, RetrievedContext};
pub use limits::LimitPolicy;
pub use scoring::HybridResult;
