//! Document processing pipeline: segmentation, embedding, and indexing,
//! driven by a small per-document state machine.
//!
//! The pipeline owns every status transition (`pending -> processing ->
//! ready`, or `-> failed`); the caller's persistence layer only observes
//! them through the `DocumentRepository` trait.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod lifecycle;

pub use lifecycle::{LifecycleManager, ProcessingReport};
