//! Chunk segmentation: splits normalized document text into overlapping
//! retrievable units.
//!
//! Two strategies are provided. The fixed-window strategy slides an
//! overlapping character window with optional sentence snapping; the
//! header-aware strategy groups lines into header-tagged sections first and
//! only falls back to windows inside oversized sections. [`StrategyPolicy`]
//! picks between them from structural signals in the document.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod fixed;
pub mod header;
pub mod strategy;

pub use fixed::{normalize_whitespace, FixedWindowChunker};
pub use header::HeaderAwareChunker;
pub use strategy::{ChunkStrategy, StrategyPolicy};
