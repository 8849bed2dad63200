//! Chunk planning.
//!
//! Splits `[0, total_size)` into fixed-size byte ranges handed to the download
//! workers in increasing offset order.

mod range;

pub use range::{chunk_count, plan_chunks, Chunk, ChunkPlan};
