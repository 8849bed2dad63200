//! Destination file lifecycle.
//!
//! Creates (or truncates) the output file, preallocates it to the exact remote
//! size (fallocate on Unix when available, else set_len), and writes chunks at
//! explicit offsets. Owned by the merge writer alone.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;
