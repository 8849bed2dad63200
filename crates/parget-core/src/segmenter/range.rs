//! Chunk descriptor and fixed-size range planning.

/// A contiguous byte range of the remote file, plus its bytes once fetched.
///
/// Created empty by the planner, filled by a download worker, consumed by the
/// merge writer. Only one stage holds a given chunk at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Start offset (inclusive).
    pub offset: u64,
    /// Number of bytes requested.
    pub length: u64,
    /// Bytes received from the server; empty until fetched.
    pub data: Vec<u8>,
}

impl Chunk {
    pub fn new(offset: u64, length: u64) -> Self {
        Self {
            offset,
            length,
            data: Vec::new(),
        }
    }

    /// End offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Number of chunks `plan_chunks(total_size, chunk_size)` yields.
pub fn chunk_count(total_size: u64, chunk_size: u64) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    total_size.div_ceil(chunk_size) as usize
}

/// Iterator over the chunks covering `[0, total_size)`.
///
/// Offsets are `0, chunk_size, 2*chunk_size, ...`; the last chunk is
/// `total_size - offset` long when that is smaller than `chunk_size`.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    next_offset: u64,
    total_size: u64,
    chunk_size: u64,
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.chunk_size == 0 || self.next_offset >= self.total_size {
            return None;
        }
        let offset = self.next_offset;
        let length = self.chunk_size.min(self.total_size - offset);
        self.next_offset = offset + length;
        Some(Chunk::new(offset, length))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = chunk_count(
            self.total_size.saturating_sub(self.next_offset),
            self.chunk_size,
        );
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkPlan {}

/// Plans fixed-size chunks for a file of `total_size` bytes.
///
/// Yields nothing if `total_size` or `chunk_size` is 0.
pub fn plan_chunks(total_size: u64, chunk_size: u64) -> ChunkPlan {
    ChunkPlan {
        next_offset: 0,
        total_size,
        chunk_size,
    }
}
