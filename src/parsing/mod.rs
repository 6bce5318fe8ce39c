//! Physical-format handling: compression wrappers and block framing.

pub mod compression;
pub mod framing;

pub use compression::{Compression, decompress_bytes, detect_compression, read_decompressed};
pub use framing::{
    BLOCK_SIZE_BYTES, BLOCK_SIZE_BYTES_THIN, BLOCK_SIZE_WORDS, BLOCK_SIZE_WORDS_THIN, BlockCursor,
    BlockIter, Framing, RECORD_MARKER_BYTES, block_size_bytes, detect_framing, iter_blocks,
};
