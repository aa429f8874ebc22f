//! Readers for the sorted postings stream an index is built from.

mod ascii_reader;
mod binary_reader;

pub use ascii_reader::AsciiPostingReader;
pub use binary_reader::{BinaryPostingReader, BINARY_RECORD_SIZE};

use crate::common::errors::HybError;
use crate::core::common::{DocId, Position, Score, WordId};

/// The word of a posting, spelled out (ascii input) or already resolved
/// against a vocabulary (binary input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingWord<'a> {
    Text(&'a str),
    Id(WordId),
}

/// One record of the postings stream. `record` is the 1-based line or record
/// number, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPosting<'a> {
    pub word: PostingWord<'a>,
    pub doc_id: DocId,
    pub score: Score,
    pub position: Position,
    pub record: u64,
}

/// A pull based source of postings, sorted by word then by doc id.
pub trait PostingStream {
    /// `Ok(None)` at the end of the stream.
    fn next_posting(&mut self) -> Result<Option<RawPosting<'_>>, HybError>;

    /// Number of records read so far, including skipped ones.
    fn record_number(&self) -> u64;

    /// Records that could not be parsed and were skipped.
    fn malformed_records(&self) -> u64 {
        0
    }
}
