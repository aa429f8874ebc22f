use std::io;
use thiserror::Error;

use crate::common::file_operations::FileOperationError;
use crate::core::{BlockId, CodecError, DocId, ListKind, WordId};

/// Reasons an [`crate::IndexReader`] refuses to open an index file.
///
/// Every variant means the file is not a finished HYB index: either the
/// build was interrupted before the trailing pointer was written, or the
/// bytes were damaged afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexCorruption {
    #[error("file is {len} bytes, too short to hold the trailing pointer")]
    MissingTrailer { len: u64 },

    #[error("trailing pointer {pointer} is outside of the offset table region (file len {len})")]
    PointerOutOfRange { pointer: u64, len: u64 },

    #[error("block offset table spans {bytes} bytes, which is not a multiple of 8")]
    MisalignedOffsetTable { bytes: u64 },

    #[error("block offset table has {entries} entries, at least 3 are required")]
    OffsetTableTooShort { entries: usize },

    #[error("block offset table is not strictly increasing at entry {index}")]
    OffsetsNotIncreasing { index: usize },

    #[error("block offset table does not start at 0 (first entry is {first})")]
    OffsetTableStart { first: u64 },

    #[error("meta info record is {actual} bytes, expected {expected}")]
    MetaInfoSize { actual: u64, expected: usize },

    #[error("boundary word id table is {actual} bytes, expected {expected}")]
    BoundaryTableSize { actual: u64, expected: u64 },

    #[error("meta info reports {meta} blocks but the offset table holds {table}")]
    BlockCountMismatch { meta: u64, table: usize },

    #[error("boundary word ids are not strictly increasing at entry {index}")]
    BoundariesNotIncreasing { index: usize },

    #[error("first boundary word id must be 0, found {first}")]
    FirstBoundaryNotZero { first: WordId },

    #[error("unknown index mode flags {0:#x}")]
    UnknownModeFlags(u32),

    #[error("block {block} is malformed: {reason}")]
    MalformedBlock { block: BlockId, reason: String },
}

/// The library's error enum.
#[derive(Debug, Error)]
pub enum HybError {
    /// IO Error, with the OS error text.
    #[error("An IO error occurred: '{0}'")]
    Io(#[from] io::Error),

    #[error(transparent)]
    FileOperation(#[from] FileOperationError),

    #[error("Words not in sorted order ('{previous}' -> '{current}') at record #{record}")]
    UnsortedWords { previous: String, current: String, record: u64 },

    #[error("Non-consecutive word ids ({previous:?} -> {current}) at record #{record}")]
    NonConsecutiveWordIds { previous: Option<WordId>, current: WordId, record: u64 },

    #[error("Word id {word_id} is not covered by the vocabulary of {vocabulary_len} words at record #{record}")]
    WordIdOutOfVocabulary { word_id: WordId, vocabulary_len: usize, record: u64 },

    #[error("Vocabulary must be sorted, '{current}' added after '{previous}'")]
    UnsortedVocabulary { previous: String, current: String },

    #[error("Boundary prefixes not in sorted order ('{previous}' -> '{current}') at prefix #{index}")]
    UnsortedBoundaries { previous: String, current: String, index: usize },

    #[error("Postings stream is empty")]
    EmptyStream,

    #[error("Score must be positive, got 0 for doc {doc_id} at record #{record}")]
    InvalidScore { doc_id: DocId, record: u64 },

    #[error("Malformed record #{record}: {reason}")]
    MalformedRecord { record: u64, reason: String },

    #[error("Invalid build config: '{0}'")]
    InvalidConfig(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A list did not survive `decompress(compress(x)) == x`. Writing the block
    /// anyway would leave a corrupt index behind.
    #[error("Round trip check failed for the {list} list of block {block}")]
    CodecInvariant { list: ListKind, block: BlockId },

    #[error("Index file is corrupted: {0}")]
    Corrupted(#[from] IndexCorruption),

    #[error("Block {block} out of range, index holds {block_count} blocks")]
    BlockOutOfRange { block: BlockId, block_count: usize },

    #[error("Failed to set up logger: '{0}'")]
    Logger(String),
}

impl From<serde_json::Error> for HybError {
    fn from(error: serde_json::Error) -> HybError {
        HybError::FileOperation(FileOperationError::SerdeJsonError(error))
    }
}
