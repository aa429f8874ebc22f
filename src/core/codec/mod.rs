//! Per-list compression for the lists stored in every block.
//!
//! Each codec is a pure function pair obeying
//! `decompress(compress(x), x.len(), mode) == x`.

mod doc_list_codec;
mod gaps;
mod position_list_codec;
pub mod simple9;
mod verify;
mod word_list_codec;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use doc_list_codec::DocListCodec;
pub use position_list_codec::PositionListCodec;
pub use verify::RoundTripVerifier;
pub use word_list_codec::WordListCodec;

/// How a list is transformed before it is packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GapMode {
    /// Values are packed as they are.
    Raw = 0,
    /// Values must be non-decreasing; deltas to the predecessor are packed.
    Gaps = 1,
    /// Deltas restart after every point where the sequence does not
    /// increase, e.g. positions of consecutive documents.
    GapsWithBoundaries = 2,
}

impl fmt::Display for GapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// The lists a block is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Doc,
    Position,
    Word,
    Score,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListKind::Doc => "doc id",
            ListKind::Position => "position",
            ListKind::Word => "word id",
            ListKind::Score => "score",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("value {value} exceeds the largest encodable value {max}")]
    ValueTooLarge { value: u32, max: u32 },

    #[error("values must be non-decreasing, violated at index {index}")]
    NotSorted { index: usize },

    #[error("codec '{codec}' does not support gap mode {mode}")]
    UnsupportedMode { codec: &'static str, mode: GapMode },

    #[error("compressed {codec} data is truncated")]
    Truncated { codec: &'static str },

    #[error("compressed {codec} data has {remaining} trailing bytes")]
    TrailingBytes { codec: &'static str, remaining: usize },

    #[error("invalid bit width {0}")]
    InvalidBitWidth(u8),

    #[error("invalid simple9 selector {0}")]
    InvalidSelector(u32),

    #[error("decoded value overflows u32")]
    Overflow,

    #[error("expected {expected} values, decoded {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("rank {rank} is outside of a codebook with {size} entries")]
    RankOutOfRange { rank: u32, size: usize },
}

/// A compress / decompress pair for one kind of `u32` list.
pub trait ListCodec: Send + Sync {
    fn name(&self) -> &'static str;

    /// Append the compressed form of `values` to `out` and return the number
    /// of bytes appended.
    fn compress_into(&self, values: &[u32], mode: GapMode, out: &mut Vec<u8>) -> Result<usize, CodecError>;

    fn compress(&self, values: &[u32], mode: GapMode) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.compress_into(values, mode, &mut out)?;
        Ok(out)
    }

    /// `bytes` must hold exactly one compressed list of `count` values.
    fn decompress(&self, bytes: &[u8], count: usize, mode: GapMode) -> Result<Vec<u32>, CodecError>;
}

/// Gap modes used for each list of an index file.
pub const DOC_LIST_MODE: GapMode = GapMode::Gaps;
pub const POSITION_LIST_MODE: GapMode = GapMode::GapsWithBoundaries;
pub const WORD_LIST_MODE: GapMode = GapMode::Raw;

/// The codecs chosen once per build (or per reader).
#[derive(Clone)]
pub struct CodecSet {
    pub doc: Arc<dyn ListCodec>,
    pub position: Arc<dyn ListCodec>,
    pub word: Arc<dyn ListCodec>,
}

impl Default for CodecSet {
    fn default() -> Self {
        Self { doc: Arc::new(DocListCodec), position: Arc::new(PositionListCodec), word: Arc::new(WordListCodec) }
    }
}

impl CodecSet {
    pub fn codec_for(&self, list: ListKind) -> Option<&dyn ListCodec> {
        match list {
            ListKind::Doc => Some(self.doc.as_ref()),
            ListKind::Position => Some(self.position.as_ref()),
            ListKind::Word => Some(self.word.as_ref()),
            ListKind::Score => None,
        }
    }

    pub fn mode_for(list: ListKind) -> GapMode {
        match list {
            ListKind::Doc => DOC_LIST_MODE,
            ListKind::Position => POSITION_LIST_MODE,
            ListKind::Word | ListKind::Score => WORD_LIST_MODE,
        }
    }
}

impl fmt::Debug for CodecSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecSet")
            .field("doc", &self.doc.name())
            .field("position", &self.position.name())
            .field("word", &self.word.name())
            .finish()
    }
}
