use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::constants::META_INFO_SIZE;
use crate::common::errors::IndexCorruption;
use crate::core::common::ops::{put_u32, put_u64, read_u32_at, read_u64_at};
use crate::core::common::{DocId, IndexMode};

/// Summary counts of an index, written once after the last block.
///
/// On disk: `max_doc_id:u32 word_count:u32 doc_count:u32 mode_flags:u32
/// posting_count:u64 block_count:u64`, little-endian.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub max_doc_id: DocId,
    pub word_count: u32,
    /// Distinct doc ids seen in the postings stream.
    pub doc_count: u32,
    pub mode: IndexMode,
    pub posting_count: u64,
    pub block_count: u64,
}

impl MetaInfo {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(META_INFO_SIZE);
        put_u32(&mut bytes, self.max_doc_id);
        put_u32(&mut bytes, self.word_count);
        put_u32(&mut bytes, self.doc_count);
        put_u32(&mut bytes, self.mode.flags());
        put_u64(&mut bytes, self.posting_count);
        put_u64(&mut bytes, self.block_count);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexCorruption> {
        if bytes.len() != META_INFO_SIZE {
            return Err(IndexCorruption::MetaInfoSize { actual: bytes.len() as u64, expected: META_INFO_SIZE });
        }
        let size_error = || IndexCorruption::MetaInfoSize { actual: bytes.len() as u64, expected: META_INFO_SIZE };
        let flags = read_u32_at(bytes, 12).ok_or_else(size_error)?;
        Ok(Self {
            max_doc_id: read_u32_at(bytes, 0).ok_or_else(size_error)?,
            word_count: read_u32_at(bytes, 4).ok_or_else(size_error)?,
            doc_count: read_u32_at(bytes, 8).ok_or_else(size_error)?,
            mode: IndexMode::from_flags(flags).ok_or(IndexCorruption::UnknownModeFlags(flags))?,
            posting_count: read_u64_at(bytes, 16).ok_or_else(size_error)?,
            block_count: read_u64_at(bytes, 24).ok_or_else(size_error)?,
        })
    }
}

impl fmt::Display for MetaInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "max doc id    : {}", self.max_doc_id)?;
        writeln!(f, "documents     : {}", self.doc_count)?;
        writeln!(f, "words         : {}", self.word_count)?;
        writeln!(f, "postings      : {}", self.posting_count)?;
        writeln!(f, "blocks        : {}", self.block_count)?;
        write!(f, "with positions: {}, with scores: {}", self.mode.with_positions, self.mode.with_scores)
    }
}
