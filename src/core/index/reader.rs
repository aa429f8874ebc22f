use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info};
use memmap2::Mmap;

use crate::common::constants::{COUNT_WIDTH, MAX_VALUES_PER_LIST_BYTE, OFFSET_WIDTH, SCORE_WIDTH};
use crate::common::errors::{HybError, IndexCorruption};
use crate::core::codec::{CodecSet, ListKind};
use crate::core::common::ops::{open_read_mmap, read_u32_slice, read_u64_at};
use crate::core::common::{BlockId, DocId, IndexMode, Position, Score, WordId};
use crate::core::index::{IndexFileLayout, MetaInfo};

/// All lists of one block, decompressed. Entry `i` of every list belongs to
/// the same posting; postings are ordered by doc id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompressedBlock {
    pub block: BlockId,
    pub doc_ids: Vec<DocId>,
    pub positions: Option<Vec<Position>>,
    pub word_ids: Vec<WordId>,
    pub scores: Option<Vec<Score>>,
}

impl DecompressedBlock {
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Postings of `word`, in doc id order.
    pub fn postings_for_word(&self, word: WordId) -> Vec<Posting> {
        self.word_ids
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w == word)
            .map(|(i, _)| Posting {
                doc_id: self.doc_ids[i],
                position: self.positions.as_ref().map(|p| p[i]),
                score: self.scores.as_ref().map(|s| s[i]),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub position: Option<Position>,
    pub score: Option<Score>,
}

/// One list of a block: where its bytes are and how many values it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSection {
    pub kind: ListKind,
    pub count: usize,
    /// Byte range inside the block, count field excluded.
    pub bytes: Range<usize>,
}

/// Read-only view of a finished index file.
///
/// The file is memory mapped once; clones share the mapping and can be sent
/// to other threads.
#[derive(Clone)]
pub struct IndexReader {
    path: PathBuf,
    mmap: Arc<Mmap>,
    layout: Arc<IndexFileLayout>,
    codecs: CodecSet,
}

impl IndexReader {
    pub fn open(path: &Path) -> Result<Self, HybError> {
        Self::open_with_codecs(path, CodecSet::default())
    }

    pub fn open_with_codecs(path: &Path, codecs: CodecSet) -> Result<Self, HybError> {
        let mmap = open_read_mmap(path).map_err(|e| {
            error!("[IndexReader] can't open {}: {}", path.display(), e);
            e
        })?;
        let layout = IndexFileLayout::parse(&mmap).map_err(|e| {
            error!("[IndexReader] {} is not a finished index: {}", path.display(), e);
            e
        })?;
        info!(
            "[IndexReader] opened {}: {} blocks, {} words, {} postings",
            path.display(),
            layout.block_count(),
            layout.meta.word_count,
            layout.meta.posting_count
        );
        Ok(Self { path: path.to_path_buf(), mmap: Arc::new(mmap), layout: Arc::new(layout), codecs })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta(&self) -> &MetaInfo {
        &self.layout.meta
    }

    pub fn mode(&self) -> IndexMode {
        self.layout.meta.mode
    }

    pub fn block_count(&self) -> usize {
        self.layout.block_count()
    }

    /// The block offset table: `block_count + 2` entries.
    pub fn offsets(&self) -> &[u64] {
        &self.layout.offsets
    }

    pub fn boundary_word_ids(&self) -> &[WordId] {
        &self.layout.boundary_word_ids
    }

    /// The block holding the postings of `word`.
    pub fn block_for(&self, word: WordId) -> Option<BlockId> {
        if word >= self.layout.meta.word_count {
            return None;
        }
        // boundary_word_ids[0] == 0, so at least one entry is <= word
        let after = self.layout.boundary_word_ids.partition_point(|&b| b <= word);
        Some(after - 1)
    }

    /// Word ids whose postings live in `block`.
    pub fn block_word_range(&self, block: BlockId) -> Option<Range<WordId>> {
        let boundaries = &self.layout.boundary_word_ids;
        let start = *boundaries.get(block)?;
        let end = boundaries.get(block + 1).copied().unwrap_or(self.layout.meta.word_count);
        Some(start..end)
    }

    /// Blocks that may hold postings of any word in `words`, e.g. the word id
    /// range of a prefix.
    pub fn blocks_for_range(&self, words: Range<WordId>) -> Range<BlockId> {
        let end_word = words.end.min(self.layout.meta.word_count);
        if words.start >= end_word {
            return 0..0;
        }
        let first = self.block_for(words.start).unwrap_or(0);
        let last = self.block_for(end_word - 1).unwrap_or(first);
        first..last + 1
    }

    fn block_bytes(&self, block: BlockId) -> Result<&[u8], HybError> {
        let range = self
            .layout
            .block_range(block)
            .ok_or(HybError::BlockOutOfRange { block, block_count: self.block_count() })?;
        Ok(&self.mmap[range])
    }

    fn list_kinds(&self) -> Vec<ListKind> {
        let mode = self.mode();
        let mut kinds = vec![ListKind::Doc];
        if mode.with_positions {
            kinds.push(ListKind::Position);
        }
        kinds.push(ListKind::Word);
        if mode.with_scores {
            kinds.push(ListKind::Score);
        }
        kinds
    }

    /// Locate the lists of `block` without decompressing them.
    pub fn block_sections(&self, block: BlockId) -> Result<Vec<ListSection>, HybError> {
        let bytes = self.block_bytes(block)?;
        let kinds = self.list_kinds();
        let malformed = |reason: String| HybError::Corrupted(IndexCorruption::MalformedBlock { block, reason });

        let header = kinds.len() * OFFSET_WIDTH;
        if bytes.len() < header {
            return Err(malformed(format!("{} bytes can't hold {} list offsets", bytes.len(), kinds.len())));
        }
        let mut starts = Vec::with_capacity(kinds.len());
        for i in 0..kinds.len() {
            let start = read_u64_at(bytes, i * OFFSET_WIDTH).unwrap_or(u64::MAX);
            let previous_end = starts.last().map_or(header as u64, |&s: &u64| s + COUNT_WIDTH as u64);
            if start < previous_end || start.saturating_add(COUNT_WIDTH as u64) > bytes.len() as u64 {
                return Err(malformed(format!("list offset {} of entry {} is out of place", start, i)));
            }
            starts.push(start);
        }

        let mut sections = Vec::with_capacity(kinds.len());
        for (i, &kind) in kinds.iter().enumerate() {
            let start = starts[i] as usize;
            let end = starts.get(i + 1).map_or(bytes.len(), |&s| s as usize);
            let count = read_u64_at(bytes, start).unwrap_or(u64::MAX);
            let list_len = (end - start - COUNT_WIDTH) as u64;
            let max_count = self.layout.meta.posting_count.min(list_len.saturating_mul(MAX_VALUES_PER_LIST_BYTE));
            if count == 0 || count > max_count {
                return Err(malformed(format!("{} list claims {} values", kind, count)));
            }
            sections.push(ListSection { kind, count: count as usize, bytes: start + COUNT_WIDTH..end });
        }
        if let Some(section) = sections.iter().find(|s| s.count != sections[0].count) {
            return Err(malformed(format!(
                "{} list has {} values, doc id list has {}",
                section.kind, section.count, sections[0].count
            )));
        }
        Ok(sections)
    }

    /// Compressed byte length of every list of `block`, count fields excluded.
    pub fn block_list_lengths(&self, block: BlockId) -> Result<Vec<(ListKind, usize)>, HybError> {
        Ok(self.block_sections(block)?.into_iter().map(|s| (s.kind, s.bytes.len())).collect())
    }

    pub fn read_block(&self, block: BlockId) -> Result<DecompressedBlock, HybError> {
        let bytes = self.block_bytes(block)?;
        let mut decompressed = DecompressedBlock { block, ..DecompressedBlock::default() };

        for section in self.block_sections(block)? {
            let list_bytes = &bytes[section.bytes.clone()];
            let values = match self.codecs.codec_for(section.kind) {
                Some(codec) => codec.decompress(list_bytes, section.count, CodecSet::mode_for(section.kind))?,
                None => read_scores(list_bytes, section.count).ok_or_else(|| {
                    HybError::Corrupted(IndexCorruption::MalformedBlock {
                        block,
                        reason: format!("score list is {} bytes for {} scores", list_bytes.len(), section.count),
                    })
                })?,
            };
            match section.kind {
                ListKind::Doc => decompressed.doc_ids = values,
                ListKind::Position => decompressed.positions = Some(values),
                ListKind::Word => decompressed.word_ids = values,
                ListKind::Score => decompressed.scores = Some(values),
            }
        }
        debug!("[IndexReader] block {} read: {} postings", block, decompressed.len());
        Ok(decompressed)
    }

    /// All postings of `word`, in doc id order. Empty for unknown words.
    pub fn postings_for_word(&self, word: WordId) -> Result<Vec<Posting>, HybError> {
        match self.block_for(word) {
            Some(block) => Ok(self.read_block(block)?.postings_for_word(word)),
            None => Ok(Vec::new()),
        }
    }
}

fn read_scores(bytes: &[u8], count: usize) -> Option<Vec<Score>> {
    if count.checked_mul(SCORE_WIDTH) != Some(bytes.len()) {
        return None;
    }
    read_u32_slice(bytes)
}
