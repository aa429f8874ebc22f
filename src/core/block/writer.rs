use std::io::Write;
use std::time::{Duration, Instant};

use log::{debug, error};

use crate::common::constants::{COUNT_WIDTH, OFFSET_WIDTH, SCORE_WIDTH};
use crate::common::errors::HybError;
use crate::core::block::BlockAccumulator;
use crate::core::codec::{CodecSet, ListCodec, ListKind, RoundTripVerifier};
use crate::core::common::ops::{patch_u64, put_u32, put_u64};
use crate::core::common::{BlockId, IndexMode, WordId};
use crate::core::index::{IndexFileLayout, MetaInfo};

/// Compressed bytes written per list kind, count fields included.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListVolumes {
    pub doc: u64,
    pub position: u64,
    pub word: u64,
    pub score: u64,
    pub header: u64,
}

impl ListVolumes {
    pub fn total(&self) -> u64 {
        self.doc + self.position + self.word + self.score + self.header
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriterTimers {
    pub sort: Duration,
    pub compress: Duration,
    pub verify: Duration,
    pub write: Duration,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockWriterStats {
    pub blocks: usize,
    pub postings: u64,
    pub volumes: ListVolumes,
    pub timers: WriterTimers,
    pub lists_verified: u64,
    pub bytes_written: u64,
}

/// Turns accumulated blocks into bytes.
///
/// Sorts a block by doc id, compresses every list, writes
/// `[per-list offsets][count][list]..` and records where the block ended.
/// [`finish`](Self::finish) appends the boundary table, meta info, offset
/// table and trailing pointer.
pub struct BlockWriter<W: Write> {
    out: W,
    mode: IndexMode,
    codecs: CodecSet,
    verifier: RoundTripVerifier,
    /// Start of every block written so far plus the current end of data.
    offsets: Vec<u64>,
    permutation: Vec<usize>,
    scratch: Vec<u32>,
    doc_buffer: Vec<u8>,
    position_buffer: Vec<u8>,
    word_buffer: Vec<u8>,
    block_buffer: Vec<u8>,
    stats: BlockWriterStats,
}

impl<W: Write> BlockWriter<W> {
    pub fn new(out: W, mode: IndexMode, codecs: CodecSet, verifier: RoundTripVerifier) -> Self {
        Self {
            out,
            mode,
            codecs,
            verifier,
            offsets: vec![0],
            permutation: Vec::new(),
            scratch: Vec::new(),
            doc_buffer: Vec::new(),
            position_buffer: Vec::new(),
            word_buffer: Vec::new(),
            block_buffer: Vec::new(),
            stats: BlockWriterStats::default(),
        }
    }

    pub fn blocks_written(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    pub fn stats(&self) -> &BlockWriterStats {
        &self.stats
    }

    /// Write the accumulated postings as the next block. The accumulator is
    /// left sorted; clearing it is up to the caller.
    pub fn write_block(&mut self, accumulator: &mut BlockAccumulator) -> Result<BlockId, HybError> {
        debug_assert_eq!(accumulator.mode(), self.mode);
        let block = self.blocks_written();
        if accumulator.is_empty() {
            error!("[BlockWriter] refusing to write empty block {}", block);
            return Err(HybError::InvalidConfig(format!("block {block} has no postings")));
        }

        let started = Instant::now();
        self.sort_by_doc_id(accumulator);
        let sorted = Instant::now();
        self.stats.timers.sort += sorted - started;

        Self::compress_list(
            &mut self.verifier,
            &mut self.stats.timers,
            self.codecs.doc.as_ref(),
            ListKind::Doc,
            block,
            accumulator.doc_ids(),
            &mut self.doc_buffer,
        )?;
        if let Some(positions) = accumulator.positions() {
            Self::compress_list(
                &mut self.verifier,
                &mut self.stats.timers,
                self.codecs.position.as_ref(),
                ListKind::Position,
                block,
                positions,
                &mut self.position_buffer,
            )?;
        }
        Self::compress_list(
            &mut self.verifier,
            &mut self.stats.timers,
            self.codecs.word.as_ref(),
            ListKind::Word,
            block,
            accumulator.word_ids(),
            &mut self.word_buffer,
        )?;

        let written = Instant::now();
        self.assemble_block(accumulator);
        self.out.write_all(&self.block_buffer)?;
        self.stats.timers.write += written.elapsed();

        let block_end = self.offsets[block] + self.block_buffer.len() as u64;
        self.offsets.push(block_end);
        self.stats.blocks += 1;
        self.stats.postings += accumulator.len() as u64;
        self.stats.bytes_written = block_end;
        debug!(
            "[BlockWriter] block {} written: {} postings, {} bytes, ends at {}",
            block,
            accumulator.len(),
            self.block_buffer.len(),
            block_end
        );
        Ok(block)
    }

    fn sort_by_doc_id(&mut self, accumulator: &mut BlockAccumulator) {
        let doc_ids = accumulator.doc_ids();
        if doc_ids.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        self.permutation.clear();
        self.permutation.extend(0..doc_ids.len());
        // Stable: postings of the same doc keep their stream order.
        self.permutation.sort_by_key(|&i| doc_ids[i]);
        accumulator.permute(&self.permutation, &mut self.scratch);
    }

    fn compress_list(
        verifier: &mut RoundTripVerifier,
        timers: &mut WriterTimers,
        codec: &dyn ListCodec,
        list: ListKind,
        block: BlockId,
        values: &[u32],
        buffer: &mut Vec<u8>,
    ) -> Result<(), HybError> {
        let started = Instant::now();
        buffer.clear();
        let mode = CodecSet::mode_for(list);
        codec.compress_into(values, mode, buffer).map_err(|e| {
            error!("[BlockWriter] can't compress the {} list of block {}: {}", list, block, e);
            e
        })?;
        let compressed = Instant::now();
        timers.compress += compressed - started;

        verifier.check(codec, list, block, values, buffer, mode)?;
        timers.verify += compressed.elapsed();
        Ok(())
    }

    fn assemble_block(&mut self, accumulator: &BlockAccumulator) {
        let count = accumulator.len() as u64;
        let lists = self.mode.lists_per_block();
        let block = &mut self.block_buffer;
        let volumes = &mut self.stats.volumes;

        block.clear();
        block.resize(lists * OFFSET_WIDTH, 0);
        volumes.header += (lists * OFFSET_WIDTH) as u64;

        let mut slot = 0;
        let mut section = |block: &mut Vec<u8>, bytes: &[u8]| -> u64 {
            let section_start = block.len() as u64;
            patch_u64(block, slot * OFFSET_WIDTH, section_start);
            slot += 1;
            put_u64(block, count);
            block.extend_from_slice(bytes);
            (COUNT_WIDTH + bytes.len()) as u64
        };

        volumes.doc += section(block, &self.doc_buffer);
        if self.mode.with_positions {
            volumes.position += section(block, &self.position_buffer);
        }
        volumes.word += section(block, &self.word_buffer);
        if let Some(scores) = accumulator.scores() {
            let mut raw = Vec::with_capacity(scores.len() * SCORE_WIDTH);
            for &score in scores {
                put_u32(&mut raw, score);
            }
            volumes.score += section(block, &raw);
        }
    }

    /// Write everything following the blocks and flush. `boundary_word_ids`
    /// must hold the first word id of every block.
    pub fn finish(
        mut self,
        boundary_word_ids: &[WordId],
        meta: &MetaInfo,
    ) -> Result<(W, BlockWriterStats), HybError> {
        if boundary_word_ids.len() != self.blocks_written() {
            error!(
                "[BlockWriter] {} boundary word ids for {} blocks",
                boundary_word_ids.len(),
                self.blocks_written()
            );
            return Err(HybError::InvalidConfig(format!(
                "{} boundary word ids for {} blocks",
                boundary_word_ids.len(),
                self.blocks_written()
            )));
        }
        let started = Instant::now();
        let trailer = IndexFileLayout::trailer_bytes(&self.offsets, boundary_word_ids, meta);
        self.out.write_all(&trailer)?;
        self.out.flush()?;
        self.stats.timers.write += started.elapsed();
        self.stats.bytes_written += trailer.len() as u64;
        self.stats.lists_verified = self.verifier.lists_checked();
        Ok((self.out, self.stats))
    }
}
