//! Byte layout of an index file:
//!
//! ```text
//! [block 0] .. [block N-1]
//! [boundary word ids: N x u32]
//! [meta info: 32 bytes]
//! [block offset table: (N + 2) x u64]
//! [pointer to the block offset table: u64]
//! ```
//!
//! Entry `i < N` of the offset table is where block `i` starts, entry `N` is
//! the end of the last block and entry `N + 1` the end of the boundary word
//! id table, i.e. where the meta info starts.

use std::ops::Range;

use crate::common::constants::{META_INFO_SIZE, OFFSET_WIDTH, TRAILING_POINTER_WIDTH, WORD_ID_WIDTH};
use crate::common::errors::IndexCorruption;
use crate::core::common::ops::{put_u32, put_u64, read_u32_slice, read_u64_at, read_u64_slice};
use crate::core::common::{BlockId, WordId};
use crate::core::index::MetaInfo;

/// Everything after the block data region, parsed and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFileLayout {
    pub offsets: Vec<u64>,
    pub boundary_word_ids: Vec<WordId>,
    pub meta: MetaInfo,
}

impl IndexFileLayout {
    /// Serialise the tables following the blocks. `block_offsets` holds the
    /// start of every block followed by the end of the last one.
    pub fn trailer_bytes(block_offsets: &[u64], boundary_word_ids: &[WordId], meta: &MetaInfo) -> Vec<u8> {
        debug_assert_eq!(block_offsets.len(), boundary_word_ids.len() + 1);
        let data_end = block_offsets.last().copied().unwrap_or(0);
        let boundaries_end = data_end + (boundary_word_ids.len() * WORD_ID_WIDTH) as u64;
        let table_start = boundaries_end + META_INFO_SIZE as u64;

        let mut bytes = Vec::with_capacity(
            boundary_word_ids.len() * WORD_ID_WIDTH
                + META_INFO_SIZE
                + (block_offsets.len() + 1) * OFFSET_WIDTH
                + TRAILING_POINTER_WIDTH,
        );
        for &word_id in boundary_word_ids {
            put_u32(&mut bytes, word_id);
        }
        bytes.extend_from_slice(&meta.to_bytes());
        for &offset in block_offsets {
            put_u64(&mut bytes, offset);
        }
        put_u64(&mut bytes, boundaries_end);
        put_u64(&mut bytes, table_start);
        bytes
    }

    /// Locate and validate the tables of a complete index file.
    pub fn parse(data: &[u8]) -> Result<Self, IndexCorruption> {
        let len = data.len() as u64;
        if data.len() < TRAILING_POINTER_WIDTH {
            return Err(IndexCorruption::MissingTrailer { len });
        }
        let pointer_at = data.len() - TRAILING_POINTER_WIDTH;
        let pointer = read_u64_at(data, pointer_at).ok_or(IndexCorruption::MissingTrailer { len })?;
        if pointer > pointer_at as u64 {
            return Err(IndexCorruption::PointerOutOfRange { pointer, len });
        }
        let table_start = pointer as usize;

        let table_bytes = &data[table_start..pointer_at];
        if table_bytes.len() % OFFSET_WIDTH != 0 {
            return Err(IndexCorruption::MisalignedOffsetTable { bytes: table_bytes.len() as u64 });
        }
        let offsets = read_u64_slice(table_bytes)
            .ok_or(IndexCorruption::MisalignedOffsetTable { bytes: table_bytes.len() as u64 })?;
        if offsets.len() < 3 {
            return Err(IndexCorruption::OffsetTableTooShort { entries: offsets.len() });
        }
        if offsets[0] != 0 {
            return Err(IndexCorruption::OffsetTableStart { first: offsets[0] });
        }
        if let Some(index) = offsets.windows(2).position(|w| w[1] <= w[0]) {
            return Err(IndexCorruption::OffsetsNotIncreasing { index: index + 1 });
        }

        let block_count = offsets.len() - 2;
        let data_end = offsets[block_count];
        let boundaries_end = offsets[block_count + 1];
        if boundaries_end > pointer {
            return Err(IndexCorruption::PointerOutOfRange { pointer, len });
        }

        let meta_size = pointer - boundaries_end;
        if meta_size != META_INFO_SIZE as u64 {
            return Err(IndexCorruption::MetaInfoSize { actual: meta_size, expected: META_INFO_SIZE });
        }
        let meta = MetaInfo::from_bytes(&data[boundaries_end as usize..table_start])?;

        let boundary_bytes = boundaries_end - data_end;
        let expected = (block_count * WORD_ID_WIDTH) as u64;
        if boundary_bytes != expected {
            return Err(IndexCorruption::BoundaryTableSize { actual: boundary_bytes, expected });
        }
        if meta.block_count != block_count as u64 {
            return Err(IndexCorruption::BlockCountMismatch { meta: meta.block_count, table: block_count });
        }

        let boundary_word_ids = read_u32_slice(&data[data_end as usize..boundaries_end as usize])
            .ok_or(IndexCorruption::BoundaryTableSize { actual: boundary_bytes, expected })?;
        if boundary_word_ids[0] != 0 {
            return Err(IndexCorruption::FirstBoundaryNotZero { first: boundary_word_ids[0] });
        }
        if let Some(index) = boundary_word_ids.windows(2).position(|w| w[1] <= w[0]) {
            return Err(IndexCorruption::BoundariesNotIncreasing { index: index + 1 });
        }

        Ok(Self { offsets, boundary_word_ids, meta })
    }

    pub fn block_count(&self) -> usize {
        self.boundary_word_ids.len()
    }

    /// Byte range of a block inside the file.
    pub fn block_range(&self, block: BlockId) -> Option<Range<usize>> {
        if block >= self.block_count() {
            return None;
        }
        Some(self.offsets[block] as usize..self.offsets[block + 1] as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::IndexMode;

    /// Two fake blocks of 16 and 24 bytes followed by a valid trailer.
    fn two_block_file() -> Vec<u8> {
        let meta = MetaInfo { word_count: 5, block_count: 2, mode: IndexMode::new(true, false), ..MetaInfo::default() };
        let mut data = vec![0xAAu8; 40];
        data.extend(IndexFileLayout::trailer_bytes(&[0, 16, 40], &[0, 3], &meta));
        data
    }

    #[test]
    fn test_parse_valid_trailer() {
        let data = two_block_file();
        let layout = IndexFileLayout::parse(&data).unwrap();
        assert_eq!(layout.offsets, vec![0, 16, 40, 48]);
        assert_eq!(layout.boundary_word_ids, vec![0, 3]);
        assert_eq!(layout.meta.word_count, 5);
        assert_eq!(layout.block_count(), 2);
        assert_eq!(layout.block_range(1), Some(16..40));
        assert_eq!(layout.block_range(2), None);
        // 40 data + 8 boundaries + 32 meta + 4 * 8 table + 8 pointer
        assert_eq!(data.len(), 120);
    }

    #[test]
    fn test_short_files() {
        assert_eq!(IndexFileLayout::parse(&[]), Err(IndexCorruption::MissingTrailer { len: 0 }));
        assert_eq!(IndexFileLayout::parse(&[1, 2, 3]), Err(IndexCorruption::MissingTrailer { len: 3 }));
    }

    #[test]
    fn test_truncated_file_has_invalid_pointer() {
        let data = two_block_file();
        for cut in [1, 8, 9, 30, 60] {
            assert!(IndexFileLayout::parse(&data[..data.len() - cut]).is_err(), "cut {cut}");
        }
    }

    #[test]
    fn test_pointer_out_of_range() {
        let mut data = two_block_file();
        let at = data.len() - 8;
        data[at..].copy_from_slice(&10_000u64.to_le_bytes());
        assert!(matches!(IndexFileLayout::parse(&data), Err(IndexCorruption::PointerOutOfRange { .. })));
    }

    #[test]
    fn test_offsets_not_increasing() {
        let mut data = two_block_file();
        // second table entry (16) is at 80 + 8
        data[88..96].copy_from_slice(&50u64.to_le_bytes());
        assert_eq!(IndexFileLayout::parse(&data), Err(IndexCorruption::OffsetsNotIncreasing { index: 2 }));
    }

    #[test]
    fn test_block_count_mismatch() {
        let meta = MetaInfo { block_count: 3, ..MetaInfo::default() };
        let mut data = vec![0u8; 40];
        data.extend(IndexFileLayout::trailer_bytes(&[0, 16, 40], &[0, 3], &meta));
        assert_eq!(IndexFileLayout::parse(&data), Err(IndexCorruption::BlockCountMismatch { meta: 3, table: 2 }));
    }

    #[test]
    fn test_bad_boundaries() {
        let meta = MetaInfo { block_count: 2, ..MetaInfo::default() };
        let mut data = vec![0u8; 40];
        data.extend(IndexFileLayout::trailer_bytes(&[0, 16, 40], &[1, 3], &meta));
        assert_eq!(IndexFileLayout::parse(&data), Err(IndexCorruption::FirstBoundaryNotZero { first: 1 }));

        let mut data = vec![0u8; 40];
        data.extend(IndexFileLayout::trailer_bytes(&[0, 16, 40], &[0, 0], &meta));
        assert_eq!(IndexFileLayout::parse(&data), Err(IndexCorruption::BoundariesNotIncreasing { index: 1 }));
    }
}
