use bitpacking::BitPacker;

use crate::core::codec::{CodecError, GapMode, ListCodec};
use crate::core::common::ops::{read_uvarint, write_uvarint};

pub type BitPackerImpl = bitpacking::BitPacker4x;

const CODEC_NAME: &str = "bitpacked";

/// Doc id codec.
///
/// Full chunks of [`BitPackerImpl::BLOCK_LEN`] values are bit packed, each
/// preceded by one byte holding its bit width. In [`GapMode::Gaps`] the
/// sorted packer stores deltas, chaining the last value of a chunk into the
/// next one. Values that don't fill a chunk are written as LEB128 varints
/// (deltas in gaps mode).
#[derive(Debug, Default, Clone, Copy)]
pub struct DocListCodec;

impl DocListCodec {
    fn check_mode(mode: GapMode) -> Result<(), CodecError> {
        match mode {
            GapMode::Raw | GapMode::Gaps => Ok(()),
            GapMode::GapsWithBoundaries => Err(CodecError::UnsupportedMode { codec: CODEC_NAME, mode }),
        }
    }
}

impl ListCodec for DocListCodec {
    fn name(&self) -> &'static str {
        CODEC_NAME
    }

    fn compress_into(&self, values: &[u32], mode: GapMode, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        Self::check_mode(mode)?;
        let sorted = mode == GapMode::Gaps;
        if sorted {
            if let Some(index) = values.windows(2).position(|w| w[1] < w[0]) {
                return Err(CodecError::NotSorted { index: index + 1 });
            }
        }

        let start = out.len();
        let bitpacker = BitPackerImpl::new();
        let mut initial = 0u32;
        let mut chunks = values.chunks_exact(BitPackerImpl::BLOCK_LEN);
        for chunk in chunks.by_ref() {
            let num_bits =
                if sorted { bitpacker.num_bits_sorted(initial, chunk) } else { bitpacker.num_bits(chunk) };
            out.push(num_bits);
            let chunk_start = out.len();
            out.resize(chunk_start + BitPackerImpl::compressed_block_size(num_bits), 0);
            if sorted {
                bitpacker.compress_sorted(initial, chunk, &mut out[chunk_start..], num_bits);
            } else {
                bitpacker.compress(chunk, &mut out[chunk_start..], num_bits);
            }
            initial = chunk[BitPackerImpl::BLOCK_LEN - 1];
        }

        for &value in chunks.remainder() {
            if sorted {
                write_uvarint(out, value - initial);
                initial = value;
            } else {
                write_uvarint(out, value);
            }
        }
        Ok(out.len() - start)
    }

    fn decompress(&self, bytes: &[u8], count: usize, mode: GapMode) -> Result<Vec<u32>, CodecError> {
        Self::check_mode(mode)?;
        let sorted = mode == GapMode::Gaps;

        let bitpacker = BitPackerImpl::new();
        // A chunk takes at least its bit width byte, a varint at least one byte.
        let mut values = Vec::with_capacity(count.min(bytes.len().saturating_mul(BitPackerImpl::BLOCK_LEN)));
        let mut chunk = [0u32; BitPackerImpl::BLOCK_LEN];
        let mut initial = 0u32;
        let mut cursor = 0usize;
        for _ in 0..count / BitPackerImpl::BLOCK_LEN {
            let num_bits = *bytes.get(cursor).ok_or(CodecError::Truncated { codec: CODEC_NAME })?;
            if num_bits > 32 {
                return Err(CodecError::InvalidBitWidth(num_bits));
            }
            cursor += 1;
            let size = BitPackerImpl::compressed_block_size(num_bits);
            let packed = bytes.get(cursor..cursor + size).ok_or(CodecError::Truncated { codec: CODEC_NAME })?;
            if sorted {
                bitpacker.decompress_sorted(initial, packed, &mut chunk, num_bits);
            } else {
                bitpacker.decompress(packed, &mut chunk, num_bits);
            }
            cursor += size;
            initial = chunk[BitPackerImpl::BLOCK_LEN - 1];
            values.extend_from_slice(&chunk);
        }

        for _ in 0..count % BitPackerImpl::BLOCK_LEN {
            let value = read_uvarint(bytes, &mut cursor).ok_or(CodecError::Truncated { codec: CODEC_NAME })?;
            if sorted {
                initial = initial.checked_add(value).ok_or(CodecError::Overflow)?;
                values.push(initial);
            } else {
                values.push(value);
            }
        }

        if cursor != bytes.len() {
            return Err(CodecError::TrailingBytes { codec: CODEC_NAME, remaining: bytes.len() - cursor });
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn sorted_doc_ids(len: usize, max_gap: u32) -> Vec<u32> {
        let mut rng = rand::thread_rng();
        let mut doc_id = 0u32;
        (0..len)
            .map(|_| {
                doc_id += rng.gen_range(0..=max_gap);
                doc_id
            })
            .collect()
    }

    #[test]
    fn test_gaps_round_trip() {
        let codec = DocListCodec;
        for len in [0, 1, 5, 127, 128, 129, 256, 1000] {
            let values = sorted_doc_ids(len, 50);
            let bytes = codec.compress(&values, GapMode::Gaps).unwrap();
            assert_eq!(codec.decompress(&bytes, len, GapMode::Gaps).unwrap(), values, "len {len}");
        }
    }

    #[test]
    fn test_raw_round_trip() {
        let codec = DocListCodec;
        let mut rng = rand::thread_rng();
        let values: Vec<u32> = (0..300).map(|_| rng.gen::<u32>()).collect();
        let bytes = codec.compress(&values, GapMode::Raw).unwrap();
        assert_eq!(codec.decompress(&bytes, values.len(), GapMode::Raw).unwrap(), values);
    }

    #[test]
    fn test_gaps_are_smaller_than_raw() {
        let codec = DocListCodec;
        let values: Vec<u32> = (1_000_000..1_000_512).collect();
        let gaps = codec.compress(&values, GapMode::Gaps).unwrap();
        let raw = codec.compress(&values, GapMode::Raw).unwrap();
        assert!(gaps.len() < raw.len());
    }

    #[test]
    fn test_rejects_unsorted_and_boundary_mode() {
        let codec = DocListCodec;
        assert_eq!(codec.compress(&[1, 3, 2], GapMode::Gaps), Err(CodecError::NotSorted { index: 2 }));
        assert!(matches!(
            codec.compress(&[1, 2], GapMode::GapsWithBoundaries),
            Err(CodecError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn test_decompress_damaged_bytes() {
        let codec = DocListCodec;
        let values = sorted_doc_ids(130, 3);
        let bytes = codec.compress(&values, GapMode::Gaps).unwrap();
        assert!(codec.decompress(&bytes[..bytes.len() - 1], 130, GapMode::Gaps).is_err());
        assert_eq!(
            codec.decompress(&bytes, 129, GapMode::Gaps),
            Err(CodecError::TrailingBytes { codec: CODEC_NAME, remaining: 1 })
        );

        let mut bad_width = bytes.clone();
        bad_width[0] = 40;
        assert_eq!(codec.decompress(&bad_width, 130, GapMode::Gaps), Err(CodecError::InvalidBitWidth(40)));

        // a damaged count larger than the bytes could ever hold
        assert_eq!(
            codec.decompress(&bytes, usize::MAX, GapMode::Gaps),
            Err(CodecError::Truncated { codec: CODEC_NAME })
        );
    }
}
