use itertools::Itertools;

use crate::core::codec::{simple9, CodecError, GapMode, ListCodec};
use crate::core::common::ops::{put_u32, read_u32_at, read_u32_slice};

const CODEC_NAME: &str = "zipf";

/// Word id codec.
///
/// Word ids of a block come from a narrow range and are heavily skewed, so
/// each id is replaced by its frequency rank inside the block. Layout:
/// `min:u32 max:u32`, the codebook (`max - min + 1` ids relative to `min`,
/// most frequent first, ties by id), then the Simple9 coded ranks.
/// An empty list is stored as zero bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordListCodec;

impl WordListCodec {
    fn check_mode(mode: GapMode) -> Result<(), CodecError> {
        match mode {
            GapMode::Raw => Ok(()),
            _ => Err(CodecError::UnsupportedMode { codec: CODEC_NAME, mode }),
        }
    }
}

impl ListCodec for WordListCodec {
    fn name(&self) -> &'static str {
        CODEC_NAME
    }

    fn compress_into(&self, values: &[u32], mode: GapMode, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        Self::check_mode(mode)?;
        let (min, max) = match values.iter().minmax().into_option() {
            Some((&min, &max)) => (min, max),
            None => return Ok(0),
        };

        let range = (max - min) as usize + 1;
        let mut frequencies = vec![0u32; range];
        for &value in values {
            frequencies[(value - min) as usize] += 1;
        }
        let by_rank: Vec<u32> = (0..range as u32)
            .sorted_by(|&a, &b| frequencies[b as usize].cmp(&frequencies[a as usize]).then(a.cmp(&b)))
            .collect();
        let mut rank_of = vec![0u32; range];
        for (rank, &normalised) in by_rank.iter().enumerate() {
            rank_of[normalised as usize] = rank as u32;
        }
        let ranks: Vec<u32> = values.iter().map(|&v| rank_of[(v - min) as usize]).collect();

        let start = out.len();
        put_u32(out, min);
        put_u32(out, max);
        for &normalised in &by_rank {
            put_u32(out, normalised);
        }
        simple9::encode(&ranks, out)?;
        Ok(out.len() - start)
    }

    fn decompress(&self, bytes: &[u8], count: usize, mode: GapMode) -> Result<Vec<u32>, CodecError> {
        Self::check_mode(mode)?;
        if count == 0 {
            if !bytes.is_empty() {
                return Err(CodecError::TrailingBytes { codec: CODEC_NAME, remaining: bytes.len() });
            }
            return Ok(Vec::new());
        }

        let truncated = CodecError::Truncated { codec: CODEC_NAME };
        let min = read_u32_at(bytes, 0).ok_or(truncated.clone())?;
        let max = read_u32_at(bytes, 4).ok_or(truncated.clone())?;
        if max < min {
            return Err(truncated);
        }
        let range = (max - min) as usize + 1;
        let codebook_end = range.checked_mul(4).and_then(|len| len.checked_add(8)).ok_or(truncated.clone())?;
        let codebook = bytes.get(8..codebook_end).and_then(read_u32_slice).ok_or(truncated)?;

        let (ranks, consumed) = simple9::decode(&bytes[codebook_end..], count)?;
        if codebook_end + consumed != bytes.len() {
            let remaining = bytes.len() - codebook_end - consumed;
            return Err(CodecError::TrailingBytes { codec: CODEC_NAME, remaining });
        }
        ranks
            .into_iter()
            .map(|rank| {
                let normalised =
                    codebook.get(rank as usize).ok_or(CodecError::RankOutOfRange { rank, size: codebook.len() })?;
                normalised.checked_add(min).ok_or(CodecError::Overflow)
            })
            .collect()
    }
}
