use crate::core::codec::gaps::{from_gaps, from_gaps_with_boundaries, to_gaps, to_gaps_with_boundaries};
use crate::core::codec::{simple9, CodecError, GapMode, ListCodec};
use crate::core::common::ops::{put_u64, read_u64_at};

const CODEC_NAME: &str = "simple9";

/// Position codec built on [`simple9`].
///
/// With [`GapMode::GapsWithBoundaries`] the Simple9 stream is preceded by the
/// number of encoded values as a little-endian u64, because boundary markers
/// make it longer than the list itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionListCodec;

impl ListCodec for PositionListCodec {
    fn name(&self) -> &'static str {
        CODEC_NAME
    }

    fn compress_into(&self, values: &[u32], mode: GapMode, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        let start = out.len();
        match mode {
            GapMode::Raw => {
                simple9::encode(values, out)?;
            }
            GapMode::Gaps => {
                simple9::encode(&to_gaps(values)?, out)?;
            }
            GapMode::GapsWithBoundaries => {
                let codes = to_gaps_with_boundaries(values)?;
                put_u64(out, codes.len() as u64);
                simple9::encode(&codes, out)?;
            }
        }
        Ok(out.len() - start)
    }

    fn decompress(&self, bytes: &[u8], count: usize, mode: GapMode) -> Result<Vec<u32>, CodecError> {
        let (values, consumed) = match mode {
            GapMode::Raw => simple9::decode(bytes, count)?,
            GapMode::Gaps => {
                let (mut values, consumed) = simple9::decode(bytes, count)?;
                from_gaps(&mut values)?;
                (values, consumed)
            }
            GapMode::GapsWithBoundaries => {
                let encoded = read_u64_at(bytes, 0).ok_or(CodecError::Truncated { codec: CODEC_NAME })?;
                // Every stored value takes at least one bit of a 4 byte code word.
                if encoded > (bytes.len() as u64) * 7 {
                    return Err(CodecError::Truncated { codec: CODEC_NAME });
                }
                let (codes, consumed) = simple9::decode(&bytes[8..], encoded as usize)?;
                (from_gaps_with_boundaries(&codes, count)?, consumed + 8)
            }
        };
        if consumed != bytes.len() {
            return Err(CodecError::TrailingBytes { codec: CODEC_NAME, remaining: bytes.len() - consumed });
        }
        Ok(values)
    }
}
