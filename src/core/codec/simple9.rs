//! Simple9: packs as many values as fit into the 28 payload bits of a 32 bit
//! word, the top 4 bits select one of nine layouts.

use crate::core::codec::CodecError;
use crate::core::common::ops::put_u32;

const SELECTOR_SHIFT: u32 = 28;
const SELECTORS: usize = 9;

pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

const MAX_VALUES: [u32; SELECTORS] = [0x0FFF_FFFF, 0x3FFF, 0x1FF, 0x7F, 0x1F, 0xF, 0x7, 0x3, 0x1];
const VALUES_PER_WORD: [usize; SELECTORS] = [1, 2, 3, 4, 5, 7, 9, 14, 28];
const BITS_PER_VALUE: [u32; SELECTORS] = [28, 14, 9, 7, 5, 4, 3, 2, 1];

/// Encode `values`, appending little-endian code words to `out`.
/// Returns the number of bytes written.
pub fn encode(values: &[u32], out: &mut Vec<u8>) -> Result<usize, CodecError> {
    if let Some(&value) = values.iter().find(|&&v| v > MAX_VALUE) {
        return Err(CodecError::ValueTooLarge { value, max: MAX_VALUE });
    }

    let start = out.len();
    let mut next = 0;
    while next < values.len() {
        // Densest layout whose window fits; selector 0 always fits.
        let selector = (0..SELECTORS)
            .rev()
            .find(|&s| {
                let end = values.len().min(next + VALUES_PER_WORD[s]);
                values[next..end].iter().all(|&v| v <= MAX_VALUES[s])
            })
            .unwrap_or(0);

        let end = values.len().min(next + VALUES_PER_WORD[selector]);
        let mut code_word = 0u32;
        for &v in values[next..end].iter().rev() {
            code_word = (code_word << BITS_PER_VALUE[selector]) | v;
        }
        code_word |= (selector as u32) << SELECTOR_SHIFT;
        put_u32(out, code_word);
        next = end;
    }
    Ok(out.len() - start)
}

/// Decode `count` values from the front of `bytes`.
/// Returns the values and the number of bytes consumed.
pub fn decode(bytes: &[u8], count: usize) -> Result<(Vec<u32>, usize), CodecError> {
    // `count` comes from the file; a code word holds at most 28 values.
    let mut values = Vec::with_capacity(count.min(bytes.len() / 4 * VALUES_PER_WORD[SELECTORS - 1]));
    let mut cursor = 0;
    while values.len() < count {
        let word_bytes = bytes.get(cursor..cursor + 4).ok_or(CodecError::Truncated { codec: "simple9" })?;
        let code_word = u32::from_le_bytes([word_bytes[0], word_bytes[1], word_bytes[2], word_bytes[3]]);
        cursor += 4;

        let selector = (code_word >> SELECTOR_SHIFT) as usize;
        if selector >= SELECTORS {
            return Err(CodecError::InvalidSelector(selector as u32));
        }
        let take = VALUES_PER_WORD[selector].min(count - values.len());
        let bits = BITS_PER_VALUE[selector];
        for i in 0..take {
            values.push((code_word >> (i as u32 * bits)) & MAX_VALUES[selector]);
        }
    }
    Ok((values, cursor))
}
