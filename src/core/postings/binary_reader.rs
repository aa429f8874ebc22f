use std::io::{ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};

use crate::common::errors::HybError;
use crate::core::postings::{PostingStream, PostingWord, RawPosting};

/// `word_id doc_id score position`, four little-endian u32.
pub const BINARY_RECORD_SIZE: usize = 16;

/// Reads fixed size binary records with pre-resolved word ids.
pub struct BinaryPostingReader<R: Read> {
    reader: R,
    record: u64,
}

impl<R: Read> BinaryPostingReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, record: 0 }
    }

    /// Fill `buf` completely. Returns the number of bytes read when the
    /// stream ends first.
    fn read_record(&mut self, buf: &mut [u8; BINARY_RECORD_SIZE]) -> Result<usize, HybError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> PostingStream for BinaryPostingReader<R> {
    fn next_posting(&mut self) -> Result<Option<RawPosting<'_>>, HybError> {
        let mut buf = [0u8; BINARY_RECORD_SIZE];
        let filled = self.read_record(&mut buf)?;
        if filled == 0 {
            return Ok(None);
        }
        self.record += 1;
        if filled < BINARY_RECORD_SIZE {
            return Err(HybError::MalformedRecord {
                record: self.record,
                reason: format!("truncated record of {filled} bytes, expected {BINARY_RECORD_SIZE}"),
            });
        }

        let mut fields = [0u32; 4];
        LittleEndian::read_u32_into(&buf, &mut fields);
        Ok(Some(RawPosting {
            word: PostingWord::Id(fields[0]),
            doc_id: fields[1],
            score: fields[2],
            position: fields[3],
            record: self.record,
        }))
    }

    fn record_number(&self) -> u64 {
        self.record
    }
}
