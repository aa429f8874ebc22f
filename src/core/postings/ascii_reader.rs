use std::io::BufRead;

use log::warn;

use crate::common::errors::HybError;
use crate::core::postings::{PostingStream, PostingWord, RawPosting};

/// Reads `word<TAB>doc_id<TAB>score<TAB>position` lines.
///
/// Lines that don't parse are logged, counted and skipped; blank lines are
/// skipped silently.
pub struct AsciiPostingReader<R: BufRead> {
    reader: R,
    line: String,
    record: u64,
    malformed: u64,
}

struct ParsedLine {
    word_end: usize,
    doc_id: u32,
    score: u32,
    position: u32,
}

impl<R: BufRead> AsciiPostingReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: String::new(), record: 0, malformed: 0 }
    }
}

fn parse_line(line: &str) -> Result<ParsedLine, String> {
    let mut fields = line.split('\t');
    let word = fields.next().filter(|w| !w.is_empty()).ok_or_else(|| "missing word".to_string())?;
    let mut number = |name: &str| -> Result<u32, String> {
        let field = fields.next().ok_or_else(|| format!("missing {name}"))?;
        field.trim().parse::<u32>().map_err(|e| format!("bad {name} '{field}': {e}"))
    };
    let doc_id = number("doc id")?;
    let score = number("score")?;
    let position = number("position")?;
    if fields.next().is_some() {
        return Err("too many fields".to_string());
    }
    Ok(ParsedLine { word_end: word.len(), doc_id, score, position })
}

impl<R: BufRead> PostingStream for AsciiPostingReader<R> {
    fn next_posting(&mut self) -> Result<Option<RawPosting<'_>>, HybError> {
        let parsed = loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.record += 1;
            let line = self.line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(parsed) => break parsed,
                Err(reason) => {
                    warn!("[AsciiPostingReader] skipping line #{} '{}': {}", self.record, line, reason);
                    self.malformed += 1;
                }
            }
        };

        Ok(Some(RawPosting {
            word: PostingWord::Text(&self.line[..parsed.word_end]),
            doc_id: parsed.doc_id,
            score: parsed.score,
            position: parsed.position,
            record: self.record,
        }))
    }

    fn record_number(&self) -> u64 {
        self.record
    }

    fn malformed_records(&self) -> u64 {
        self.malformed
    }
}
