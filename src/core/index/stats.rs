use std::fmt;
use std::time::Duration;

use crate::core::block::{ListVolumes, WriterTimers};

/// Counters and timings of one build, returned by [`crate::IndexBuilder::build`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    /// Records read from the postings stream, malformed ones included.
    pub records_read: u64,
    pub postings_written: u64,
    /// Postings dropped because the open block was at its volume cap.
    pub dropped_postings: u64,
    /// Words that lost postings to the block volume cap.
    pub capped_words: u64,
    pub skipped_duplicates: u64,
    pub malformed_records: u64,
    pub blocks: usize,
    pub words: usize,
    pub distinct_docs: u64,
    pub max_doc_id: u32,
    pub volumes: ListVolumes,
    pub lists_verified: u64,
    pub file_size: u64,
    pub read_time: Duration,
    pub timers: WriterTimers,
    pub total_time: Duration,
}

impl BuildStats {
    /// Bits of compressed block data per posting.
    pub fn bits_per_posting(&self, volume: u64) -> f64 {
        if self.postings_written == 0 {
            return 0.0;
        }
        volume as f64 * 8.0 / self.postings_written as f64
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "read {} records, wrote {} postings of {} words and {} documents into {} blocks",
            self.records_read, self.postings_written, self.words, self.distinct_docs, self.blocks
        )?;
        writeln!(
            f,
            "skipped {} duplicates, {} malformed records; dropped {} postings of {} capped words",
            self.skipped_duplicates, self.malformed_records, self.dropped_postings, self.capped_words
        )?;
        let volumes = [
            ("doc ids", self.volumes.doc),
            ("positions", self.volumes.position),
            ("word ids", self.volumes.word),
            ("scores", self.volumes.score),
            ("block headers", self.volumes.header),
        ];
        for (name, volume) in volumes {
            if volume > 0 {
                writeln!(f, "{:>13}: {:>12} bytes, {:>6.2} bits/posting", name, volume, self.bits_per_posting(volume))?;
            }
        }
        writeln!(f, "   index file: {:>12} bytes, {} lists verified", self.file_size, self.lists_verified)?;
        write!(
            f,
            "time: read {:.1}ms, sort {:.1}ms, compress {:.1}ms, verify {:.1}ms, write {:.1}ms, total {:.1}ms",
            millis(self.read_time),
            millis(self.timers.sort),
            millis(self.timers.compress),
            millis(self.timers.verify),
            millis(self.timers.write),
            millis(self.total_time)
        )
    }
}
