use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use fnv::FnvHashSet;
use log::{debug, error, info, warn};

use crate::common::errors::HybError;
use crate::core::block::{BlockAccumulator, BlockWriter, BoundaryPolicy, PushOutcome};
use crate::core::codec::{CodecSet, RoundTripVerifier};
use crate::core::common::ops::{commit_temp_file, create_temp_file};
use crate::core::common::{DocId, WordId};
use crate::core::index::{BuildConfig, BuildStats, InputFormat, MetaInfo};
use crate::core::postings::{AsciiPostingReader, BinaryPostingReader, PostingStream, PostingWord};
use crate::core::vocabulary::Vocabulary;

const OUTPUT_BUFFER_SIZE: usize = 1 << 20;

/// Where a build currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// No posting read yet.
    Empty,
    Accumulating,
    /// A block is being sorted, compressed and written.
    Flushing,
    /// Writing the tables that follow the blocks.
    Finalizing,
    Closed,
}

/// Single pass index build driver.
///
/// Postings are pulled from a [`PostingStream`], grouped into blocks as
/// decided by the configured [`BoundaryPolicy`] and written to
/// `<index>.tmp`, which replaces `<index>` only once the trailing pointer is
/// on disk. On failure the temp file is removed and no index is left behind.
pub struct IndexBuilder {
    config: BuildConfig,
    codecs: CodecSet,
    state: BuildState,
}

impl IndexBuilder {
    pub fn new(config: BuildConfig) -> Result<Self, HybError> {
        config.validate()?;
        Ok(Self { config, codecs: CodecSet::default(), state: BuildState::Empty })
    }

    pub fn with_codecs(mut self, codecs: CodecSet) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    fn transition(&mut self, next: BuildState) {
        if self.state != next {
            debug!("[IndexBuilder] {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Build from a postings file in the configured input format.
    pub fn build_from_file(&mut self, input: &Path, index_path: &Path) -> Result<BuildStats, HybError> {
        let file = File::open(input).map_err(|e| {
            error!("[IndexBuilder] can't open postings file {}: {}", input.display(), e);
            e
        })?;
        info!("[IndexBuilder] reading {:?} postings from {}", self.config.input_format, input.display());
        match self.config.input_format {
            InputFormat::Ascii => self.build(&mut AsciiPostingReader::new(BufReader::new(file)), index_path),
            InputFormat::Binary => self.build(&mut BinaryPostingReader::new(BufReader::new(file)), index_path),
        }
    }

    pub fn build<S: PostingStream + ?Sized>(&mut self, stream: &mut S, index_path: &Path) -> Result<BuildStats, HybError> {
        let started = Instant::now();
        self.state = BuildState::Empty;
        let (file, temp_path) = create_temp_file(index_path)?;

        let result = self.build_into(stream, file).and_then(|(stats, vocabulary)| {
            // The vocabulary goes first so a failed save never leaves a renamed index.
            if self.config.input_format == InputFormat::Ascii {
                vocabulary.save_to_file(&self.config.vocabulary_path)?;
            }
            commit_temp_file(&temp_path, index_path)?;
            Ok(stats)
        });
        self.transition(BuildState::Closed);

        match result {
            Ok(mut stats) => {
                stats.total_time = started.elapsed();
                info!("[IndexBuilder] index {} written\n{}", index_path.display(), stats);
                Ok(stats)
            }
            Err(e) => {
                error!("[IndexBuilder] building {} failed: {}", index_path.display(), e);
                if let Err(remove_error) = fs::remove_file(&temp_path) {
                    warn!("[IndexBuilder] can't remove {}: {}", temp_path.display(), remove_error);
                }
                Err(e)
            }
        }
    }

    fn build_into<S: PostingStream + ?Sized>(
        &mut self,
        stream: &mut S,
        file: File,
    ) -> Result<(BuildStats, Vocabulary), HybError> {
        let config = self.config.clone();
        let mode = config.mode();

        let mut vocabulary = match config.input_format {
            InputFormat::Ascii => Vocabulary::new(),
            InputFormat::Binary => Vocabulary::load_from_file(&config.vocabulary_path)?,
        };
        let mut policy: Box<dyn BoundaryPolicy> = config.boundary.create_policy()?;
        let verifier = RoundTripVerifier::new(config.verify_round_trip);
        info!(
            "[IndexBuilder] boundary policy '{}', positions: {}, scores: {}, max block volume: {:?}, verify: {}",
            policy.name(),
            mode.with_positions,
            mode.with_scores,
            config.max_block_volume,
            verifier.is_enabled()
        );

        let mut accumulator = BlockAccumulator::new(mode, config.reserve_floor, config.max_block_volume);
        let mut writer =
            BlockWriter::new(BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, file), mode, self.codecs.clone(), verifier);
        let mut boundary_word_ids: Vec<WordId> = vec![0];
        let mut distinct_docs: FnvHashSet<DocId> = FnvHashSet::default();
        let mut stats = BuildStats::default();
        let mut last_word_id: Option<WordId> = None;
        let mut last_doc_id: Option<DocId> = None;

        loop {
            let read_started = Instant::now();
            let next = stream.next_posting()?;
            stats.read_time += read_started.elapsed();
            let Some(posting) = next else {
                break;
            };
            if self.state == BuildState::Empty {
                self.transition(BuildState::Accumulating);
            }

            distinct_docs.insert(posting.doc_id);
            stats.max_doc_id = stats.max_doc_id.max(posting.doc_id);

            let (word_id, new_word) = match posting.word {
                PostingWord::Text(word) => match vocabulary.last_word().map(|last| word.cmp(last)) {
                    Some(Ordering::Less) => {
                        let previous = vocabulary.last_word().unwrap_or_default().to_string();
                        error!(
                            "[IndexBuilder] words not sorted at record #{}: '{}' after '{}'",
                            posting.record, word, previous
                        );
                        return Err(HybError::UnsortedWords {
                            previous,
                            current: word.to_string(),
                            record: posting.record,
                        });
                    }
                    Some(Ordering::Equal) => ((vocabulary.len() - 1) as WordId, false),
                    _ => (vocabulary.add_word(word)?, true),
                },
                PostingWord::Id(word_id) => {
                    let expected = last_word_id.map_or(0, |last| last + 1);
                    if Some(word_id) == last_word_id {
                        (word_id, false)
                    } else if word_id == expected {
                        if word_id as usize >= vocabulary.len() {
                            error!(
                                "[IndexBuilder] word id {} at record #{} is not in the vocabulary of {} words",
                                word_id,
                                posting.record,
                                vocabulary.len()
                            );
                            return Err(HybError::WordIdOutOfVocabulary {
                                word_id,
                                vocabulary_len: vocabulary.len(),
                                record: posting.record,
                            });
                        }
                        (word_id, true)
                    } else {
                        error!(
                            "[IndexBuilder] word ids not consecutive at record #{}: {:?} -> {}",
                            posting.record, last_word_id, word_id
                        );
                        return Err(HybError::NonConsecutiveWordIds {
                            previous: last_word_id,
                            current: word_id,
                            record: posting.record,
                        });
                    }
                }
            };

            if !new_word && !mode.with_positions && last_doc_id == Some(posting.doc_id) {
                stats.skipped_duplicates += 1;
                continue;
            }
            if mode.with_scores && posting.score == 0 {
                error!("[IndexBuilder] score 0 for doc {} at record #{}", posting.doc_id, posting.record);
                return Err(HybError::InvalidScore { doc_id: posting.doc_id, record: posting.record });
            }

            if new_word {
                let word = match posting.word {
                    PostingWord::Text(word) => word,
                    PostingWord::Id(id) => vocabulary.word_at(id).unwrap_or_default(),
                };
                if policy.should_flush(word, accumulator.len()) && !accumulator.is_empty() {
                    self.flush_block(&mut writer, &mut accumulator)?;
                    boundary_word_ids.push(word_id);
                }
                last_word_id = Some(word_id);
            }
            last_doc_id = Some(posting.doc_id);

            let position = mode.with_positions.then_some(posting.position);
            let score = mode.with_scores.then_some(posting.score);
            if let PushOutcome::Dropped { first_for_word } =
                accumulator.push(posting.doc_id, word_id, position, score)
            {
                stats.dropped_postings += 1;
                if first_for_word {
                    stats.capped_words += 1;
                    warn!(
                        "[IndexBuilder] block {} is full at max block volume {:?}, dropping postings of word id {} from record #{}",
                        boundary_word_ids.len() - 1,
                        config.max_block_volume,
                        word_id,
                        posting.record
                    );
                }
            }
        }

        stats.records_read = stream.record_number();
        stats.malformed_records = stream.malformed_records();
        if self.state == BuildState::Empty || accumulator.is_empty() {
            error!("[IndexBuilder] postings stream is empty ({} malformed records)", stats.malformed_records);
            return Err(HybError::EmptyStream);
        }
        self.flush_block(&mut writer, &mut accumulator)?;

        self.transition(BuildState::Finalizing);
        let writer_stats = writer.stats().clone();
        let meta = MetaInfo {
            max_doc_id: stats.max_doc_id,
            word_count: vocabulary.len() as u32,
            doc_count: distinct_docs.len() as u32,
            mode,
            posting_count: writer_stats.postings,
            block_count: writer_stats.blocks as u64,
        };
        let (out, writer_stats) = writer.finish(&boundary_word_ids, &meta)?;
        let file = out.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;

        stats.postings_written = writer_stats.postings;
        stats.blocks = writer_stats.blocks;
        stats.words = vocabulary.len();
        stats.distinct_docs = distinct_docs.len() as u64;
        stats.volumes = writer_stats.volumes;
        stats.timers = writer_stats.timers;
        stats.lists_verified = writer_stats.lists_verified;
        stats.file_size = writer_stats.bytes_written;
        info!("[IndexBuilder] meta info\n{}", meta);
        Ok((stats, vocabulary))
    }

    fn flush_block<W: Write>(
        &mut self,
        writer: &mut BlockWriter<W>,
        accumulator: &mut BlockAccumulator,
    ) -> Result<(), HybError> {
        self.transition(BuildState::Flushing);
        writer.write_block(accumulator)?;
        accumulator.clear();
        self.transition(BuildState::Accumulating);
        Ok(())
    }
}
