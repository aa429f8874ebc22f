//! Builder and reader for HYB index files: a block segmented inverted index
//! whose blocks each cover a contiguous range of word ids and store the doc
//! id, position, word id and score lists of their postings in compressed
//! form.
//!
//! ```no_run
//! use std::path::Path;
//! use hyb_index::{BoundaryMode, BuildConfig, IndexBuilder, IndexReader};
//!
//! # fn main() -> hyb_index::Result<()> {
//! let config = BuildConfig::builder()
//!     .boundary(BoundaryMode::PrefixLength { length: 2 })
//!     .vocabulary_path("words.vocabulary")
//!     .build();
//! IndexBuilder::new(config)?.build_from_file(Path::new("postings.txt"), Path::new("words.hyb"))?;
//!
//! let reader = IndexReader::open(Path::new("words.hyb"))?;
//! let postings = reader.postings_for_word(0)?;
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod core;

pub use crate::common::logger::{init_logger, LoggerConfig};
pub use crate::common::{HybError, IndexCorruption, Result};
pub use crate::core::block::BoundaryMode;
pub use crate::core::common::IndexMode;
pub use crate::core::index::{
    BuildConfig, BuildState, BuildStats, DecompressedBlock, IndexBuilder, IndexReader, InputFormat, MetaInfo, Posting,
};
pub use crate::core::vocabulary::Vocabulary;
