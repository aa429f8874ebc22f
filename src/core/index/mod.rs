mod builder;
mod config;
mod layout;
mod meta_info;
mod reader;
mod stats;

pub use builder::{BuildState, IndexBuilder};
pub use config::{BuildConfig, InputFormat};
pub use layout::IndexFileLayout;
pub use meta_info::MetaInfo;
pub use reader::{DecompressedBlock, IndexReader, ListSection, Posting};
pub use stats::BuildStats;
