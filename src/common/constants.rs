/// Width of every offset stored in the file (per-list offsets, block offset
/// table entries, trailing pointer).
pub const OFFSET_WIDTH: usize = 8;

/// Width of the element count written in front of each list of a block.
pub const COUNT_WIDTH: usize = 8;

/// Width of a persisted word id (boundary word id table).
pub const WORD_ID_WIDTH: usize = 4;

/// Scores are persisted uncompressed with this width.
pub const SCORE_WIDTH: usize = 4;

/// Most values a single byte of a compressed list can stand for: a bit
/// packed chunk of 128 zero-width values takes one byte.
pub const MAX_VALUES_PER_LIST_BYTE: u64 = 128;

/// The pointer to the block offset table is always the last 8 bytes.
pub const TRAILING_POINTER_WIDTH: usize = 8;

/// Size of the fixed [`crate::MetaInfo`] record.
pub const META_INFO_SIZE: usize = 32;

/// Capacity reserved once for each accumulator list and kept across blocks.
pub const DEFAULT_RESERVE_FLOOR: usize = 64 * 1024;

/// Extension of the file an index is written to before it is renamed in place.
pub const INDEX_TEMP_FILE_EXTENSION: &str = "tmp";

/// Default log line pattern.
pub const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l:<5})} [{T}] {t} - {m}{n}";

pub const LOG_FILE_NAME: &str = "hyb_index.log";

/// Rolled log files kept next to the active one.
pub const LOG_FILE_ROLL_COUNT: u32 = 5;

pub const LOG_FILE_ROLL_SIZE: u64 = 64 * 1024 * 1024;
