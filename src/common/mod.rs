pub mod constants;
pub mod errors;
pub mod file_operations;
pub mod logger;

pub use errors::{HybError, IndexCorruption};

pub type Result<T> = std::result::Result<T, HybError>;
