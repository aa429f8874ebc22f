pub mod ops;
mod types;

pub use types::*;
