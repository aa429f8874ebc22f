mod bytes_ops;
mod mmap_ops;

pub use bytes_ops::*;
pub use mmap_ops::*;
