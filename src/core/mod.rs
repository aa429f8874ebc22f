pub mod block;
pub mod codec;
pub mod common;
pub mod index;
pub mod postings;
pub mod vocabulary;

pub use codec::{CodecError, ListKind};
pub use common::{BlockId, DocId, IndexMode, Position, Score, WordId};
