use serde::{Deserialize, Serialize};

pub type DocId = u32;
pub type WordId = u32;
pub type Position = u32;
pub type Score = u32;

/// Index of a block inside the block offset table.
pub type BlockId = usize;

const WITH_POSITIONS_FLAG: u32 = 1;
const WITH_SCORES_FLAG: u32 = 2;

/// Which optional lists every block of an index file carries.
///
/// The mode is uniform across a file and persisted in its meta info record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexMode {
    pub with_positions: bool,
    pub with_scores: bool,
}

impl IndexMode {
    pub fn new(with_positions: bool, with_scores: bool) -> Self {
        Self { with_positions, with_scores }
    }

    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.with_positions {
            flags |= WITH_POSITIONS_FLAG;
        }
        if self.with_scores {
            flags |= WITH_SCORES_FLAG;
        }
        flags
    }

    /// Returns `None` when `flags` carries bits no mode defines.
    pub fn from_flags(flags: u32) -> Option<Self> {
        if flags & !(WITH_POSITIONS_FLAG | WITH_SCORES_FLAG) != 0 {
            return None;
        }
        Some(Self { with_positions: flags & WITH_POSITIONS_FLAG != 0, with_scores: flags & WITH_SCORES_FLAG != 0 })
    }

    /// Number of lists (and per-list offsets) in each block: doc and word
    /// lists always, positions and scores on demand.
    pub fn lists_per_block(&self) -> usize {
        2 + self.with_positions as usize + self.with_scores as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_flags() {
        for with_positions in [false, true] {
            for with_scores in [false, true] {
                let mode = IndexMode::new(with_positions, with_scores);
                assert_eq!(IndexMode::from_flags(mode.flags()), Some(mode));
            }
        }
        assert_eq!(IndexMode::new(true, true).flags(), 3);
        assert_eq!(IndexMode::from_flags(4), None);
    }

    #[test]
    fn test_lists_per_block() {
        assert_eq!(IndexMode::new(false, false).lists_per_block(), 2);
        assert_eq!(IndexMode::new(true, false).lists_per_block(), 3);
        assert_eq!(IndexMode::new(true, true).lists_per_block(), 4);
    }
}
