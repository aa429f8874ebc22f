use crate::core::common::{DocId, IndexMode, Position, Score, WordId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    /// The open block reached its cap. `first_for_word` is set for the
    /// first dropped posting of each word only.
    Dropped { first_for_word: bool },
}

/// Staging lists for the block being built.
///
/// The lists stay parallel: entry `i` of each present list belongs to the
/// same posting. Capacity reserved up front survives [`clear`](Self::clear).
#[derive(Debug)]
pub struct BlockAccumulator {
    mode: IndexMode,
    doc_ids: Vec<DocId>,
    word_ids: Vec<WordId>,
    positions: Vec<Position>,
    scores: Vec<Score>,
    reserve_floor: usize,
    /// Cap on the postings of the open block.
    max_block_volume: Option<usize>,
    current_word: Option<WordId>,
    current_word_dropped: bool,
}

impl BlockAccumulator {
    pub fn new(mode: IndexMode, reserve_floor: usize, max_block_volume: Option<usize>) -> Self {
        let optional = |enabled: bool| if enabled { Vec::with_capacity(reserve_floor) } else { Vec::new() };
        Self {
            mode,
            doc_ids: Vec::with_capacity(reserve_floor),
            word_ids: Vec::with_capacity(reserve_floor),
            positions: optional(mode.with_positions),
            scores: optional(mode.with_scores),
            reserve_floor,
            max_block_volume,
            current_word: None,
            current_word_dropped: false,
        }
    }

    /// `position` and `score` are stored only when the mode tracks them.
    pub fn push(
        &mut self,
        doc_id: DocId,
        word_id: WordId,
        position: Option<Position>,
        score: Option<Score>,
    ) -> PushOutcome {
        if self.current_word != Some(word_id) {
            self.current_word = Some(word_id);
            self.current_word_dropped = false;
        }

        if self.max_block_volume.is_some_and(|cap| self.doc_ids.len() >= cap) {
            let first_for_word = !self.current_word_dropped;
            self.current_word_dropped = true;
            return PushOutcome::Dropped { first_for_word };
        }

        self.doc_ids.push(doc_id);
        self.word_ids.push(word_id);
        if self.mode.with_positions {
            self.positions.push(position.unwrap_or_default());
        }
        if self.mode.with_scores {
            self.scores.push(score.unwrap_or_default());
        }
        PushOutcome::Accepted
    }

    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn doc_ids(&self) -> &[DocId] {
        &self.doc_ids
    }

    pub fn word_ids(&self) -> &[WordId] {
        &self.word_ids
    }

    pub fn positions(&self) -> Option<&[Position]> {
        self.mode.with_positions.then_some(self.positions.as_slice())
    }

    pub fn scores(&self) -> Option<&[Score]> {
        self.mode.with_scores.then_some(self.scores.as_slice())
    }

    /// Reorder every list so that entry `i` becomes the old entry
    /// `permutation[i]`.
    pub fn permute(&mut self, permutation: &[usize], scratch: &mut Vec<u32>) {
        debug_assert_eq!(permutation.len(), self.len());
        let mode = self.mode;
        permute_list(&mut self.doc_ids, permutation, scratch);
        permute_list(&mut self.word_ids, permutation, scratch);
        if mode.with_positions {
            permute_list(&mut self.positions, permutation, scratch);
        }
        if mode.with_scores {
            permute_list(&mut self.scores, permutation, scratch);
        }
    }

    /// Empty all lists, keeping at most `reserve_floor` capacity each.
    pub fn clear(&mut self) {
        let floor = self.reserve_floor;
        for list in [&mut self.doc_ids, &mut self.word_ids, &mut self.positions, &mut self.scores] {
            list.clear();
            list.shrink_to(floor);
        }
    }

    pub fn capacity(&self) -> usize {
        self.doc_ids.capacity()
    }
}

fn permute_list(list: &mut [u32], permutation: &[usize], scratch: &mut Vec<u32>) {
    scratch.clear();
    scratch.extend(permutation.iter().map(|&i| list[i]));
    list.copy_from_slice(scratch);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_lists_parallel() {
        let mut accumulator = BlockAccumulator::new(IndexMode::new(true, false), 16, None);
        assert_eq!(accumulator.push(5, 0, Some(3), Some(9)), PushOutcome::Accepted);
        assert_eq!(accumulator.push(2, 1, Some(4), Some(9)), PushOutcome::Accepted);
        assert_eq!(accumulator.len(), 2);
        assert_eq!(accumulator.doc_ids(), &[5, 2]);
        assert_eq!(accumulator.word_ids(), &[0, 1]);
        assert_eq!(accumulator.positions(), Some(&[3, 4][..]));
        assert_eq!(accumulator.scores(), None);
    }

    #[test]
    fn test_cap_bounds_the_whole_block() {
        let mut accumulator = BlockAccumulator::new(IndexMode::default(), 16, Some(2));
        assert_eq!(accumulator.push(1, 0, None, None), PushOutcome::Accepted);
        assert_eq!(accumulator.push(2, 0, None, None), PushOutcome::Accepted);
        assert_eq!(accumulator.push(3, 0, None, None), PushOutcome::Dropped { first_for_word: true });
        assert_eq!(accumulator.push(4, 0, None, None), PushOutcome::Dropped { first_for_word: false });

        // A new word gets no fresh allowance, only a fresh warning.
        assert_eq!(accumulator.push(1, 1, None, None), PushOutcome::Dropped { first_for_word: true });
        assert_eq!(accumulator.push(4, 1, None, None), PushOutcome::Dropped { first_for_word: false });
        assert_eq!(accumulator.len(), 2);
        assert_eq!(accumulator.doc_ids(), &[1, 2]);
        assert_eq!(accumulator.word_ids(), &[0, 0]);

        // Flushing reopens the block.
        accumulator.clear();
        assert_eq!(accumulator.push(5, 2, None, None), PushOutcome::Accepted);
        assert_eq!(accumulator.push(6, 2, None, None), PushOutcome::Accepted);
        assert_eq!(accumulator.push(7, 2, None, None), PushOutcome::Dropped { first_for_word: true });
        assert_eq!(accumulator.doc_ids(), &[5, 6]);
    }

    #[test]
    fn test_permute() {
        let mut accumulator = BlockAccumulator::new(IndexMode::new(true, true), 4, None);
        accumulator.push(7, 0, Some(1), Some(10));
        accumulator.push(3, 1, Some(2), Some(20));
        accumulator.push(5, 2, Some(3), Some(30));

        let mut scratch = Vec::new();
        accumulator.permute(&[1, 2, 0], &mut scratch);
        assert_eq!(accumulator.doc_ids(), &[3, 5, 7]);
        assert_eq!(accumulator.word_ids(), &[1, 2, 0]);
        assert_eq!(accumulator.positions(), Some(&[2, 3, 1][..]));
        assert_eq!(accumulator.scores(), Some(&[20, 30, 10][..]));
    }

    #[test]
    fn test_clear_keeps_reserve_floor() {
        let mut accumulator = BlockAccumulator::new(IndexMode::default(), 8, None);
        for doc_id in 0..100 {
            accumulator.push(doc_id, 0, None, None);
        }
        assert!(accumulator.capacity() >= 100);
        accumulator.clear();
        assert!(accumulator.is_empty());
        assert!(accumulator.capacity() >= 8);
        assert!(accumulator.capacity() < 100);
    }
}
