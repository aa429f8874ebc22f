use std::ops::Range;
use std::path::Path;

use log::{error, info};

use crate::common::errors::HybError;
use crate::common::file_operations::{atomic_save_lines, read_lines};
use crate::core::common::WordId;

/// Ordered word table, word id `n` is the `n`-th word.
///
/// Words are compared byte-wise, the same order the postings stream is
/// sorted in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `word` and return its id. Re-adding the last word returns the
    /// existing id.
    pub fn add_word(&mut self, word: &str) -> Result<WordId, HybError> {
        if let Some(last) = self.words.last() {
            if word < last.as_str() {
                error!("[Vocabulary] '{}' added after '{}'", word, last);
                return Err(HybError::UnsortedVocabulary { previous: last.clone(), current: word.to_string() });
            }
            if word == last.as_str() {
                return Ok((self.words.len() - 1) as WordId);
            }
        }
        self.words.push(word.to_string());
        Ok((self.words.len() - 1) as WordId)
    }

    /// Load a vocabulary file, one word per line. The file must be sorted.
    pub fn load_from_file(path: &Path) -> Result<Self, HybError> {
        let words = read_lines(path)?;
        if let Some(index) = words.windows(2).position(|w| w[1] < w[0]) {
            return Err(HybError::UnsortedVocabulary {
                previous: words[index].clone(),
                current: words[index + 1].clone(),
            });
        }
        info!("[Vocabulary] loaded {} words from {}", words.len(), path.display());
        Ok(Self { words })
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), HybError> {
        atomic_save_lines(path, self.words.iter().map(String::as_str))?;
        info!("[Vocabulary] saved {} words to {}", self.words.len(), path.display());
        Ok(())
    }

    pub fn word_at(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn last_word(&self) -> Option<&str> {
        self.words.last().map(String::as_str)
    }

    pub fn find(&self, word: &str) -> Option<WordId> {
        self.words.binary_search_by(|w| w.as_str().cmp(word)).ok().map(|id| id as WordId)
    }

    /// Word ids of all words starting with `prefix`.
    pub fn prefix_range(&self, prefix: &str) -> Range<WordId> {
        let start = self.words.partition_point(|w| w.as_str() < prefix);
        let end = start + self.words[start..].partition_point(|w| w.starts_with(prefix));
        start as WordId..end as WordId
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn vocabulary(words: &[&str]) -> Vocabulary {
        let mut vocabulary = Vocabulary::new();
        for word in words {
            vocabulary.add_word(word).unwrap();
        }
        vocabulary
    }

    #[test]
    fn test_add_word_assigns_consecutive_ids() {
        let mut vocabulary = Vocabulary::new();
        assert_eq!(vocabulary.add_word("aaa").unwrap(), 0);
        assert_eq!(vocabulary.add_word("abb").unwrap(), 1);
        assert_eq!(vocabulary.add_word("abb").unwrap(), 1);
        assert_eq!(vocabulary.add_word("b").unwrap(), 2);
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.word_at(1), Some("abb"));
        assert_eq!(vocabulary.word_at(3), None);
        assert_eq!(vocabulary.last_word(), Some("b"));
    }

    #[test]
    fn test_add_word_rejects_unsorted() {
        let mut vocabulary = vocabulary(&["b"]);
        assert!(matches!(vocabulary.add_word("a"), Err(HybError::UnsortedVocabulary { .. })));
        // Upper case sorts before lower case.
        assert!(vocabulary.add_word("B").is_err());
    }

    #[test]
    fn test_find_and_prefix_range() {
        let vocabulary = vocabulary(&["ab", "abc", "abd", "b", "ba", "c"]);
        assert_eq!(vocabulary.find("abd"), Some(2));
        assert_eq!(vocabulary.find("abx"), None);
        assert_eq!(vocabulary.prefix_range("ab"), 0..3);
        assert_eq!(vocabulary.prefix_range("b"), 3..5);
        assert_eq!(vocabulary.prefix_range("bz"), 5..5);
        assert_eq!(vocabulary.prefix_range(""), 0..6);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("words.vocabulary");
        let vocabulary = vocabulary(&["Aaa", "Abb", "Baa"]);
        vocabulary.save_to_file(&path).unwrap();

        let loaded = Vocabulary::load_from_file(&path).unwrap();
        assert_eq!(loaded, vocabulary);
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["Aaa", "Abb", "Baa"]);
    }

    #[test]
    fn test_load_unsorted_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("words.vocabulary");
        std::fs::write(&path, "b\na\n").unwrap();
        assert!(matches!(Vocabulary::load_from_file(&path), Err(HybError::UnsortedVocabulary { .. })));
    }
}
