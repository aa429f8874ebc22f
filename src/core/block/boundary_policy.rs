use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::common::errors::HybError;
use crate::common::file_operations::read_lines;

/// Decides where one block ends and the next begins.
///
/// The build driver consults the policy once per distinct word, before the
/// word's first posting is accumulated, so a word never spans two blocks.
/// `true` means the open block (if it holds anything) is complete.
pub trait BoundaryPolicy: Send {
    fn should_flush(&mut self, word: &str, block_volume: usize) -> bool;

    fn name(&self) -> &'static str;
}

/// Boundary selection as configured for a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Sorted boundary strings, one per line.
    Prefixes { path: PathBuf },
    PrefixLength { length: usize },
    Volume { volume: usize },
}

impl BoundaryMode {
    /// Single number block parameter: below 10 it is a prefix length,
    /// otherwise a target block volume.
    pub fn from_block_parameter(parameter: usize) -> Self {
        if parameter < 10 {
            BoundaryMode::PrefixLength { length: parameter }
        } else {
            BoundaryMode::Volume { volume: parameter }
        }
    }

    pub fn validate(&self) -> Result<(), HybError> {
        match self {
            BoundaryMode::PrefixLength { length: 0 } => {
                Err(HybError::InvalidConfig("prefix length must be at least 1".to_string()))
            }
            BoundaryMode::Volume { volume: 0 } => {
                Err(HybError::InvalidConfig("block volume must be at least 1".to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn create_policy(&self) -> Result<Box<dyn BoundaryPolicy>, HybError> {
        self.validate()?;
        let policy: Box<dyn BoundaryPolicy> = match self {
            BoundaryMode::Prefixes { path } => Box::new(PrefixesPolicy::load_from_file(path)?),
            BoundaryMode::PrefixLength { length } => Box::new(PrefixLengthPolicy::new(*length)),
            BoundaryMode::Volume { volume } => Box::new(VolumePolicy::new(*volume)),
        };
        Ok(policy)
    }
}

/// Flush whenever the word reaches the next boundary string.
///
/// Words are compared byte-wise. Once past the last boundary the open block
/// absorbs every remaining word.
#[derive(Debug, Clone)]
pub struct PrefixesPolicy {
    boundaries: Vec<String>,
    next: usize,
}

impl PrefixesPolicy {
    pub fn new(boundaries: Vec<String>) -> Result<Self, HybError> {
        if boundaries.is_empty() {
            return Err(HybError::InvalidConfig("boundary prefix list is empty".to_string()));
        }
        if let Some(index) = boundaries.windows(2).position(|w| w[1] <= w[0]) {
            error!(
                "[PrefixesPolicy] boundary #{} '{}' does not follow '{}'",
                index + 1,
                boundaries[index + 1],
                boundaries[index]
            );
            return Err(HybError::UnsortedBoundaries {
                previous: boundaries[index].clone(),
                current: boundaries[index + 1].clone(),
                index: index + 1,
            });
        }
        Ok(Self { boundaries, next: 0 })
    }

    /// Blank lines are ignored.
    pub fn load_from_file(path: &Path) -> Result<Self, HybError> {
        let boundaries: Vec<String> = read_lines(path)?.into_iter().filter(|line| !line.is_empty()).collect();
        info!("[PrefixesPolicy] read {} boundary prefixes from {}", boundaries.len(), path.display());
        Self::new(boundaries)
    }

    pub fn boundaries(&self) -> &[String] {
        &self.boundaries
    }
}

impl BoundaryPolicy for PrefixesPolicy {
    fn should_flush(&mut self, word: &str, _block_volume: usize) -> bool {
        match self.boundaries.get(self.next) {
            Some(boundary) if word >= boundary.as_str() => {
                while self.boundaries.get(self.next).is_some_and(|b| b.as_str() <= word) {
                    self.next += 1;
                }
                true
            }
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        "prefixes"
    }
}

/// Words sharing their first `length` bytes share a block.
///
/// The prefix of a word shorter than `length` is the whole word.
#[derive(Debug, Clone)]
pub struct PrefixLengthPolicy {
    length: usize,
    block_prefix: Option<Vec<u8>>,
}

impl PrefixLengthPolicy {
    pub fn new(length: usize) -> Self {
        Self { length, block_prefix: None }
    }

    fn prefix_of<'a>(&self, word: &'a str) -> &'a [u8] {
        let bytes = word.as_bytes();
        &bytes[..bytes.len().min(self.length)]
    }
}

impl BoundaryPolicy for PrefixLengthPolicy {
    fn should_flush(&mut self, word: &str, _block_volume: usize) -> bool {
        let prefix = self.prefix_of(word);
        if self.block_prefix.as_deref() == Some(prefix) {
            return false;
        }
        self.block_prefix = Some(prefix.to_vec());
        true
    }

    fn name(&self) -> &'static str {
        "prefix_length"
    }
}

/// Flush once the open block holds at least `volume` postings.
#[derive(Debug, Clone)]
pub struct VolumePolicy {
    volume: usize,
}

impl VolumePolicy {
    pub fn new(volume: usize) -> Self {
        Self { volume }
    }
}

impl BoundaryPolicy for VolumePolicy {
    fn should_flush(&mut self, _word: &str, block_volume: usize) -> bool {
        block_volume >= self.volume
    }

    fn name(&self) -> &'static str {
        "volume"
    }
}
