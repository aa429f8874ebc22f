use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::common::constants::DEFAULT_RESERVE_FLOOR;
use crate::common::errors::HybError;
use crate::common::file_operations::{atomic_save_json, read_json};
use crate::core::block::BoundaryMode;
use crate::core::common::IndexMode;

/// Encoding of the postings stream.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Tab separated lines, words spelled out and sorted.
    #[default]
    Ascii,
    /// Fixed size records with word ids resolved against a vocabulary file.
    Binary,
}

fn default_verify_round_trip() -> bool {
    cfg!(debug_assertions)
}

fn default_reserve_floor() -> usize {
    DEFAULT_RESERVE_FLOOR
}

/// Options of a single index build.
///
/// In ascii mode the vocabulary is written to `vocabulary_path` at the end of
/// the build, in binary mode it is read from there before the first posting.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, TypedBuilder)]
pub struct BuildConfig {
    pub boundary: BoundaryMode,

    /// Most postings a block may hold; postings past it are dropped until the
    /// next flush. `None` for no limit.
    #[builder(default)]
    #[serde(default)]
    pub max_block_volume: Option<usize>,

    #[builder(default)]
    #[serde(default)]
    pub with_positions: bool,

    #[builder(default)]
    #[serde(default)]
    pub with_scores: bool,

    #[builder(default)]
    #[serde(default)]
    pub input_format: InputFormat,

    #[builder(setter(into))]
    pub vocabulary_path: PathBuf,

    #[builder(default = default_verify_round_trip())]
    #[serde(default = "default_verify_round_trip")]
    pub verify_round_trip: bool,

    #[builder(default = DEFAULT_RESERVE_FLOOR)]
    #[serde(default = "default_reserve_floor")]
    pub reserve_floor: usize,
}

impl BuildConfig {
    pub fn validate(&self) -> Result<(), HybError> {
        self.boundary.validate()?;
        if self.max_block_volume == Some(0) {
            return Err(HybError::InvalidConfig("max block volume must be at least 1".to_string()));
        }
        if self.vocabulary_path.as_os_str().is_empty() {
            return Err(HybError::InvalidConfig("vocabulary path is empty".to_string()));
        }
        Ok(())
    }

    pub fn mode(&self) -> IndexMode {
        IndexMode::new(self.with_positions, self.with_scores)
    }

    pub fn load(path: &Path) -> Result<Self, HybError> {
        let config: BuildConfig = read_json(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), HybError> {
        atomic_save_json(path, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builder_defaults() {
        let config = BuildConfig::builder()
            .boundary(BoundaryMode::Volume { volume: 10 })
            .vocabulary_path("words.vocabulary")
            .build();
        assert_eq!(config.max_block_volume, None);
        assert_eq!(config.input_format, InputFormat::Ascii);
        assert_eq!(config.reserve_floor, DEFAULT_RESERVE_FLOOR);
        assert_eq!(config.verify_round_trip, cfg!(debug_assertions));
        assert_eq!(config.mode(), IndexMode::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let config = BuildConfig::builder()
            .boundary(BoundaryMode::PrefixLength { length: 2 })
            .max_block_volume(Some(0))
            .vocabulary_path("words.vocabulary")
            .build();
        assert!(matches!(config.validate(), Err(HybError::InvalidConfig(_))));

        let config = BuildConfig { max_block_volume: None, boundary: BoundaryMode::Volume { volume: 0 }, ..config };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("build.json");
        let config = BuildConfig::builder()
            .boundary(BoundaryMode::Prefixes { path: PathBuf::from("boundaries.txt") })
            .max_block_volume(Some(1000))
            .with_positions(true)
            .input_format(InputFormat::Binary)
            .vocabulary_path(temp_dir.path().join("words.vocabulary"))
            .verify_round_trip(true)
            .build();
        config.save(&path).unwrap();
        assert_eq!(BuildConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{"boundary": {"kind": "prefix_length", "length": 1}, "vocabulary_path": "v.txt"}"#;
        let config: BuildConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.boundary, BoundaryMode::PrefixLength { length: 1 });
        assert!(!config.with_scores);
        assert_eq!(config.reserve_floor, DEFAULT_RESERVE_FLOOR);
    }
}
