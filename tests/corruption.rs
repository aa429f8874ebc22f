use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::tempdir;

use hyb_index::{BoundaryMode, BuildConfig, HybError, IndexBuilder, IndexCorruption, IndexReader, InputFormat};

fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_binary(path: &Path, postings: &[(u32, u32, u32, u32)]) {
    let mut bytes = Vec::new();
    for &(word_id, doc, score, position) in postings {
        for value in [word_id, doc, score, position] {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    fs::write(path, bytes).unwrap();
}

fn binary_config(dir: &Path) -> BuildConfig {
    fs::write(dir.join("words.vocabulary"), "a\nb\nc\nd\ne\nf\n").unwrap();
    BuildConfig::builder()
        .boundary(BoundaryMode::Volume { volume: 2 })
        .input_format(InputFormat::Binary)
        .vocabulary_path(dir.join("words.vocabulary"))
        .build()
}

fn temp_index(dir: &Path) -> PathBuf {
    dir.join("words.hyb.tmp")
}

#[test]
fn test_word_id_gap_aborts_build() {
    init_test_logger();
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.bin");
    let index_path = temp_dir.path().join("words.hyb");
    write_binary(&input, &[(0, 1, 1, 0), (1, 2, 1, 0), (2, 3, 1, 0), (3, 4, 1, 0), (5, 5, 1, 0)]);

    let result = IndexBuilder::new(binary_config(temp_dir.path())).unwrap().build_from_file(&input, &index_path);
    assert!(matches!(
        result,
        Err(HybError::NonConsecutiveWordIds { previous: Some(3), current: 5, record: 5 })
    ));
    assert!(!index_path.exists());
    assert!(!temp_index(temp_dir.path()).exists());
}

#[test]
fn test_word_id_gap_exit_status() {
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.bin");
    let index_path = temp_dir.path().join("words.hyb");
    write_binary(&input, &[(0, 1, 1, 0), (1, 2, 1, 0), (2, 3, 1, 0), (3, 4, 1, 0), (5, 5, 1, 0)]);
    fs::write(temp_dir.path().join("words.vocabulary"), "a\nb\nc\nd\ne\nf\n").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_hyb-build"))
        .arg("--input")
        .arg(&input)
        .arg("--index")
        .arg(&index_path)
        .arg("--vocabulary")
        .arg(temp_dir.path().join("words.vocabulary"))
        .args(["--format", "binary", "--block-volume", "2", "--log-level", "off"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!index_path.exists());
    assert!(!temp_index(temp_dir.path()).exists());
}

#[test]
fn test_binary_errors() {
    init_test_logger();
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.bin");
    let index_path = temp_dir.path().join("words.hyb");

    write_binary(&input, &[(1, 1, 1, 0)]);
    let result = IndexBuilder::new(binary_config(temp_dir.path())).unwrap().build_from_file(&input, &index_path);
    assert!(matches!(result, Err(HybError::NonConsecutiveWordIds { previous: None, current: 1, .. })));

    let records: Vec<(u32, u32, u32, u32)> = (0..7).map(|w| (w, 1, 1, 0)).collect();
    write_binary(&input, &records);
    let result = IndexBuilder::new(binary_config(temp_dir.path())).unwrap().build_from_file(&input, &index_path);
    assert!(matches!(result, Err(HybError::WordIdOutOfVocabulary { word_id: 6, vocabulary_len: 6, record: 7 })));

    write_binary(&input, &[(0, 1, 1, 0)]);
    let mut bytes = fs::read(&input).unwrap();
    bytes.extend_from_slice(&[1, 0, 0]);
    fs::write(&input, bytes).unwrap();
    let result = IndexBuilder::new(binary_config(temp_dir.path())).unwrap().build_from_file(&input, &index_path);
    assert!(matches!(result, Err(HybError::MalformedRecord { record: 2, .. })));

    assert!(!index_path.exists());
}

#[test]
fn test_missing_vocabulary() {
    init_test_logger();
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.bin");
    write_binary(&input, &[(0, 1, 1, 0)]);
    let config = BuildConfig { vocabulary_path: temp_dir.path().join("missing"), ..binary_config(temp_dir.path()) };
    let result = IndexBuilder::new(config).unwrap().build_from_file(&input, &temp_dir.path().join("words.hyb"));
    assert!(result.is_err());
    assert!(!temp_index(temp_dir.path()).exists());
}

#[test]
fn test_unsorted_and_empty_ascii() {
    init_test_logger();
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.txt");
    let index_path = temp_dir.path().join("words.hyb");
    let config = BuildConfig::builder()
        .boundary(BoundaryMode::PrefixLength { length: 1 })
        .vocabulary_path(temp_dir.path().join("words.vocabulary"))
        .build();

    fs::write(&input, "bar\t1\t1\t0\nfoo\t2\t1\t0\nbaz\t3\t1\t0\n").unwrap();
    let result = IndexBuilder::new(config.clone()).unwrap().build_from_file(&input, &index_path);
    assert!(matches!(result, Err(HybError::UnsortedWords { record: 3, .. })));
    assert!(!index_path.exists());
    assert!(!temp_dir.path().join("words.vocabulary").exists());

    fs::write(&input, "").unwrap();
    let result = IndexBuilder::new(config.clone()).unwrap().build_from_file(&input, &index_path);
    assert!(matches!(result, Err(HybError::EmptyStream)));

    let result = IndexBuilder::new(config).unwrap().build_from_file(&temp_dir.path().join("missing.txt"), &index_path);
    assert!(matches!(result, Err(HybError::Io(_))));
    assert!(!temp_index(temp_dir.path()).exists());
}

#[test]
fn test_failed_vocabulary_save_leaves_no_index() {
    init_test_logger();
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.txt");
    let index_path = temp_dir.path().join("words.hyb");
    fs::write(&input, "ab\t1\t1\t0\nba\t2\t1\t0\n").unwrap();
    let config = BuildConfig::builder()
        .boundary(BoundaryMode::Volume { volume: 10 })
        .vocabulary_path(temp_dir.path().join("missing_dir").join("words.vocabulary"))
        .build();

    let result = IndexBuilder::new(config).unwrap().build_from_file(&input, &index_path);
    assert!(result.is_err());
    assert!(!index_path.exists());
    assert!(!temp_index(temp_dir.path()).exists());
}

#[test]
fn test_truncated_index_is_refused() {
    init_test_logger();
    let temp_dir = tempdir().unwrap();
    let input = temp_dir.path().join("postings.txt");
    let index_path = temp_dir.path().join("words.hyb");
    fs::write(&input, "ab\t1\t1\t0\nac\t2\t1\t0\nba\t1\t1\t0\nbb\t5\t1\t0\n").unwrap();
    let config = BuildConfig::builder()
        .boundary(BoundaryMode::PrefixLength { length: 1 })
        .vocabulary_path(temp_dir.path().join("words.vocabulary"))
        .build();
    IndexBuilder::new(config).unwrap().build_from_file(&input, &index_path).unwrap();
    let data = fs::read(&index_path).unwrap();

    let truncated = temp_dir.path().join("truncated.hyb");
    for cut in [1, 4, 8, 16, 40, data.len() - 3] {
        fs::write(&truncated, &data[..data.len() - cut]).unwrap();
        assert!(matches!(IndexReader::open(&truncated), Err(HybError::Corrupted(_))), "cut {cut}");
    }

    let mut bad_pointer = data[..data.len() - 8].to_vec();
    bad_pointer.extend_from_slice(&(data.len() as u64 * 2).to_le_bytes());
    fs::write(&truncated, bad_pointer).unwrap();
    assert!(matches!(
        IndexReader::open(&truncated),
        Err(HybError::Corrupted(IndexCorruption::PointerOutOfRange { .. }))
    ));
}
