use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub fn atomic_save_json<T: Serialize>(path: &Path, object: &T) -> Result<(), FileOperationError> {
    let af = AtomicFile::new(path, OverwriteBehavior::AllowOverwrite);
    af.write(|f| serde_json::to_writer_pretty(BufWriter::new(f), object))?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FileOperationError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let data = serde_json::from_reader(reader)?;
    Ok(data)
}

/// Write one entry per line, replacing `path` atomically.
pub fn atomic_save_lines<'a, I>(path: &Path, lines: I) -> Result<(), FileOperationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let af = AtomicFile::new(path, OverwriteBehavior::AllowOverwrite);
    af.write(|f| -> io::Result<()> {
        let mut writer = BufWriter::new(f);
        for line in lines {
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    })?;
    Ok(())
}

/// Read all lines of a text file; line `n` (0-based) lands at index `n`.
pub fn read_lines(path: &Path) -> Result<Vec<String>, FileOperationError> {
    let file = File::open(path).map_err(|e| {
        FileOperationError::FileOperationError(format!("can't open '{}': {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    Ok(lines)
}

#[derive(Debug, Error)]
pub enum FileOperationError {
    #[error(transparent)]
    IoError(#[from] io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error(transparent)]
    AtomicWriteError(#[from] atomicwrites::Error<io::Error>),

    #[error(transparent)]
    AtomicWriteSerdeJsonError(#[from] atomicwrites::Error<serde_json::Error>),

    #[error("'{0}'")]
    FileOperationError(String),
}
