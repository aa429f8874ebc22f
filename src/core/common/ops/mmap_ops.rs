use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::common::constants::INDEX_TEMP_FILE_EXTENSION;

/// Path an index is written to before it is renamed into place.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(INDEX_TEMP_FILE_EXTENSION);
    path.with_file_name(name)
}

/// Create (or truncate) the temporary file for `path`.
pub fn create_temp_file(path: &Path) -> Result<(File, PathBuf), io::Error> {
    let temp_path = temp_path_for(path);
    let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(&temp_path)?;
    Ok((file, temp_path))
}

/// Persist a finished temp file under its final name.
pub fn commit_temp_file(temp_path: &Path, path: &Path) -> Result<(), io::Error> {
    fs::rename(temp_path, path)
}

/// Open an existing file as a read-only map. Empty files yield an empty map.
pub fn open_read_mmap(path: &Path) -> Result<Mmap, io::Error> {
    let file = OpenOptions::new().read(true).write(false).create(false).open(path)?;

    // Finished index files are immutable, nothing else writes to the mapping.
    let mmap = unsafe { Mmap::map(&file)? };
    #[cfg(unix)]
    if !mmap.is_empty() {
        mmap.advise(memmap2::Advice::Random)?;
    }

    Ok(mmap)
}
