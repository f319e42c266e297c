use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::huffman::{HuffmanError, Result};

pub const COMPRESSED_EXTENSION: &str = "huff";

pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => HuffmanError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => HuffmanError::Io(err),
    })?;

    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Writes `bytes` to `path` through a temporary file in the same directory.
///
/// The destination only appears once every byte is on disk; on failure the
/// temporary file is removed and any previous file at `path` is untouched.
pub fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;

    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// `notes.txt` -> `notes.txt.huff`
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(COMPRESSED_EXTENSION);
    PathBuf::from(name)
}

/// `notes.txt.huff` -> `notes_decompressed.txt`
pub fn decompressed_path(input: &Path) -> PathBuf {
    let original = if input.extension() == Some(OsStr::new(COMPRESSED_EXTENSION)) {
        input.with_extension("")
    } else {
        input.to_path_buf()
    };

    let mut name: OsString = original
        .file_stem()
        .map(OsStr::to_owned)
        .unwrap_or_else(|| OsString::from("output"));
    name.push("_decompressed");
    if let Some(extension) = original.extension() {
        name.push(".");
        name.push(extension);
    }

    original.with_file_name(name)
}
