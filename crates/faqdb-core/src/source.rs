use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Read a whole source file into memory.
///
/// Invalid UTF-8 is decoded lossily rather than rejected; a missing or
/// unreadable file is `SourceUnavailable`.
pub fn read_source(path: &Path) -> Result<String> {
    let unavailable = |e: std::io::Error| Error::SourceUnavailable { source_id: path.display().to_string(), reason: e.to_string() };
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!(path = %path.display(), "source is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(&fs::read(path).map_err(unavailable)?).into_owned())
        }
        Err(e) => Err(unavailable(e)),
    }
}

/// All `.txt` files under `root`, recursively, in sorted order.
pub fn list_txt_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::SourceUnavailable { source_id: root.display().to_string(), reason: "not a directory".to_string() });
    }
    let mut txt_files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("txt") { txt_files.push(path.to_path_buf()); }
    }
    txt_files.sort();
    Ok(txt_files)
}
