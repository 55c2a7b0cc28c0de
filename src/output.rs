//! Output file naming and writing.

use crate::defaults::OUTPUT_SUFFIX;
use crate::error::{Result, TrsuError};
use std::path::{Path, PathBuf};

/// Derive the output path for `input`.
///
/// The input is made absolute and the first occurrence of its extension
/// (dot included) in the file name is replaced by [`OUTPUT_SUFFIX`]. For
/// `a.txt.txt` that is the first `.txt`, giving `a-trsu.txt.txt`. Names
/// without an extension get the suffix appended.
pub fn output_path(input: &Path) -> Result<PathBuf> {
    let full = std::path::absolute(input)?;
    let file_name = full
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| TrsuError::Other(format!("Not a file path: {}", input.display())))?;

    let new_name = match full.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => file_name.replacen(&format!(".{ext}"), OUTPUT_SUFFIX, 1),
        None => format!("{file_name}{OUTPUT_SUFFIX}"),
    };

    Ok(full.with_file_name(new_name))
}

/// Write `reply` next to `input`, replacing any existing file, and return
/// the path written.
pub async fn write_reply(input: &Path, reply: &str) -> Result<PathBuf> {
    let path = output_path(input)?;
    tokio::fs::write(&path, reply).await?;
    tracing::debug!(path = %path.display(), bytes = reply.len(), "reply written");
    Ok(path)
}
