use crate::utils::error::Result;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

/// Checks that a folder payload is a readable zip and counts its entries.
pub fn entry_count(archive: &[u8]) -> Result<usize> {
    let archive = ZipArchive::new(Cursor::new(archive))?;
    Ok(archive.len())
}

/// Extracts every entry under `dest`. Entry names that escape `dest` are
/// rejected by the zip crate.
pub fn unpack(archive: &[u8], dest: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let entries = archive.len();
    tracing::debug!("Unpacking {} entries into {}", entries, dest.display());
    archive.extract(dest)?;
    Ok(entries)
}
