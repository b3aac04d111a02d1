use std::fs::File;
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

use super::{entry_name, is_archive_itself};
use crate::core::errors::{Result, ScrambleError};

/// Write `folder` into a new gzip-compressed tar at `archive`, rooted at
/// `root_name`. Symbolic links are followed; the archive itself is skipped.
pub fn write_folder(archive: &Path, folder: &Path, root_name: &str) -> Result<()> {
    let fail = |reason: String| ScrambleError::ArchiveError {
        path: archive.to_path_buf(),
        reason,
    };
    let file = File::create(archive)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for entry in WalkDir::new(folder).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| fail(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(folder)
            .map_err(|e| fail(e.to_string()))?;
        let name = entry_name(root_name, relative);

        if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path())?;
        } else if !is_archive_itself(entry.path(), archive) {
            builder.append_path_with_name(entry.path(), &name)?;
        }
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?.sync_all()?;
    Ok(())
}

/// Unpack the tar.gz at `archive` into `output_dir`.
pub fn extract(archive: &Path, output_dir: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    tar.unpack(output_dir)
        .map_err(|e| ScrambleError::ArchiveError {
            path: archive.to_path_buf(),
            reason: e.to_string(),
        })
}
