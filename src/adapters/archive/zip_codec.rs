use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use walkdir::WalkDir;
use zip::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{entry_name, is_archive_itself};
use crate::core::errors::{Result, ScrambleError};

fn codec_error(archive: &Path) -> impl Fn(String) -> ScrambleError + '_ {
    move |reason| ScrambleError::ArchiveError {
        path: archive.to_path_buf(),
        reason,
    }
}

/// Write `folder` into a new zip at `archive`, with every entry nested
/// under a single `root_name/` directory.
///
/// Directories are stored too so empty ones survive extraction.
/// Symbolic links and the archive itself are skipped.
pub fn write_folder(archive: &Path, folder: &Path, root_name: &str) -> Result<()> {
    let fail = codec_error(archive);
    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.map_err(|e| fail(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(folder)
            .map_err(|e| fail(e.to_string()))?;
        let name = entry_name(root_name, relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            zip.add_directory(format!("{name}/"), options)
                .map_err(|e| fail(e.to_string()))?;
        } else if file_type.is_file() {
            if is_archive_itself(entry.path(), archive) {
                continue;
            }
            let size = entry.metadata().map_err(|e| fail(e.to_string()))?.len();
            let options = SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .large_file(size >= u64::from(u32::MAX));
            zip.start_file(name, options)
                .map_err(|e| fail(e.to_string()))?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        } else {
            tracing::warn!(path = %entry.path().display(), "skipping non-regular file");
        }
    }

    let writer = zip.finish().map_err(|e| fail(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| fail(e.to_string()))?
        .sync_all()?;
    Ok(())
}

/// Extract every entry of the zip at `archive` into `output_dir`.
pub fn extract(archive: &Path, output_dir: &Path) -> Result<()> {
    let fail = codec_error(archive);
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;
    zip.extract(output_dir).map_err(|e| fail(e.to_string()))
}
