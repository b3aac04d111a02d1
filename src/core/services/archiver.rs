use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::adapters::archive::{tar_gz_codec, zip_codec};
use crate::core::errors::{Result, ScrambleError};
use crate::core::models::compression::CompressionMethod;

/// Local file header signature of a zip archive.
const ZIP_MAGIC: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
/// gzip member header, used for tar.gz.
const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];

/// Archive format as detected from file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

/// Packs a folder into one transient archive file and unpacks archives
/// back into folders.
#[derive(Debug, Clone)]
pub struct Archiver {
    /// Where transient archives are created.
    scratch_dir: PathBuf,
}

impl Archiver {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }

    /// Compress `folder` into a fresh temporary archive.
    ///
    /// The archive holds one top-level entry named after the folder. The
    /// returned path deletes the file when dropped.
    pub fn compress(&self, folder: &Path, method: CompressionMethod) -> Result<TempPath> {
        if !folder.is_dir() {
            return Err(ScrambleError::NotADirectory {
                path: folder.to_path_buf(),
            });
        }
        let root_name = folder_name(folder)?;

        let archive = tempfile::Builder::new()
            .prefix("jibberscramble-")
            .suffix(method.suffix())
            .tempfile_in(&self.scratch_dir)?
            .into_temp_path();

        match method {
            CompressionMethod::Zip => zip_codec::write_folder(&archive, folder, &root_name)?,
            CompressionMethod::TarGz => tar_gz_codec::write_folder(&archive, folder, &root_name)?,
        }

        tracing::debug!(
            folder = %folder.display(),
            archive = %archive.display(),
            %method,
            "compressed folder"
        );
        Ok(archive)
    }

    /// Extract `archive` into `output_dir`, creating it if needed.
    ///
    /// The format comes from the file's leading bytes, never its name.
    pub fn decompress(&self, archive: &Path, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;

        match detect_format(archive)? {
            ArchiveFormat::Zip => zip_codec::extract(archive, output_dir)?,
            ArchiveFormat::TarGz => tar_gz_codec::extract(archive, output_dir)?,
        }

        Ok(output_dir.to_path_buf())
    }
}

impl Default for Archiver {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

/// Identify an archive by its magic bytes.
pub fn detect_format(archive: &Path) -> Result<ArchiveFormat> {
    let mut head = Vec::with_capacity(ZIP_MAGIC.len());
    File::open(archive)?
        .take(ZIP_MAGIC.len() as u64)
        .read_to_end(&mut head)?;

    if head.starts_with(ZIP_MAGIC) {
        Ok(ArchiveFormat::Zip)
    } else if head.starts_with(GZIP_MAGIC) {
        Ok(ArchiveFormat::TarGz)
    } else {
        Err(ScrambleError::UnrecognizedFormat {
            path: archive.to_path_buf(),
        })
    }
}

/// Base name of `folder`, resolving `.` and similar through the filesystem.
fn folder_name(folder: &Path) -> Result<String> {
    if let Some(name) = folder.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }
    let canonical = folder.canonicalize()?;
    Ok(canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string()))
}
