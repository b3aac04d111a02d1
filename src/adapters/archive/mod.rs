pub mod tar_gz_codec;
pub mod zip_codec;

use std::path::Path;

/// Entry name for `relative` under `root_name`, always `/`-separated.
fn entry_name(root_name: &str, relative: &Path) -> String {
    let mut name = root_name.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

/// Whether a walked `path` is the archive being written.
///
/// The archive may sit inside the folder it packs (e.g. when the scratch
/// directory is under it) and must never end up inside itself.
fn is_archive_itself(path: &Path, archive: &Path) -> bool {
    if path.file_name() != archive.file_name() {
        return false;
    }
    match (path.canonicalize(), archive.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
