use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use std::fs::File;
use std::path::Path;
use tempfile::NamedTempFile;

/// Stages a write in a temporary file beside `destination` and renames it into place.
///
/// If `write` fails the temporary file is dropped and `destination` is untouched.
pub fn write_atomically(destination: &Path, write: impl FnOnce(&mut File) -> Result<u64>) -> Result<u64> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_raise(|| ErrorKind::InvalidPath(destination.to_path_buf()))?;
    std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
    let mut staged = NamedTempFile::new_in(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
    let written = write(staged.as_file_mut())?;
    staged.as_file().sync_all().or_raise(|| ErrorKind::Io(staged.path().to_path_buf()))?;
    staged.persist(destination).or_raise(|| ErrorKind::Io(destination.to_path_buf()))?;
    Ok(written)
}
