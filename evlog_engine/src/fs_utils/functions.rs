use evlog_types::{LogError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

fn fs_err<'a>(op: &'static str, path: &'a Path) -> impl 'a + FnOnce(io::Error) -> LogError {
    move |source| LogError::Fs {
        op,
        path: path.into(),
        source,
    }
}

pub fn create_dir_all<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(fs_err("create_dir_all", path))
}

pub fn open_file<P: AsRef<Path>>(path: P, oo: &OpenOptions) -> Result<File> {
    let path = path.as_ref();
    oo.open(path).map_err(fs_err("open", path))
}

pub fn file_len<P: AsRef<Path>>(file: &File, path: P) -> Result<u64> {
    let meta = file.metadata().map_err(fs_err("metadata", path.as_ref()))?;
    Ok(meta.len())
}

/// Takes the advisory exclusive lock without blocking.
/// Contention is reported as [`LogError::WriterConflict`].
pub fn lock_file<P: AsRef<Path>>(file: &File, path: P) -> Result<()> {
    let path = path.as_ref();
    FileExt::try_lock_exclusive(file).map_err(|source| {
        if source.kind() == fs2::lock_contended_error().kind() {
            LogError::WriterConflict {
                path: path.into(),
                source,
            }
        } else {
            fs_err("try_lock_exclusive", path)(source)
        }
    })
}

pub fn unlock_file<P: AsRef<Path>>(file: &File, path: P) -> Result<()> {
    let path = path.as_ref();
    FileExt::unlock(file).map_err(fs_err("unlock", path))
}

pub fn set_len<P: AsRef<Path>>(file: &File, len: u64, path: P) -> Result<()> {
    file.set_len(len).map_err(fs_err("set_len", path.as_ref()))
}

pub fn sync_data<P: AsRef<Path>>(file: &File, path: P) -> Result<()> {
    file.sync_data().map_err(fs_err("sync_data", path.as_ref()))
}
