use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use simple_error::simple_error;
use walkdir::{DirEntry, WalkDir};

/// Make sure `path` is an existing, empty directory. Anything already in it
/// is removed.
pub async fn empty_dir(path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await?,
        Ok(_) => {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                simple_error!("path exists but is not a directory"),
            ))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    tokio::fs::create_dir_all(path).await
}

fn has_ext(entry: &DirEntry, ext: &OsStr) -> bool {
    entry.path().extension().map_or(false, |ext_| ext_ == ext)
}

/// Files directly inside `path` with the given extension, sorted by name.
pub fn files_with_ext_blocking<P, Q>(path: P, ext: Q) -> Vec<PathBuf>
where
    P: AsRef<Path>,
    Q: AsRef<OsStr>,
{
    WalkDir::new(path.as_ref())
        .min_depth(1)
        .max_depth(1)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_ext(entry, ext.as_ref()))
        .map(DirEntry::into_path)
        .collect()
}

pub async fn files_with_ext<P, Q>(path: P, ext: Q) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    Q: AsRef<OsStr>,
{
    let path = path.as_ref().to_owned();
    let ext = ext.as_ref().to_owned();
    tokio::task::spawn_blocking(move || files_with_ext_blocking(path, ext))
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}
