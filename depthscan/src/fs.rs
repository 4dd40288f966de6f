//! Filesystem access used by the traverser and the content scanner.
//!
//! The engine never touches `std::fs` directly; everything goes through the
//! [`FileSystem`] trait so tests can simulate unreadable directories and files
//! that vanish between discovery and scanning.
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A regular file found while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
}

/// The directory and file operations the search engine depends on.
pub trait FileSystem {
    /// Whether `path` exists and is an accessible directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `dir`. Directory symlinks are not listed.
    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Regular files directly inside `dir`, following file symlinks.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<FileEntry>>;

    /// Opens a file for sequential reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) && fs::read_dir(path).is_ok()
    }

    fn list_dirs(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                continue;
            }
            // symlinks are resolved; dangling ones are dropped
            let metadata = match entry.metadata() {
                Ok(m) if !file_type.is_symlink() => m,
                _ => match fs::metadata(entry.path()) {
                    Ok(m) => m,
                    Err(_) => continue,
                },
            };
            if !metadata.is_file() {
                continue;
            }
            files.push(FileEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: metadata.len(),
            });
        }
        Ok(files)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(path)?))
    }
}
