//! Class discovery over directories and archives.
//!
//! A library is either a directory tree of `*.class` files or an archive
//! with `*.class` entries. Archive entries are copied into owned buffers
//! before they reach the parser, so a parser-side drop can never disturb
//! the outer archive reader.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// One discovered class: its internal-ish name (path with `/` separators,
/// `.class` stripped) and the raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read library {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// A provided library of class files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Library {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl Library {
    /// Open a library path, detecting directories vs. archives.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Archive(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) | Self::Archive(path) => path,
        }
    }

    /// Enumerate every class in the library, in stable (sorted) order for
    /// directories and entry order for archives.
    pub fn classes(&self) -> Result<Vec<ClassEntry>, LibraryError> {
        match self {
            Self::Directory(path) => {
                let mut entries = Vec::new();
                walk_directory(path, path, &mut entries)?;
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                Ok(entries)
            }
            Self::Archive(path) => archive_classes(path),
        }
    }

    /// Look up a single class by internal name.
    pub fn read_class(&self, internal_name: &str) -> Result<Option<Vec<u8>>, LibraryError> {
        match self {
            Self::Directory(path) => {
                let file = path.join(format!("{internal_name}.class"));
                if !file.is_file() {
                    return Ok(None);
                }
                std::fs::read(&file).map(Some).map_err(|source| {
                    LibraryError::Io { path: file, source }
                })
            }
            Self::Archive(path) => Ok(archive_classes(path)?
                .into_iter()
                .find(|entry| entry.name == internal_name)
                .map(|entry| entry.bytes)),
        }
    }
}

fn walk_directory(
    root: &Path,
    dir: &Path,
    entries: &mut Vec<ClassEntry>,
) -> Result<(), LibraryError> {
    let io_err = |source| LibraryError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if path.is_dir() {
            walk_directory(root, &path, entries)?;
        } else if path.extension().is_some_and(|ext| ext == "class") {
            let bytes = std::fs::read(&path).map_err(|source| LibraryError::Io {
                path: path.clone(),
                source,
            })?;
            entries.push(ClassEntry {
                name: entry_name(root, &path),
                bytes,
            });
        }
    }
    Ok(())
}

/// Internal-ish name of a class file relative to the library root.
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn archive_classes(path: &Path) -> Result<Vec<ClassEntry>, LibraryError> {
    let archive_err = |source| LibraryError::Archive {
        path: path.to_path_buf(),
        source,
    };
    let io_err = |source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let mut archive = zip::ZipArchive::new(file).map_err(archive_err)?;

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_err)?;
        if !entry.name().ends_with(".class") {
            continue;
        }
        let name = entry.name().trim_end_matches(".class").to_string();
        // Copy out before the entry handle drops.
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes).map_err(io_err)?;
        entries.push(ClassEntry { name, bytes });
    }
    Ok(entries)
}
