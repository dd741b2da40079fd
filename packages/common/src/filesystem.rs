use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// File system abstraction for project storage and testing
pub trait FileSystem {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String, io::Error>;

    /// Write a file, creating parent directories as needed
    fn write(&self, path: &Path, contents: &str) -> Result<(), io::Error>;

    /// Files directly inside `dir`, sorted by path
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String, io::Error> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// In-memory file system for testing
#[derive(Default)]
pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.into(), contents.into());
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.add_file(path, contents);
        self
    }

    /// Current contents of a file, for assertions
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let files = self.files.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        files.contains_key(path) || files.keys().any(|file| file.starts_with(path))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, io::Error> {
        self.contents(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), io::Error> {
        self.files
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let files = self.files.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let listed: Vec<PathBuf> = files
            .keys()
            .filter(|file| file.parent() == Some(dir))
            .cloned()
            .collect();
        if listed.is_empty() && !files.keys().any(|file| file.starts_with(dir)) {
            return Err(not_found(dir));
        }
        Ok(listed)
    }
}
