use crate::{error::Result, storage::KeyValueStore};
use std::{
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
};

/// File-backed key/value store: one file per key under a directory
pub struct FileStore {
    root_path: PathBuf,
}

impl FileStore {
    const STORE_DIR: &'static str = ".swimlane";

    /// Creates a store rooted in `<project_root>/.swimlane`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::STORE_DIR),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Escapes a key into a portable file name (`cards:todo` -> `cards%3Atodo.json`)
    fn entry_file(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                name.push(byte as char);
            } else {
                let _ = write!(name, "%{:02X}", byte);
            }
        }
        name.push_str(".json");
        self.root_path.join(name)
    }

    fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.entry_file(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_directory_exists()?;
        fs::write(self.entry_file(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_file(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
