use crate::environment::Environment;

use std::{fs, path::Path};
use tempfile::TempDir;

///
/// A contribution root in a temporary directory, removed when dropped.
///
pub struct TestCeremony {
    directory: TempDir,
}

impl TestCeremony {
    pub fn new() -> Self {
        Self {
            directory: tempfile::tempdir().expect("unable to create a temporary contribution root"),
        }
    }

    /// Adds a contribution folder holding the given files.
    pub fn folder(self, name: &str, files: &[&str]) -> Self {
        write_folder(self.root(), name, files);
        self
    }

    /// Creates a directory (or nested directories) under the root.
    pub fn folder_only(&self, name: &str) {
        fs::create_dir_all(self.root().join(name)).expect("unable to create the directory");
    }

    /// Creates a file directly under the root.
    pub fn file(&self, name: &str) {
        fs::write(self.root().join(name), name).expect("unable to write the file");
    }

    pub fn root(&self) -> &Path {
        self.directory.path()
    }

    pub fn environment(&self) -> Environment {
        Environment::new(self.root())
    }
}

/// Writes a contribution folder whose files contain their own relative path.
pub fn write_folder(root: &Path, name: &str, files: &[&str]) {
    let folder = root.join(name);
    fs::create_dir_all(&folder).expect("unable to create the contribution folder");
    for file in files {
        fs::write(folder.join(file), format!("{}/{}", name, file)).expect("unable to write the key file");
    }
}
