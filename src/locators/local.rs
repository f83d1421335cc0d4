use crate::{
    environment::Environment,
    errors::VerifierError,
    objects::ContributionFolder,
};

use itertools::Itertools;
use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

///
/// Resolves contribution folders, key files, and the circuit definition
/// on the local filesystem by naming convention. Read-only.
///
#[derive(Debug, Clone)]
pub struct Local {
    root: PathBuf,
    circuit_suffix: String,
    key_suffix: String,
}

impl Local {
    pub fn new(environment: &Environment) -> Self {
        Self {
            root: environment.contributions_root().to_path_buf(),
            circuit_suffix: environment.circuit_suffix().to_string(),
            key_suffix: environment.key_suffix().to_string(),
        }
    }

    /// Returns the contribution root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the contribution root if it does not already exist.
    pub fn root_init(&self) -> Result<(), VerifierError> {
        if !self.root.exists() {
            debug!("Creating contribution root {}", self.root.display());
            fs_err::create_dir_all(&self.root)
                .map_err(|error| VerifierError::UnreadableRoot(self.root.clone(), error.to_string()))?;
        }
        Ok(())
    }

    ///
    /// Returns the contribution folders under the root, sorted by ordinal.
    ///
    /// Entries that are not directories, or whose names do not start with a digit,
    /// are ignored. Two folders with the same ordinal are rejected.
    ///
    pub fn contribution_folders(&self) -> Result<Vec<ContributionFolder>, VerifierError> {
        let entries = fs_err::read_dir(&self.root)
            .map_err(|error| VerifierError::UnreadableRoot(self.root.clone(), error.to_string()))?;

        let mut folders = vec![];
        for entry in entries {
            let entry = entry.map_err(|error| VerifierError::UnreadableRoot(self.root.clone(), error.to_string()))?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    let name = name.to_string_lossy().into_owned();
                    match name.starts_with(|c: char| c.is_ascii_digit()) {
                        true => return Err(VerifierError::UnparsableFolderName(name)),
                        false => {
                            trace!("Ignoring {} in the contribution root", name);
                            continue;
                        }
                    }
                }
            };
            match ContributionFolder::from_entry(&self.root, &name)? {
                Some(folder) => folders.push(folder),
                None => trace!("Ignoring {} in the contribution root", name),
            }
        }
        folders.sort();

        if let Some((first, second)) = folders
            .iter()
            .tuple_windows()
            .find(|(first, second)| first.ordinal() == second.ordinal())
        {
            return Err(VerifierError::DuplicateOrdinal(
                first.ordinal(),
                first.name().to_string(),
                second.name().to_string(),
            ));
        }

        Ok(folders)
    }

    /// Returns the names of the key files in the given folder, in sorted order.
    /// An empty set is a valid result.
    pub fn key_files(&self, folder: &ContributionFolder) -> Result<BTreeSet<String>, VerifierError> {
        self.files_with_suffix(folder.path(), &self.key_suffix)
    }

    /// Returns `true` if the folder holds a key file with the given name.
    /// Otherwise, returns `false`.
    pub fn key_file_exists(&self, folder: &ContributionFolder, filename: &str) -> bool {
        folder.artifact(filename).is_file()
    }

    ///
    /// Returns the path of the single circuit definition in the initial folder.
    ///
    /// Fails if no candidate exists or if more than one does.
    ///
    pub fn circuit_definition(&self, initial: &ContributionFolder) -> Result<PathBuf, VerifierError> {
        let mut candidates = self.files_with_suffix(initial.path(), &self.circuit_suffix)?;
        if candidates.len() > 1 {
            return Err(VerifierError::AmbiguousCircuitDefinition(
                initial.path().to_path_buf(),
                candidates.into_iter().collect(),
            ));
        }
        match candidates.pop_first() {
            Some(filename) => Ok(initial.artifact(&filename)),
            None => Err(VerifierError::MissingCircuitDefinition(
                initial.path().to_path_buf(),
                self.circuit_suffix.clone(),
            )),
        }
    }

    fn files_with_suffix(&self, directory: &Path, suffix: &str) -> Result<BTreeSet<String>, VerifierError> {
        let mut files = BTreeSet::new();
        for entry in fs_err::read_dir(directory)? {
            let entry = entry?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) if name.to_string_lossy().ends_with(suffix) => {
                    return Err(VerifierError::NonUtf8FileName(entry.path()));
                }
                Err(_) => continue,
            };
            if name.len() > suffix.len() && name.ends_with(suffix) && entry.path().is_file() {
                files.insert(name);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::prelude::*;

    #[test]
    fn test_contribution_folders_are_ordered() {
        let ceremony = TestCeremony::new()
            .folder("002_bob", &["a.zkey"])
            .folder("000_initial", &["circuit.r1cs", "a.zkey"])
            .folder("001_alice", &["a.zkey"]);
        ceremony.file("README.md");
        ceremony.folder_only("logs");

        let locator = Local::new(&ceremony.environment());
        let names: Vec<_> = locator
            .contribution_folders()
            .unwrap()
            .iter()
            .map(|folder| folder.name().to_string())
            .collect();
        assert_eq!(vec!["000_initial", "001_alice", "002_bob"], names);
    }

    #[test]
    fn test_contribution_folders_reject_malformed_names() {
        let ceremony = TestCeremony::new()
            .folder("000_initial", &["circuit.r1cs"])
            .folder("001alice", &["a.zkey"]);

        let locator = Local::new(&ceremony.environment());
        assert!(matches!(
            locator.contribution_folders(),
            Err(VerifierError::UnparsableFolderName(name)) if name == "001alice"
        ));
    }

    #[test]
    fn test_contribution_folders_reject_duplicate_ordinals() {
        let ceremony = TestCeremony::new()
            .folder("000_initial", &["circuit.r1cs"])
            .folder("001_alice", &["a.zkey"])
            .folder("1_mallory", &["a.zkey"]);

        let locator = Local::new(&ceremony.environment());
        assert!(matches!(
            locator.contribution_folders(),
            Err(VerifierError::DuplicateOrdinal(1, _, _))
        ));
    }

    #[test]
    fn test_unreadable_root() {
        let directory = tempfile::tempdir().unwrap();
        let environment = Environment::new(directory.path().join("missing"));

        let locator = Local::new(&environment);
        assert!(matches!(
            locator.contribution_folders(),
            Err(VerifierError::UnreadableRoot(..))
        ));

        locator.root_init().unwrap();
        assert!(locator.contribution_folders().unwrap().is_empty());
    }

    #[test]
    fn test_key_files_filter_by_suffix() {
        let ceremony = TestCeremony::new().folder("000_initial", &["circuit.r1cs", "b.zkey", "a.zkey", ".zkey", "notes.txt"]);
        ceremony.folder_only("000_initial/nested.zkey");

        let locator = Local::new(&ceremony.environment());
        let folders = locator.contribution_folders().unwrap();
        let key_files: Vec<_> = locator.key_files(&folders[0]).unwrap().into_iter().collect();
        assert_eq!(vec!["a.zkey", "b.zkey"], key_files);
        assert!(locator.key_file_exists(&folders[0], "a.zkey"));
        assert!(!locator.key_file_exists(&folders[0], "c.zkey"));
    }

    #[test]
    fn test_key_files_may_be_empty() {
        let ceremony = TestCeremony::new().folder("000_initial", &["circuit.r1cs"]);

        let locator = Local::new(&ceremony.environment());
        let folders = locator.contribution_folders().unwrap();
        assert!(locator.key_files(&folders[0]).unwrap().is_empty());
    }

    #[test]
    fn test_circuit_definition() {
        let ceremony = TestCeremony::new().folder("000_initial", &["circuit.r1cs", "a.zkey"]);

        let locator = Local::new(&ceremony.environment());
        let folders = locator.contribution_folders().unwrap();
        let circuit = locator.circuit_definition(&folders[0]).unwrap();
        assert_eq!(folders[0].artifact("circuit.r1cs"), circuit);
    }

    #[test]
    fn test_circuit_definition_missing_or_ambiguous() {
        let missing = TestCeremony::new().folder("000_initial", &["a.zkey"]);
        let locator = Local::new(&missing.environment());
        let folders = locator.contribution_folders().unwrap();
        assert!(matches!(
            locator.circuit_definition(&folders[0]),
            Err(VerifierError::MissingCircuitDefinition(..))
        ));

        let ambiguous = TestCeremony::new().folder("000_initial", &["inner.r1cs", "outer.r1cs"]);
        let locator = Local::new(&ambiguous.environment());
        let folders = locator.contribution_folders().unwrap();
        assert!(matches!(
            locator.circuit_definition(&folders[0]),
            Err(VerifierError::AmbiguousCircuitDefinition(_, candidates)) if candidates.len() == 2
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_rejected() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let ceremony = TestCeremony::new().folder("000_initial", &["circuit.r1cs", "a.zkey"]);
        let key = ceremony.root().join("000_initial").join(OsStr::from_bytes(b"b\xff.zkey"));
        std::fs::write(&key, "b").unwrap();
        std::fs::write(ceremony.root().join("000_initial").join(OsStr::from_bytes(b"notes\xff.txt")), "").unwrap();

        let locator = Local::new(&ceremony.environment());
        let folders = locator.contribution_folders().unwrap();
        assert!(matches!(
            locator.key_files(&folders[0]),
            Err(VerifierError::NonUtf8FileName(path)) if path == key
        ));

        std::fs::create_dir(ceremony.root().join(OsStr::from_bytes(b"001_\xff"))).unwrap();
        assert!(matches!(
            locator.contribution_folders(),
            Err(VerifierError::UnparsableFolderName(..))
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_entries_without_an_ordinal_are_ignored() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let ceremony = TestCeremony::new().folder("000_initial", &["circuit.r1cs", "a.zkey"]);
        std::fs::create_dir(ceremony.root().join(OsStr::from_bytes(b"logs\xff"))).unwrap();

        let locator = Local::new(&ceremony.environment());
        assert_eq!(1, locator.contribution_folders().unwrap().len());
    }
}
