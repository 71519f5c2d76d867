//! # Headless Files
//!
//! Resolves logical paths to filesystem paths by [`FileType`].
//!
//! ```text
//! Classpath ─┐
//! Internal  ─┴─► internal_root/path   (read-only)
//! Local     ───► local_root/path
//! External  ───► $HOME/path
//! Absolute  ───► path
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempo_shared::constants::CACHE_DIR_NAME;

use crate::error::{MockError, MockResult};

/// Where a logical path is resolved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileType {
    /// Bundled with the application. Read-only.
    Classpath,
    /// Relative to the internal root. Read-only.
    Internal,
    /// Relative to the user's home directory.
    External,
    /// Used as given.
    Absolute,
    /// Relative to the local root.
    Local,
}

impl FileType {
    /// Returns `true` for types that can never be written.
    #[inline]
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Classpath | Self::Internal)
    }
}

/// File resolver for a headless application.
#[derive(Clone, Debug)]
pub struct HeadlessFiles {
    internal_root: PathBuf,
    local_root: PathBuf,
    external_root: Option<PathBuf>,
}

impl HeadlessFiles {
    /// Creates a resolver. External files resolve against the home directory
    /// when one can be determined.
    #[must_use]
    pub fn new(internal_root: impl Into<PathBuf>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            internal_root: internal_root.into(),
            local_root: local_root.into(),
            external_root: dirs::home_dir(),
        }
    }

    /// Overrides the external root.
    #[must_use]
    pub fn with_external_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.external_root = Some(root.into());
        self
    }

    /// Root for internal and classpath files.
    #[must_use]
    pub fn internal_storage_path(&self) -> &Path {
        &self.internal_root
    }

    /// Root for local files.
    #[must_use]
    pub fn local_storage_path(&self) -> &Path {
        &self.local_root
    }

    /// Root for external files, if any.
    #[must_use]
    pub fn external_storage_path(&self) -> Option<&Path> {
        self.external_root.as_deref()
    }

    /// Returns `true` if external files can be resolved.
    #[must_use]
    pub fn is_external_storage_available(&self) -> bool {
        self.external_root.is_some()
    }

    /// Maps a logical path to a filesystem path.
    ///
    /// # Errors
    ///
    /// [`MockError::ExternalUnavailable`] for [`FileType::External`] without
    /// a home directory.
    pub fn resolve(&self, path: impl AsRef<Path>, kind: FileType) -> MockResult<PathBuf> {
        let path = path.as_ref();
        match kind {
            FileType::Classpath | FileType::Internal => Ok(self.internal_root.join(path)),
            FileType::Local => Ok(self.local_root.join(path)),
            FileType::External => self
                .external_root
                .as_ref()
                .map(|root| root.join(path))
                .ok_or(MockError::ExternalUnavailable),
            FileType::Absolute => Ok(path.to_path_buf()),
        }
    }

    /// Resolves `path` under the local cache directory.
    #[must_use]
    pub fn cache(&self, path: impl AsRef<Path>) -> PathBuf {
        self.local_root.join(CACHE_DIR_NAME).join(path)
    }

    /// Returns `true` if the resolved path exists.
    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>, kind: FileType) -> bool {
        self.resolve(path, kind).is_ok_and(|resolved| resolved.exists())
    }

    /// Reads a file as UTF-8.
    ///
    /// # Errors
    ///
    /// [`MockError::NotFound`] if the file does not exist,
    /// [`MockError::Io`] on any other read failure.
    pub fn read_to_string(&self, path: impl AsRef<Path>, kind: FileType) -> MockResult<String> {
        let resolved = self.resolve(path, kind)?;
        fs::read_to_string(&resolved).map_err(|err| read_error(resolved, err))
    }

    /// Reads a file as bytes.
    ///
    /// # Errors
    ///
    /// As [`read_to_string`](Self::read_to_string).
    pub fn read(&self, path: impl AsRef<Path>, kind: FileType) -> MockResult<Vec<u8>> {
        let resolved = self.resolve(path, kind)?;
        fs::read(&resolved).map_err(|err| read_error(resolved, err))
    }

    /// Writes `contents`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// [`MockError::ReadOnly`] for read-only types, [`MockError::Io`] on
    /// write failure.
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        kind: FileType,
        contents: impl AsRef<[u8]>,
    ) -> MockResult<()> {
        let path = path.as_ref();
        if kind.is_read_only() {
            return Err(MockError::ReadOnly {
                path: path.to_path_buf(),
                kind,
            });
        }
        let resolved = self.resolve(path, kind)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).map_err(|err| MockError::io(parent, err))?;
        }
        fs::write(&resolved, contents).map_err(|err| MockError::io(resolved, err))
    }
}

fn read_error(path: PathBuf, err: io::Error) -> MockError {
    if err.kind() == io::ErrorKind::NotFound {
        MockError::NotFound(path)
    } else {
        MockError::io(path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files_in(dir: &Path) -> HeadlessFiles {
        HeadlessFiles::new(dir.join("assets"), dir.join("local")).with_external_root(dir.join("home"))
    }

    #[test]
    fn test_resolution_by_type() {
        let files = HeadlessFiles::new("/opt/app", "/var/app").with_external_root("/home/u");

        assert_eq!(
            files.resolve("a.txt", FileType::Internal).unwrap(),
            PathBuf::from("/opt/app/a.txt")
        );
        assert_eq!(
            files.resolve("a.txt", FileType::Classpath).unwrap(),
            PathBuf::from("/opt/app/a.txt")
        );
        assert_eq!(
            files.resolve("a.txt", FileType::Local).unwrap(),
            PathBuf::from("/var/app/a.txt")
        );
        assert_eq!(
            files.resolve("a.txt", FileType::External).unwrap(),
            PathBuf::from("/home/u/a.txt")
        );
        assert_eq!(
            files.resolve("/etc/hosts", FileType::Absolute).unwrap(),
            PathBuf::from("/etc/hosts")
        );
        assert_eq!(files.cache("x.bin"), PathBuf::from("/var/app/cache/x.bin"));
    }

    #[test]
    fn test_internal_files_are_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(dir.path());

        let err = files
            .write("config.txt", FileType::Internal, "x")
            .unwrap_err();
        assert!(matches!(
            err,
            MockError::ReadOnly {
                kind: FileType::Internal,
                ..
            }
        ));
        assert!(FileType::Classpath.is_read_only());
        assert!(!FileType::Local.is_read_only());
    }

    #[test]
    fn test_missing_internal_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(dir.path());

        let err = files.read_to_string("missing.txt", FileType::Internal).unwrap_err();
        assert!(matches!(err, MockError::NotFound(_)));
        assert!(!files.exists("missing.txt", FileType::Internal));
    }

    #[test]
    fn test_local_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(dir.path());

        files
            .write("saves/slot1.txt", FileType::Local, "level=3")
            .unwrap();
        assert!(files.exists("saves/slot1.txt", FileType::Local));
        assert_eq!(
            files.read_to_string("saves/slot1.txt", FileType::Local).unwrap(),
            "level=3"
        );
        assert_eq!(files.read("saves/slot1.txt", FileType::Local).unwrap(), b"level=3");
    }

    #[test]
    fn test_external_unavailable() {
        let mut files = HeadlessFiles::new(".", ".");
        files.external_root = None;

        assert!(!files.is_external_storage_available());
        assert!(matches!(
            files.resolve("a", FileType::External),
            Err(MockError::ExternalUnavailable)
        ));
    }
}
