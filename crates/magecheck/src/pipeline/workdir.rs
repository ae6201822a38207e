//! Scoped change of the process working directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{MagetabError, Result};

/// Switches the working directory and restores the previous one on drop.
///
/// The working directory is process-wide. Keep the guard alive only around
/// the call that needs relative paths to resolve against `dir`.
#[derive(Debug)]
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter(dir: &Path) -> Result<Self> {
        let original = env::current_dir().map_err(|e| MagetabError::io(".", e))?;
        env::set_current_dir(dir).map_err(|e| MagetabError::io(dir, e))?;
        log::debug!("Working directory: {} -> {}", original.display(), dir.display());
        Ok(Self { original })
    }

    /// Directory restored on drop.
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            log::error!(
                "Could not restore working directory {}: {}",
                self.original.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only unit test in this crate that changes the working directory.
    #[test]
    fn test_restores_on_drop_and_panic() {
        let before = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().canonicalize().unwrap();

        {
            let guard = WorkingDirGuard::enter(&target).unwrap();
            assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), target);
            assert_eq!(guard.original(), before.as_path());
        }
        assert_eq!(env::current_dir().unwrap(), before);

        let result = std::panic::catch_unwind(|| {
            let _guard = WorkingDirGuard::enter(&target).unwrap();
            panic!("full parse blew up");
        });
        assert!(result.is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            WorkingDirGuard::enter(&missing),
            Err(MagetabError::Io { .. })
        ));
    }
}
