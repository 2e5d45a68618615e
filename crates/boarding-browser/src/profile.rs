use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Chrome user data directory for one run.
///
/// Temporary profiles give every run a clean cookie jar, so the cookie banner
/// is always shown; they are removed when the profile is dropped.
pub enum BrowserProfile {
    Temporary(TempDir),
    Persistent(PathBuf),
}

impl BrowserProfile {
    pub fn temporary() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("boarding-profile-").tempdir()?;
        tracing::debug!("Using temporary profile {}", dir.path().display());
        Ok(BrowserProfile::Temporary(dir))
    }

    /// Reuse (or create) a profile directory across runs
    pub fn persistent(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        tracing::debug!("Using profile {}", path.display());
        Ok(BrowserProfile::Persistent(path))
    }

    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::persistent(path),
            None => Self::temporary(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            BrowserProfile::Temporary(dir) => dir.path(),
            BrowserProfile::Persistent(path) => path,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, BrowserProfile::Temporary(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_profile_is_removed_on_drop() {
        let profile = BrowserProfile::temporary().unwrap();
        let path = profile.path().to_path_buf();

        assert!(path.is_dir());
        assert!(profile.is_temporary());

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_persistent_profile_survives_drop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let profile_path = temp_dir.path().join("nested").join("profile");

        let profile = BrowserProfile::open(Some(profile_path.clone())).unwrap();
        assert!(profile_path.is_dir());
        assert!(!profile.is_temporary());

        drop(profile);
        assert!(profile_path.exists());
    }
}
