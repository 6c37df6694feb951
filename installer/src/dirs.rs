//! Directory resolution abstraction for platform-specific paths.
//!
//! The installer only needs the configuration directory, but routing it
//! through a trait lets tests point lookups at a temporary directory instead
//! of the user's real profile.

use camino::Utf8PathBuf;

/// Application name used for platform directory lookups.
pub const APPLICATION_NAME: &str = "appkg";

/// Source of per-user directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// Directory holding `appkg.toml`, if the platform defines one.
    fn config_dir(&self) -> Option<Utf8PathBuf>;
}

/// Platform directories resolved with `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<Utf8PathBuf> {
        let dirs = directories_next::ProjectDirs::from("", "", APPLICATION_NAME)?;
        Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok()
    }
}

/// A [`BaseDirs`] that always answers with a fixed directory.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FixedBaseDirs {
    /// The directory returned by [`BaseDirs::config_dir`].
    pub config_dir: Option<Utf8PathBuf>,
}

#[cfg(any(test, feature = "test-support"))]
impl BaseDirs for FixedBaseDirs {
    fn config_dir(&self) -> Option<Utf8PathBuf> {
        self.config_dir.clone()
    }
}
