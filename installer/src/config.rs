//! Installer configuration from `appkg.toml`.
//!
//! The file is optional. When `--config` names a file it must exist; the
//! platform default location is consulted only if present. Values in the
//! file fill gaps left by command-line flags.

use crate::cli::InstallArgs;
use crate::dirs::BaseDirs;
use crate::error::{InstallerError, Result};
use appkg::SourceType;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILENAME: &str = "appkg.toml";

/// Settings read from `appkg.toml`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Directory in which extraction directories are created.
    pub temp_dir: Option<Utf8PathBuf>,
    /// Default destination for installed applications.
    pub install_dir: Option<Utf8PathBuf>,
    /// Default origin recorded on installed applications.
    pub source_type: Option<SourceType>,
    /// Suppress progress output unless overridden.
    pub quiet: Option<bool>,
}

impl InstallerConfig {
    /// Load configuration from `explicit`, or from the platform location.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ConfigNotFound`] when `explicit` does not
    /// exist, and [`InstallerError::Config`] when a file cannot be read or
    /// parsed.
    pub fn load(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(InstallerError::ConfigNotFound {
                    path: path.to_owned(),
                });
            }
            return Self::from_file(path);
        }

        match dirs.config_dir().map(|dir| dir.join(CONFIG_FILENAME)) {
            Some(path) if path.is_file() => Self::from_file(&path),
            Some(path) => {
                debug!("no configuration at {path}; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] when the file cannot be read or
    /// does not match the expected schema.
    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        debug!("reading configuration from {path}");
        let text = std::fs::read_to_string(path).map_err(|err| InstallerError::Config {
            path: path.to_owned(),
            reason: err.to_string(),
        })?;
        toml::from_str(&text).map_err(|err| InstallerError::Config {
            path: path.to_owned(),
            reason: err.message().to_owned(),
        })
    }
}

/// Effective install settings after merging flags over the file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstallSettings {
    /// Directory for extraction directories, if not the system default.
    pub temp_dir: Option<Utf8PathBuf>,
    /// Directory under which the application tree is kept, if any.
    pub dest: Option<Utf8PathBuf>,
    /// Origin recorded on the application.
    pub source_type: SourceType,
    /// Whether progress output is suppressed.
    pub quiet: bool,
}

impl InstallSettings {
    /// Merge command-line `args` over `config`, falling back to defaults.
    #[must_use]
    pub fn resolve(args: &InstallArgs, config: &InstallerConfig) -> Self {
        Self {
            temp_dir: args.temp_dir.clone().or_else(|| config.temp_dir.clone()),
            dest: args.dest.clone().or_else(|| config.install_dir.clone()),
            source_type: args
                .source_type
                .or(config.source_type)
                .unwrap_or_default(),
            quiet: args.quiet || (args.verbosity == 0 && config.quiet.unwrap_or(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirs::{FixedBaseDirs, MockBaseDirs};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn config_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path")
    }

    #[rstest]
    fn deserialises_all_keys() {
        let source = concat!(
            "temp_dir = \"/var/tmp\"\n",
            "install_dir = \"/opt/apps\"\n",
            "source_type = \"external\"\n",
            "quiet = true\n",
        );

        let config: InstallerConfig = toml::from_str(source).expect("valid config");

        assert_eq!(config.temp_dir, Some(Utf8PathBuf::from("/var/tmp")));
        assert_eq!(config.install_dir, Some(Utf8PathBuf::from("/opt/apps")));
        assert_eq!(config.source_type, Some(SourceType::External));
        assert_eq!(config.quiet, Some(true));
    }

    #[rstest]
    #[case::unknown_key("colour = \"blue\"\n")]
    #[case::bad_source_type("source_type = \"sideloaded\"\n")]
    #[case::wrong_type("quiet = \"yes\"\n")]
    fn rejects_invalid_files(#[case] source: &str) {
        let outcome: std::result::Result<InstallerConfig, _> = toml::from_str(source);
        assert!(outcome.is_err(), "expected {source:?} to be rejected");
    }

    #[rstest]
    fn missing_explicit_file_is_config_not_found(config_dir: TempDir) {
        let path = utf8(&config_dir).join("absent.toml");

        let err = InstallerConfig::load(Some(&path), &FixedBaseDirs::default())
            .expect_err("expected failure");

        assert!(matches!(err, InstallerError::ConfigNotFound { .. }), "got {err:?}");
    }

    #[rstest]
    fn missing_default_file_yields_defaults(config_dir: TempDir) {
        let dirs = FixedBaseDirs {
            config_dir: Some(utf8(&config_dir)),
        };

        let config = InstallerConfig::load(None, &dirs).expect("defaults");

        assert_eq!(config, InstallerConfig::default());
    }

    #[test]
    fn no_platform_directory_yields_defaults() {
        let mut dirs = MockBaseDirs::new();
        dirs.expect_config_dir().times(1).returning(|| None);

        let config = InstallerConfig::load(None, &dirs).expect("defaults");

        assert_eq!(config, InstallerConfig::default());
    }

    #[rstest]
    fn reads_default_file_from_platform_directory(config_dir: TempDir) {
        std::fs::write(
            config_dir.path().join(CONFIG_FILENAME),
            "install_dir = \"/srv/apps\"\n",
        )
        .expect("write config");
        let dirs = FixedBaseDirs {
            config_dir: Some(utf8(&config_dir)),
        };

        let config = InstallerConfig::load(None, &dirs).expect("config");

        assert_eq!(config.install_dir, Some(Utf8PathBuf::from("/srv/apps")));
    }

    #[rstest]
    fn explicit_file_wins_over_platform_directory(config_dir: TempDir) {
        let explicit = utf8(&config_dir).join("custom.toml");
        std::fs::write(&explicit, "quiet = true\n").expect("write config");
        let mut dirs = MockBaseDirs::new();
        dirs.expect_config_dir().never();

        let config = InstallerConfig::load(Some(&explicit), &dirs).expect("config");

        assert_eq!(config.quiet, Some(true));
    }

    #[rstest]
    fn malformed_file_is_config_error(config_dir: TempDir) {
        let explicit = utf8(&config_dir).join("broken.toml");
        std::fs::write(&explicit, "temp_dir = \n").expect("write config");

        let err = InstallerConfig::load(Some(&explicit), &FixedBaseDirs::default())
            .expect_err("expected failure");

        assert!(matches!(err, InstallerError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn flags_override_file_values() {
        let args = InstallArgs {
            temp_dir: Some(Utf8PathBuf::from("/flag/tmp")),
            dest: Some(Utf8PathBuf::from("/flag/dest")),
            source_type: Some(SourceType::CommandLine),
            ..InstallArgs::default()
        };
        let config = InstallerConfig {
            temp_dir: Some(Utf8PathBuf::from("/file/tmp")),
            install_dir: Some(Utf8PathBuf::from("/file/dest")),
            source_type: Some(SourceType::External),
            quiet: None,
        };

        let settings = InstallSettings::resolve(&args, &config);

        assert_eq!(settings.temp_dir, Some(Utf8PathBuf::from("/flag/tmp")));
        assert_eq!(settings.dest, Some(Utf8PathBuf::from("/flag/dest")));
        assert_eq!(settings.source_type, SourceType::CommandLine);
    }

    #[test]
    fn file_values_fill_gaps() {
        let config = InstallerConfig {
            temp_dir: Some(Utf8PathBuf::from("/file/tmp")),
            install_dir: Some(Utf8PathBuf::from("/file/dest")),
            source_type: Some(SourceType::External),
            quiet: Some(true),
        };

        let settings = InstallSettings::resolve(&InstallArgs::default(), &config);

        assert_eq!(settings.temp_dir, Some(Utf8PathBuf::from("/file/tmp")));
        assert_eq!(settings.dest, Some(Utf8PathBuf::from("/file/dest")));
        assert_eq!(settings.source_type, SourceType::External);
        assert!(settings.quiet);
    }

    #[rstest]
    #[case::defaults(0, false, None, false)]
    #[case::file_quiet(0, false, Some(true), true)]
    #[case::verbose_beats_file(1, false, Some(true), false)]
    #[case::flag_quiet(0, true, Some(false), true)]
    fn quiet_resolution(
        #[case] verbosity: u8,
        #[case] quiet_flag: bool,
        #[case] quiet_file: Option<bool>,
        #[case] expected: bool,
    ) {
        let args = InstallArgs {
            verbosity,
            quiet: quiet_flag,
            ..InstallArgs::default()
        };
        let config = InstallerConfig {
            quiet: quiet_file,
            ..InstallerConfig::default()
        };

        assert_eq!(InstallSettings::resolve(&args, &config).quiet, expected);
    }

    #[test]
    fn defaults_without_any_source() {
        let settings = InstallSettings::resolve(&InstallArgs::default(), &InstallerConfig::default());
        assert_eq!(settings, InstallSettings::default());
        assert_eq!(settings.source_type, SourceType::Internal);
    }
}
