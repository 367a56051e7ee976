mod associations;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

/// A `[[files_associations]]` entry: files matching `pattern` open as
/// `language`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UserAssociation {
    pub pattern: String,
    pub language: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    /// Pin `.C`/`.H` files opened as C to C++ with a per-file association.
    pub auto_add_file_associations: bool,
    /// User-defined file associations.
    pub files_associations: Vec<UserAssociation>,
    pub log_dir: Option<Utf8PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            auto_add_file_associations: true,
            files_associations: Vec::new(),
            log_dir: None,
        }
    }
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "cxls", "cxls")
            .map(|proj_dirs| proj_dirs.config_dir().join("cxls.toml"))
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok());

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            tracing::debug!("Reading user settings from {path}");
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            File::from(project_root.join(".cxls.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("cxls.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Whether the user has associated `basename` with a language themselves.
    #[must_use]
    pub fn has_file_association(&self, basename: &str) -> bool {
        self.files_associations
            .iter()
            .any(|association| associations::key_matches(&association.pattern, basename))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn utf8(path: &std::path::Path) -> &Utf8Path {
        Utf8Path::from_path(path).unwrap()
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = Settings::load_from_paths(utf8(dir.path()), None).unwrap();
            assert_eq!(settings, Settings::default());
            assert!(settings.auto_add_file_associations);
            assert!(settings.files_associations.is_empty());
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_cxls_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("cxls.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(utf8(dir.path()), None).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_load_dot_cxls_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join(".cxls.toml"),
                "auto_add_file_associations = false",
            )
            .unwrap();
            let settings = Settings::load_from_paths(utf8(dir.path()), None).unwrap();
            assert!(!settings.auto_add_file_associations);
        }

        #[test]
        fn test_load_files_associations() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join("cxls.toml"),
                r#"
[[files_associations]]
pattern = "*.C"
language = "c"

[[files_associations]]
pattern = "legacy.H"
language = "cpp"
"#,
            )
            .unwrap();
            let settings = Settings::load_from_paths(utf8(dir.path()), None).unwrap();
            assert_eq!(settings.files_associations.len(), 2);
            assert_eq!(
                settings.files_associations[0],
                UserAssociation {
                    pattern: "*.C".to_string(),
                    language: "c".to_string(),
                }
            );
        }

        #[test]
        fn test_load_log_dir() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("cxls.toml"), "log_dir = \"/var/log/cxls\"").unwrap();
            let settings = Settings::load_from_paths(utf8(dir.path()), None).unwrap();
            assert_eq!(settings.log_dir, Some(Utf8PathBuf::from("/var/log/cxls")));
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_project_priority_cxls_overrides_dot_cxls() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".cxls.toml"), "debug = false").unwrap();
            fs::write(dir.path().join("cxls.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(utf8(dir.path()), None).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_user_priority_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = utf8(user_dir.path()).join("cxls.toml");
            fs::write(&user_conf_path, "debug = true").unwrap();
            fs::write(project_dir.path().join(".cxls.toml"), "debug = false").unwrap();

            let settings =
                Settings::load_from_paths(utf8(project_dir.path()), Some(&user_conf_path))
                    .unwrap();
            assert!(!settings.debug);
        }
    }

    mod user_config {
        use super::*;

        #[test]
        fn test_load_user_config_only() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = utf8(user_dir.path()).join("cxls.toml");
            fs::write(
                &user_conf_path,
                "[[files_associations]]\npattern = \"*.H\"\nlanguage = \"c\"\n",
            )
            .unwrap();

            let settings =
                Settings::load_from_paths(utf8(project_dir.path()), Some(&user_conf_path))
                    .unwrap();
            assert!(settings.has_file_association("x.H"));
        }

        #[test]
        fn test_no_user_config_file_present() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = utf8(user_dir.path()).join("cxls.toml");
            fs::write(project_dir.path().join("cxls.toml"), "debug = true").unwrap();

            let settings =
                Settings::load_from_paths(utf8(project_dir.path()), Some(&user_conf_path))
                    .unwrap();
            assert!(settings.debug);
        }
    }

    mod associations {
        use super::*;

        #[test]
        fn test_has_file_association() {
            let settings = Settings {
                files_associations: vec![
                    UserAssociation {
                        pattern: "*.C".to_string(),
                        language: "c".to_string(),
                    },
                    UserAssociation {
                        pattern: "**/legacy.H".to_string(),
                        language: "c".to_string(),
                    },
                ],
                ..Settings::default()
            };

            assert!(settings.has_file_association("x.C"));
            assert!(settings.has_file_association("legacy.H"));
            assert!(!settings.has_file_association("other.H"));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("cxls.toml"), "debug = not_a_boolean").unwrap();
            let result = Settings::load_from_paths(utf8(dir.path()), None);
            assert!(result.is_err());
            assert!(matches!(result.unwrap_err(), ConfigError::Config(_)));
        }
    }
}
