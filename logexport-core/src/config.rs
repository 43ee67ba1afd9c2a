use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dirs::{config_dir, home_dir};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::colors::{DEFAULT_NICK_COLORS, NickHashColors};
use crate::error::{LogexportError, Result};
use crate::model::Theme;

const KNOWN_KEYS: &[&str] = &["export_path", "dark", "nick_colors"];
const CONFIG_ENV: &str = "LOGEXPORT_CONFIG";
const EXPORT_PATH_ENV: &str = "LOGEXPORT_EXPORT_PATH";
const DARK_ENV: &str = "LOGEXPORT_DARK";

/// Settings shared by every export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported documents are written to.
    pub export_path: PathBuf,
    /// Dark or light document theme; unset until the user picks one.
    pub dark: Option<bool>,
    /// Palette author colors are hashed into.
    pub nick_colors: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from("."),
            dark: None,
            nick_colors: DEFAULT_NICK_COLORS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ExportConfig {
    /// Loads the config file, then applies environment overrides.
    pub fn from_env_or_default() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load(&path)?;
        config.apply_overrides(|key| env::var_os(key))?;
        Ok(config)
    }

    /// Precedence:
    /// 1) LOGEXPORT_CONFIG
    /// 2) <config dir>/logexport/config.toml
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        config_dir()
            .map(|dir| dir.join("logexport").join("config.toml"))
            .ok_or(LogexportError::ConfigDirectoryNotFound)
    }

    /// Reads a TOML config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(LogexportError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let invalid = |reason: String| LogexportError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        };

        let table = raw
            .parse::<toml::Table>()
            .map_err(|err| invalid(err.message().to_string()))?;
        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!(path = %path.display(), key = %key, "ignoring unknown config key");
            }
        }

        let config = toml::Value::Table(table)
            .try_into::<Self>()
            .map_err(|err| invalid(err.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        if let Some(path) = lookup(EXPORT_PATH_ENV).filter(|path| !path.is_empty()) {
            self.export_path = PathBuf::from(path);
        }

        if let Some(value) = lookup(DARK_ENV) {
            let value = value.to_string_lossy().to_ascii_lowercase();
            self.dark = match value.as_str() {
                "1" | "true" | "yes" | "on" | "dark" => Some(true),
                "0" | "false" | "no" | "off" | "light" => Some(false),
                _ => {
                    return Err(LogexportError::InvalidConfig {
                        path: PathBuf::from(DARK_ENV),
                        reason: format!("expected a boolean, got '{value}'"),
                    });
                }
            };
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.color_lookup().map(|_| ())
    }

    /// Theme selected by the `dark` flag.
    pub fn theme(&self) -> Result<Theme> {
        self.dark
            .map(Theme::from_dark_flag)
            .ok_or(LogexportError::ThemeNotConfigured)
    }

    pub fn color_lookup(&self) -> Result<NickHashColors> {
        NickHashColors::new(&self.nick_colors)
    }

    /// `<export_path>/<name>.html`, with a leading `~` expanded.
    pub fn destination(&self, name: &str) -> PathBuf {
        let base = match self.export_path.strip_prefix("~") {
            Ok(rest) => home_dir().map_or_else(|| self.export_path.clone(), |home| home.join(rest)),
            Err(_) => self.export_path.clone(),
        };

        if Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        {
            base.join(name)
        } else {
            base.join(format!("{name}.html"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::fs;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use crate::config::ExportConfig;
    use crate::model::Theme;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let config = ExportConfig::load(&temp.path().join("config.toml")).expect("load");
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn reads_toml_settings() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "export_path = \"/srv/logs\"\ndark = true\nnick_colors = [\"red\", \"cyan\"]\n",
        )
        .expect("write");

        let config = ExportConfig::load(&path).expect("load");
        assert_eq!(config.export_path, PathBuf::from("/srv/logs"));
        assert_eq!(config.theme().expect("theme"), Theme::Dark);
        assert_eq!(config.nick_colors, vec!["red", "cyan"]);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "dark = false\nfont = \"serif\"\n").expect("write");

        let config = ExportConfig::load(&path).expect("load");
        assert_eq!(config.theme().expect("theme"), Theme::Light);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "dark = maybe\n").expect("write");

        let err = ExportConfig::load(&path).expect_err("must fail");
        assert!(format!("{err}").contains("invalid config"));
    }

    #[test]
    fn unknown_palette_color_is_reported() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "nick_colors = [\"teal\"]\n").expect("write");

        let err = ExportConfig::load(&path).expect_err("must fail");
        assert!(format!("{err}").contains("unknown color: teal"));
    }

    #[test]
    fn theme_must_be_configured() {
        let err = ExportConfig::default().theme().expect_err("must fail");
        assert!(format!("{err}").contains("theme is not configured"));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ExportConfig {
            dark: Some(false),
            ..ExportConfig::default()
        };
        config
            .apply_overrides(|key| match key {
                "LOGEXPORT_EXPORT_PATH" => Some(OsString::from("/tmp/exports")),
                "LOGEXPORT_DARK" => Some(OsString::from("on")),
                _ => None,
            })
            .expect("overrides");

        assert_eq!(config.export_path, PathBuf::from("/tmp/exports"));
        assert_eq!(config.dark, Some(true));
    }

    #[test]
    fn env_rejects_non_boolean_theme() {
        let mut config = ExportConfig::default();
        let err = config
            .apply_overrides(|key| (key == "LOGEXPORT_DARK").then(|| OsString::from("blue")))
            .expect_err("must fail");
        assert!(format!("{err}").contains("expected a boolean"));
    }

    #[test]
    fn destination_appends_extension_once() {
        let config = ExportConfig {
            export_path: PathBuf::from("/srv/logs"),
            ..ExportConfig::default()
        };
        assert_eq!(config.destination("meeting"), PathBuf::from("/srv/logs/meeting.html"));
        assert_eq!(config.destination("meeting.html"), PathBuf::from("/srv/logs/meeting.html"));
    }
}
