use serde::Deserialize;
use shared::errors::ConfigError;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "VIOSOCK_PROBE_CONFIG";
const CONFIG_FILE_NAME: &str = "viosock-probe.toml";

/// Probe configuration, loaded from TOML. Every section is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Logging settings `[logging]`
    pub logging: LoggingConfig,
    /// Probe behaviour `[probe]`
    pub probe: ProbeConfig,
}

/// Logging section `[logging]`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// flexi_logger spec, e.g. `viosock=debug`
    pub spec: String,
    /// Directory for the log file
    pub directory: PathBuf,
    /// Also write info and above to stderr
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            spec: "viosock=info".into(),
            directory: PathBuf::from("logs"),
            stderr: true,
        }
    }
}

/// Probe section `[probe]`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Close the device handle once the configuration has been read
    pub close_after_query: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            close_after_query: true,
        }
    }
}

impl Config {
    /// Load and validate a `Config` from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        Self::parse(&s)
    }

    /// Parse and validate TOML text.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(toml).map_err(ConfigError::Parse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.spec.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.spec must not be empty".into(),
            ));
        }
        if self.logging.directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "logging.directory must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Find the config path: the override environment variable first, then a file next to the
/// running executable. Always returns a path; the file may not exist.
pub fn find_config_file() -> PathBuf {
    if let Some(cfg) = env::var_os(CONFIG_ENV) {
        return PathBuf::from(cfg);
    }

    let mut exe_path = env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
    exe_path.pop();
    exe_path.push(CONFIG_FILE_NAME);
    exe_path
}
