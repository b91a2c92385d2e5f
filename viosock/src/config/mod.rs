mod config;

pub use config::{Config, LoggingConfig, ProbeConfig, find_config_file};
