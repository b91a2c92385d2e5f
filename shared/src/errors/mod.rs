mod config_errors;
mod device_errors;

pub use config_errors::ConfigError;
pub use device_errors::VsockError;
