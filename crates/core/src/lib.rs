pub mod config;
pub mod install;
pub mod progress;
pub mod season;
pub mod signature;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use install::InstallRecord;
pub use progress::Progress;
pub use season::{SeasonForm, SeasonWindow};
pub use signature::{SignatureError, SignatureVerifier};
