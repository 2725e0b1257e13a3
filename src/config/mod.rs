//! Settings for a sync run: languages, directories, translator limits.
mod loader;
mod manager;
mod types;

pub use manager::ConfigManager;
pub use types::{
    ConcurrencyConfig,
    ConfigError,
    SyncSettings,
    TranslatorConfig,
    ValidationError,
};
