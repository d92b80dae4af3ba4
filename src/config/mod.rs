//! Configuration module.
//!
//! Loads server, database, metadata and report settings from TOML.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, MetadataSettings, ReportSettings, ServerSettings, Settings,
    SettingsError, CONFIG_ENV_VAR,
};
