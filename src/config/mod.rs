//! Extension configuration.

mod settings;

pub use settings::{Settings, SettingsPatch, DEFAULT_API_URL};
