use std::path::{Path, PathBuf};
use figment::Figment;
use crate::config::app_config::data::AppConfigData;
use crate::config::FigmentExt;
use crate::lib_constants::CONFIG_DIRECTORY_FALLBACK;

pub mod data;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    pub state_directory: PathBuf,
    pub report_interval_secs: u64,
}

impl From<AppConfigData> for AppConfig {
    fn from(value: AppConfigData) -> Self {
        AppConfig {
            base_url: value.base_url,
            state_directory: value.state_directory,
            report_interval_secs: value.report_interval_secs,
        }
    }
}

impl AppConfig {
    /// Layered load: built-in defaults, then the TOML file, then
    /// `FLEETLINK_*` environment variables.
    pub fn load(config_file: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        let data: AppConfigData = Figment::new()
            .setup_app_config(config_file)
            .extract()?;
        Ok(data.into())
    }
}

pub fn default_config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIRECTORY_FALLBACK))
        .join("fleetlink")
        .join("fleetlink.toml")
}
