use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::lib_constants::{
    DEFAULT_BASE_URL,
    DEFAULT_REPORT_INTERVAL_SECS,
    STATE_DIRECTORY_FALLBACK,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppConfigData {
    pub base_url: String,
    pub state_directory: PathBuf,
    pub report_interval_secs: u64,
}

impl Default for AppConfigData {
    fn default() -> Self {
        AppConfigData {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_directory: default_state_directory(),
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
        }
    }
}

fn default_state_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(STATE_DIRECTORY_FALLBACK))
        .join("fleetlink")
}
