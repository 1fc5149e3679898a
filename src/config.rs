use std::path::PathBuf;

/// File holding the long-format historical + forecast series
pub const TIMESERIES_FILE: &str = "full_timeseries_with_forecast.csv";

/// File holding the per-ZIP KPI summary
pub const SUMMARY_FILE: &str = "forecast_summary.csv";

const DEFAULT_DATA_DIR: &str = "data/processed";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Runtime configuration, read from the environment (and `.env` if present)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Directory containing the processed CSV files
    pub data_dir: PathBuf,
    /// Address the web server binds to
    pub bind_address: String,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir = std::env::var("DASHBOARD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let bind_address = std::env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());

        Self { data_dir, bind_address }
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }

    pub fn timeseries_path(&self) -> PathBuf {
        self.data_dir.join(TIMESERIES_FILE)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join(SUMMARY_FILE)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_joined_under_data_dir() {
        let config = DashboardConfig::with_data_dir("/srv/dashboard/data/processed");

        assert_eq!(
            config.timeseries_path(),
            PathBuf::from("/srv/dashboard/data/processed/full_timeseries_with_forecast.csv")
        );
        assert_eq!(
            config.summary_path(),
            PathBuf::from("/srv/dashboard/data/processed/forecast_summary.csv")
        );
    }

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data/processed"));
        assert_eq!(config.bind_address, "0.0.0.0:3000");
    }
}
