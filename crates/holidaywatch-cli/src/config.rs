//! Command-line and environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use holidaywatch_core::PolicyConfig;
use holidaywatch_fetch::FetchConfig;
use holidaywatch_host::PollerConfig;

const STATE_FILE_NAME: &str = "notified_holidays.json";

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Country page of the holiday calendar, without a year suffix.
    #[arg(
        long,
        env = "HOLIDAYWATCH_BASE_URL",
        default_value = "https://www.officeholidays.com/countries/malaysia"
    )]
    pub base_url: String,

    /// CSS selector of the holiday table on that page.
    #[arg(long, env = "HOLIDAYWATCH_TABLE_SELECTOR", default_value = "table.country-table")]
    pub table_selector: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "HOLIDAYWATCH_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Where announced holidays are remembered across restarts.
    #[arg(long, env = "HOLIDAYWATCH_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Hours between scheduled checks.
    #[arg(long, env = "HOLIDAYWATCH_INTERVAL_HOURS", default_value_t = 24)]
    pub interval_hours: u64,

    /// Seconds to wait before the first check after startup.
    #[arg(long, env = "HOLIDAYWATCH_STARTUP_DELAY_SECS", default_value_t = 2)]
    pub startup_delay_secs: u64,

    /// Notify for holidays up to this many days ahead.
    #[arg(long, env = "HOLIDAYWATCH_DAYS_AHEAD", default_value_t = 7)]
    pub days_ahead: u64,

    /// Forget announced holidays older than this many days.
    #[arg(long, env = "HOLIDAYWATCH_RETENTION_DAYS", default_value_t = 60)]
    pub retention_days: u64,

    /// Also write logs to this file.
    #[arg(long, env = "HOLIDAYWATCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            base_url: self.base_url.clone(),
            table_selector: self.table_selector.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..FetchConfig::default()
        }
    }

    pub fn policy_config(&self) -> PolicyConfig {
        PolicyConfig {
            days_ahead: self.days_ahead,
            retention_days: self.retention_days,
        }
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.interval_hours.max(1) * 60 * 60),
            startup_delay: Duration::from_secs(self.startup_delay_secs),
        }
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| app_data_dir().join(STATE_FILE_NAME))
    }
}

/// Per-user data directory: `%LOCALAPPDATA%\HolidayWatch` on Windows,
/// `$XDG_STATE_HOME/holidaywatch` where set, otherwise the temp dir.
pub fn app_data_dir() -> PathBuf {
    let non_empty = |name: &str| env::var_os(name).filter(|v| !v.is_empty());
    if let Some(dir) = non_empty("LOCALAPPDATA") {
        return PathBuf::from(dir).join("HolidayWatch");
    }
    if let Some(dir) = non_empty("XDG_STATE_HOME") {
        return PathBuf::from(dir).join("holidaywatch");
    }
    env::temp_dir().join("holidaywatch")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    #[test]
    fn defaults_match_library_defaults() {
        let s = TestCli::parse_from(["holidaywatch"]).settings;
        assert_eq!(s.fetch_config(), FetchConfig::default());
        assert_eq!(s.policy_config(), PolicyConfig::default());
        assert_eq!(s.poller_config(), PollerConfig::default());
    }

    #[test]
    fn explicit_state_file_wins() {
        let args = ["holidaywatch", "--state-file", "/tmp/x/notified.json"];
        let s = TestCli::parse_from(args).settings;
        assert_eq!(s.state_file(), PathBuf::from("/tmp/x/notified.json"));
    }

    #[test]
    fn overrides_flow_into_configs() {
        let s = TestCli::parse_from([
            "holidaywatch",
            "--days-ahead",
            "3",
            "--retention-days",
            "30",
            "--interval-hours",
            "6",
            "--timeout-secs",
            "5",
        ])
        .settings;
        assert_eq!(s.policy_config().days_ahead, 3);
        assert_eq!(s.policy_config().retention_days, 30);
        assert_eq!(s.poller_config().interval, Duration::from_secs(6 * 3600));
        assert_eq!(s.fetch_config().timeout, Duration::from_secs(5));
    }
}
