//! CLI argument definitions using clap derive
//!
//! Every monitoring option can also be set through the environment variable
//! named in its help text, or in the TOML config file.

use crate::config::{Config, ConfigBuilder};
use crate::error::ConfigError;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

/// GPU utilization watchdog
///
/// Samples nvidia-smi at a fixed interval and posts low-utilization alerts
/// to a Slack-style incoming webhook.
#[derive(Parser, Debug)]
#[command(name = "gpuwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name that identifies this server in notifications
    #[arg(long, alias = "server_name", env = "SERVER_NAME")]
    pub server_name: Option<String>,

    /// Incoming webhook URL
    #[arg(long, alias = "webhook_url", env = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Seconds between checks [default: 60]
    #[arg(long, env = "INTERVAL", allow_negative_numbers = true)]
    pub interval: Option<i64>,

    /// Utilization percentage at or below which a GPU counts as idle [default: 40]
    #[arg(
        long,
        alias = "utilization_threshold",
        env = "UTILIZATION_THRESHOLD",
        allow_negative_numbers = true
    )]
    pub utilization_threshold: Option<i64>,

    /// Seconds of sustained low utilization before the danger alert [default: 3600]
    #[arg(
        long,
        alias = "time_threshold",
        env = "TIME_THRESHOLD",
        allow_negative_numbers = true
    )]
    pub time_threshold: Option<i64>,

    /// Path to configuration file
    #[arg(short, long, env = "GPUWATCH_CONFIG")]
    pub config: Option<String>,

    /// Path to the nvidia-smi executable [default: nvidia-smi]
    #[arg(long, env = "NVIDIA_SMI")]
    pub smi_path: Option<String>,

    /// Seconds to wait for nvidia-smi [default: 10]
    #[arg(long, allow_negative_numbers = true)]
    pub command_timeout: Option<i64>,

    /// Seconds to wait for the webhook to respond [default: 10]
    #[arg(long, allow_negative_numbers = true)]
    pub request_timeout: Option<i64>,

    /// Delivery attempts per notification [default: 3]
    #[arg(long, allow_negative_numbers = true)]
    pub max_attempts: Option<i64>,

    /// UTC offset in hours for timestamps in messages [default: 0]
    #[arg(long, allow_negative_numbers = true)]
    pub utc_offset: Option<i32>,

    /// Don't send the "monitoring started" notification
    #[arg(long)]
    pub no_start_notice: bool,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Merge defaults, the config file and these arguments
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        Ok(ConfigBuilder::new()
            .with_file(self.config.as_deref())?
            .with_server_name(self.server_name.clone())
            .with_webhook_url(self.webhook_url.clone())
            .with_interval(self.interval)
            .with_utilization_threshold(self.utilization_threshold)
            .with_time_threshold(self.time_threshold)
            .with_smi_path(self.smi_path.clone())
            .with_command_timeout(self.command_timeout)
            .with_request_timeout(self.request_timeout)
            .with_max_attempts(self.max_attempts)
            .with_utc_offset(self.utc_offset)
            .with_no_start_notice(self.no_start_notice)
            .build())
    }
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_core_flags() {
        let args = Cli::try_parse_from([
            "gpuwatch",
            "--server-name",
            "gpu-01",
            "--webhook-url",
            "https://hooks.example.com/x",
            "--interval",
            "30",
            "--utilization-threshold",
            "20",
            "--time-threshold",
            "600",
        ])
        .unwrap();

        assert_eq!(args.server_name.as_deref(), Some("gpu-01"));
        assert_eq!(args.interval, Some(30));
        assert_eq!(args.utilization_threshold, Some(20));
        assert_eq!(args.time_threshold, Some(600));
        assert!(!args.once);
    }

    #[test]
    fn test_cli_parse_legacy_spelling() {
        let args = Cli::try_parse_from([
            "gpuwatch",
            "--server_name",
            "gpu-01",
            "--utilization_threshold",
            "15",
        ])
        .unwrap();
        assert_eq!(args.server_name.as_deref(), Some("gpu-01"));
        assert_eq!(args.utilization_threshold, Some(15));
    }

    #[test]
    fn test_cli_parse_negative_interval() {
        // Rejected later by validation, not by the parser
        let args = Cli::try_parse_from(["gpuwatch", "--interval", "-5"]).unwrap();
        assert_eq!(args.interval, Some(-5));
    }

    #[test]
    fn test_cli_parse_flags() {
        let args =
            Cli::try_parse_from(["gpuwatch", "-v", "--once", "--no-start-notice"]).unwrap();
        assert!(args.verbose);
        assert!(args.once);
        assert!(args.no_start_notice);
    }

    #[test]
    fn test_cli_rejects_non_numeric_interval() {
        let result = Cli::try_parse_from(["gpuwatch", "--interval", "often"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_applies_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpuwatch.toml");
        std::fs::write(&path, "interval = 120\nutilization_threshold = 10\n").unwrap();

        let args = Cli::try_parse_from([
            "gpuwatch",
            "--config",
            path.to_str().unwrap(),
            "--utilization-threshold",
            "30",
        ])
        .unwrap();

        let config = args.load_config().unwrap();
        assert_eq!(config.interval, 120);
        assert_eq!(config.utilization_threshold, 30);
    }
}
