//! Watch command implementation
//!
//! Validates configuration, checks the telemetry tool, then runs the
//! monitoring loop.

use crate::alerts::{Dispatcher, WebhookNotifier};
use crate::cli::Cli;
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::services::Monitor;
use crate::telemetry::NvidiaSmi;

use chrono::Utc;

/// Execute the watch loop
///
/// Returns only on a startup failure or, with `--once`, after one cycle.
pub fn run_watch(cli: &Cli) -> Result<()> {
    let settings = cli.load_config()?.validate()?;
    log_settings(&settings);

    let source = NvidiaSmi::new(settings.smi_path.clone()).with_timeout(settings.command_timeout);

    let notifier = WebhookNotifier::new(
        settings.webhook_url.clone(),
        settings.request_timeout,
        settings.utc_offset,
    )?;
    let dispatcher = Dispatcher::new(Box::new(notifier)).with_max_attempts(settings.max_attempts);

    let mut monitor = Monitor::new(source, dispatcher, settings.policy(), settings.interval);
    monitor.probe().map_err(AppError::TelemetryUnavailable)?;

    if settings.notify_on_start {
        let result = monitor.announce(Utc::now());
        if !result.delivered {
            log::warn!("Startup notification was not delivered");
        }
    }

    if cli.once {
        let report = monitor.tick(Utc::now());
        log::info!("Single check complete, state {}", report.state);
        return Ok(());
    }

    monitor.run();
    Ok(())
}

fn log_settings(settings: &Settings) {
    log::info!("Server: {}", settings.server_name);
    log::debug!("  Interval: {:?}", settings.interval);
    log::debug!(
        "  Utilization threshold: {}%",
        settings.utilization_threshold
    );
    log::debug!("  Time threshold: {:?}", settings.time_threshold);
    log::debug!("  nvidia-smi: {}", settings.smi_path);
    log::debug!("  Max attempts: {}", settings.max_attempts);
}
