//! gpuwatch - GPU utilization watchdog
//!
//! Periodically checks GPU utilization and posts alerts to a webhook when
//! the GPUs sit idle for too long.

use clap::Parser;
use gpuwatch::cli::{generate_completions, Cli};
use gpuwatch::commands::run_watch;
use gpuwatch::error::{AppError, EXIT_INVALID_CONFIG};

fn main() {
    // Parse CLI arguments; usage errors count as invalid configuration
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(EXIT_INVALID_CONFIG);
        }
        Err(e) => e.exit(),
    };

    // Initialize logging; RUST_LOG still takes precedence
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if let Some(shell) = cli.completions {
        generate_completions(shell);
        return;
    }

    if let Err(e) = run_watch(&cli) {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(e.exit_code());
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::TelemetryUnavailable(_) => {
            eprintln!();
            eprintln!("Hint: Make sure the NVIDIA driver is installed and nvidia-smi is on PATH,");
            eprintln!("      or point --smi-path (NVIDIA_SMI) at the executable.");
        }
        AppError::Config(gpuwatch::error::ConfigError::MissingField(field)) => {
            eprintln!();
            eprintln!(
                "Hint: Pass --{} or set {}.",
                field.replace('_', "-"),
                field.to_uppercase()
            );
        }
        _ => {}
    }
}
