//! taskdash - task dashboard on the command line

mod commands;
mod config;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use config::DashboardConfig;
use std::path::PathBuf;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "taskdash")]
#[command(about = "Manage tasks, imports and ML predictions from the terminal")]
#[command(version)]
struct Cli {
    /// Set logging level (overrides the config file)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    /// Directory for the cookie jar and logs
    #[arg(short = 'd', long, global = true)]
    state_dir: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Flags take precedence over every other configuration source
    fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(state_dir) = &self.state_dir {
            config.state_dir = Some(state_dir.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.api.base_url.clone_from(base_url);
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_secs = timeout;
        }
    }

    fn level(&self, config: &DashboardConfig) -> LogLevel {
        self.log_level
            .or_else(|| {
                config
                    .log_level
                    .as_deref()
                    .and_then(|level| <LogLevel as ValueEnum>::from_str(level, true).ok())
            })
            .unwrap_or(LogLevel::Info)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    logging::init_logging(cli.level(&config).into(), &config.state_dir(), cli.no_file_log)?;

    info!(base_url = %config.api.base_url, "Starting taskdash");

    match cli.command.execute(&config).await {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "taskdash",
            "--base-url",
            "https://flag.example.com",
            "-t",
            "5",
            "whoami",
        ]);
        let mut config = DashboardConfig::default();
        config.api.base_url = "https://file.example.com".to_string();
        cli.apply_overrides(&mut config);

        assert_eq!(config.api.base_url, "https://flag.example.com");
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn log_level_falls_back_to_config_then_info() {
        let cli = parse(&["taskdash", "whoami"]);
        let mut config = DashboardConfig::default();
        assert!(matches!(cli.level(&config), LogLevel::Info));

        config.log_level = Some("DEBUG".to_string());
        assert!(matches!(cli.level(&config), LogLevel::Debug));

        let cli = parse(&["taskdash", "--log-level", "warn", "whoami"]);
        assert!(matches!(cli.level(&config), LogLevel::Warn));
    }

    #[test]
    fn ml_commands_take_a_stored_task() {
        let cli = parse(&["taskdash", "ml", "priority", "--task", "3"]);
        assert!(matches!(
            cli.command,
            Commands::Ml {
                command: commands::MlCommands::Priority { task: Some(3), text: None, .. }
            }
        ));

        assert!(Cli::try_parse_from(["taskdash", "ml", "priority"]).is_err());
        assert!(Cli::try_parse_from(["taskdash", "ml", "priority", "fix it", "--task", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["taskdash", "ml", "completion-time", "--task", "3", "--priority", "high"])
                .is_err()
        );
        assert!(
            Cli::try_parse_from(["taskdash", "ml", "completion-time", "--task", "3", "--complex"]).is_ok()
        );
    }

    #[test]
    fn account_update_parses_profile_fields() {
        let cli = parse(&["taskdash", "account", "update", "--full-name", "Ada Lovelace"]);
        assert!(matches!(
            cli.command,
            Commands::Account {
                command: commands::AccountCommands::Update { username: None, email: None, full_name: Some(_) }
            }
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["taskdash", "tasks", "list", "--no-file-log"]);
        assert!(cli.no_file_log);
    }
}
