use anyhow::Result;
use chrono::Utc;
use clap::Parser;

use fulfillment_sla::cli::{Cli, Command};
use fulfillment_sla::commands;
use fulfillment_sla::config::AppConfig;
use fulfillment_sla::logging;
use fulfillment_sla::monitor::TimelinessMonitor;
use fulfillment_sla::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    logging::init(level, config.log_json);

    match cli.command {
        Command::Validate { from, to, force } => {
            let validation = commands::validate(&from, &to, force)?;
            ui::print_validation(&validation);
            if cli.verbose {
                println!("{}", serde_json::to_string_pretty(&validation)?);
            }
        }
        Command::Next { status } => {
            for (next, label) in commands::next_statuses(&status)? {
                println!("  {next:<22} {label}");
            }
        }
        Command::Sla { status } => {
            println!("  {:<22} {:>8} {:>8} {:>8}", "status", "standard", "warning", "max");
            for (name, sla) in commands::sla_table(status.as_deref()) {
                println!(
                    "  {name:<22} {:>7}h {:>7}h {:>7}h",
                    sla.standard, sla.warning, sla.max
                );
            }
        }
        Command::Transition {
            file,
            id,
            to,
            force,
            reason,
            operator,
            fields,
            write,
        } => {
            let path = commands::resolve_records_path(file, &config)?;
            let mut records = commands::load_records(&path)?;
            let request = commands::build_request(&to, force, reason, operator, &fields)?;
            let applied =
                commands::transition_in(&mut records, &id, &request, Utc::now().timestamp())?;
            println!("{}", serde_json::to_string_pretty(&applied)?);
            if write {
                commands::save_records(&path, &records)?;
            }
        }
        Command::Check {
            file,
            now,
            warning_threshold,
            critical_threshold,
            json,
            write,
        } => {
            let path = commands::resolve_records_path(file, &config)?;
            let mut records = commands::load_records(&path)?;
            let monitor = TimelinessMonitor::new(commands::monitor_config(
                &config,
                warning_threshold,
                critical_threshold,
            ));
            let now = now.unwrap_or_else(|| Utc::now().timestamp());
            let outcome = commands::check(&monitor, &mut records, now);
            commands::print_check(&outcome, json)?;
            if write && outcome.flags_changed > 0 {
                commands::save_records(&path, &records)?;
            }
        }
        Command::Watch { file, interval } => {
            let path = commands::resolve_records_path(file, &config)?;
            let minutes = interval.unwrap_or(config.monitor.check_interval_minutes);
            let monitor = TimelinessMonitor::new(config.monitor.clone());
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
            };
            commands::watch(&path, monitor, minutes, shutdown).await?;
        }
    }

    Ok(())
}
