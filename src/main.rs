use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

use runsweep::cli::args::{Cli, Commands, ConfigAction, DirPolicyArg, OutputFormat};
use runsweep::cli::output;
use runsweep::common::config::Config;
use runsweep::sweeper::{self, DirPolicy, SweepOptions, SweepRecord};

/// Exit code when the sweep finished but some entries failed
const EXIT_PARTIAL: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let _guard = init_logging(&cli)?;

    match cli.command {
        Commands::Sweep {
            ref dir,
            retention,
            ref exempt,
            dir_policy,
            no_history,
        } => cmd_sweep(&cli, dir.clone(), retention, exempt.clone(), dir_policy, no_history),

        Commands::History { limit } => cmd_history(&cli, limit).map(|_| ExitCode::SUCCESS),

        Commands::Config { ref action } => cmd_config(action).map(|_| ExitCode::SUCCESS),

        Commands::Completions { ref shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let shell = match shell {
                runsweep::cli::args::CompletionShell::Bash => clap_complete::Shell::Bash,
                runsweep::cli::args::CompletionShell::Zsh => clap_complete::Shell::Zsh,
                runsweep::cli::args::CompletionShell::Fish => clap_complete::Shell::Fish,
            };
            clap_complete::generate(shell, &mut cmd, "runsweep", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Install the tracing subscriber. The returned guard flushes the log file on drop.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if cli.verbose {
        EnvFilter::new("runsweep=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("runsweep=warn"))
    };
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if cli.log_file {
        Config::init_dirs()?;
        let appender = tracing_appender::rolling::never(Config::logs_dir(), "runsweep.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        Ok(None)
    }
}

fn output_format(cli: &Cli, config: &Config) -> OutputFormat {
    if cli.quiet {
        return OutputFormat::Quiet;
    }
    cli.format
        .unwrap_or_else(|| OutputFormat::from(&config.output_format))
}

// ─── Sweep ────────────────────────────────────────────────────────────────────

fn cmd_sweep(
    cli: &Cli,
    dir: Option<PathBuf>,
    retention: Option<Duration>,
    exempt: Vec<String>,
    dir_policy: Option<DirPolicyArg>,
    no_history: bool,
) -> Result<ExitCode> {
    let config = Config::load()?;
    let format = output_format(cli, &config);

    let dir = dir.unwrap_or_else(|| config.directory.clone());
    let retention = retention.unwrap_or_else(|| config.retention());
    let exempt = if exempt.is_empty() {
        config.exempt.clone()
    } else {
        exempt
    };
    let policy = dir_policy.map(DirPolicy::from).unwrap_or(config.dir_policy);

    let options = SweepOptions::new(retention)
        .exempt(exempt.iter())
        .dir_policy(policy)
        .show_progress(matches!(format, OutputFormat::Human));

    let report = sweeper::sweep_with(&dir, &options)
        .with_context(|| format!("Sweep of '{}' aborted", dir.display()))?;

    if config.keep_history && !no_history {
        match SweepRecord::from_report(&report).save() {
            Ok(path) => tracing::debug!(path = %path.display(), "sweep record saved"),
            Err(e) => tracing::warn!("Could not save sweep record: {:#}", e),
        }
    }

    match format {
        OutputFormat::Human => output::print_sweep_report(&report, cli.verbose),
        OutputFormat::Json => output::print_sweep_json(&report),
        OutputFormat::Quiet => output::print_sweep_quiet(&report),
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL))
    }
}

// ─── History ──────────────────────────────────────────────────────────────────

fn cmd_history(cli: &Cli, limit: usize) -> Result<()> {
    let config = Config::load()?;
    let mut records = SweepRecord::list()?;
    records.truncate(limit);

    match output_format(cli, &config) {
        OutputFormat::Json => output::print_history_json(&records),
        OutputFormat::Quiet => println!("{}", records.len()),
        OutputFormat::Human => output::print_history(&records),
    }
    Ok(())
}

// ─── Config ───────────────────────────────────────────────────────────────────

fn cmd_config(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            Config::init_dirs()?;
            let config = Config::default();
            config.save()?;
            println!(
                "  {} runsweep initialized at {}",
                "✓".green(),
                Config::data_dir().display()
            );
            println!("  Created: config.toml, history/, logs/");
            Ok(())
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("  {} Configuration reset to defaults", "✓".green());
            Ok(())
        }
        ConfigAction::Set { key, values } => {
            let mut config = Config::load()?;
            config.set(key, values)?;
            config.save()?;
            println!("  {} Set {} = {}", "✓".green(), key, values.join(" "));
            Ok(())
        }
    }
}
