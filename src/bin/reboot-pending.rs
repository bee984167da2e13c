use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reboot_pending::config::{load_config, load_default_config, LoadedConfig};
use reboot_pending::{LiveHost, RebootPendingPredicate, RunState};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Check,
    Explain,
    Platform,
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    config: Option<PathBuf>,
    run_state: Option<PathBuf>,
}

fn usage() -> &'static str {
    "Usage:\n  reboot-pending check [--config <path>] [--run-state <json>]\n  reboot-pending explain [--config <path>] [--run-state <json>]\n  reboot-pending platform"
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args)?;
    debug!(?cli, "parsed arguments");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    let run_state = match &cli.run_state {
        Some(path) => load_run_state(path)?,
        None => RunState::new(),
    };

    run(&cli, config, &run_state)
}

fn run(cli: &CliArgs, config: LoadedConfig, run_state: &RunState) -> Result<()> {
    let host = LiveHost::new();
    let predicate = RebootPendingPredicate::with_sentinels(&host, config.sentinels);

    match cli.command {
        Command::Check => {
            let pending = predicate
                .is_reboot_pending(run_state)
                .context("checking for a pending reboot")?;
            println!("{}", pending);
        }
        Command::Explain => {
            let signal = predicate
                .pending_signal(run_state)
                .context("checking for a pending reboot")?;
            match signal {
                Some(signal) => println!("reboot pending: {}", signal),
                None => println!("no reboot pending"),
            }
        }
        Command::Platform => println!("{}", predicate.platform()),
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let Some((command, rest)) = args.split_first() else {
        bail!(usage());
    };

    let command = match command.as_str() {
        "check" => Command::Check,
        "explain" => Command::Explain,
        "platform" => Command::Platform,
        other => bail!("unknown command '{}'\n{}", other, usage()),
    };

    let mut config = None;
    let mut run_state = None;
    let mut rest = rest.iter();
    while let Some(flag) = rest.next() {
        let slot = match flag.as_str() {
            "--config" => &mut config,
            "--run-state" if command != Command::Platform => &mut run_state,
            other => bail!("unexpected argument '{}'\n{}", other, usage()),
        };
        let Some(value) = rest.next() else {
            bail!("{} requires a path", flag);
        };
        *slot = Some(PathBuf::from(value));
    }

    Ok(CliArgs {
        command,
        config,
        run_state,
    })
}

fn load_run_state(path: &Path) -> Result<RunState> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading run state '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing run state '{}'", path.display()))
}
