//! Steward command line: replays governance scripts and inspects saved state.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use steward_ledger::BalanceLedger;
use steward_node::{
    init_logging, parse_script, Governor, GovernorEvent, LogFormat, NodeConfig, StepOutput,
};
use steward_types::Role;

#[derive(Parser)]
#[command(name = "steward", about = "Stake-weighted role governance")]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(long, env = "STEWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Overrides the config file value.
    #[arg(long, env = "STEWARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Overrides the config file value.
    #[arg(long, env = "STEWARD_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a JSON script of steps against the configured genesis.
    Replay {
        /// Script file: a JSON array of steps.
        script: PathBuf,

        /// Write the final state to this file.
        #[arg(long)]
        save: Option<PathBuf>,

        /// Stop at the first failing step instead of reporting and continuing.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Print the cycles and role holders recorded in a saved state file.
    Inspect {
        /// State file written by `replay --save`.
        snapshot: PathBuf,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_string_lossy();
            NodeConfig::from_toml_file(&path)
                .with_context(|| format!("loading config from {path}"))?
        }
        None => NodeConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

fn replay(
    config: &NodeConfig,
    script: &Path,
    save: Option<&Path>,
    fail_fast: bool,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(script)
        .with_context(|| format!("reading script {}", script.display()))?;
    let steps = parse_script(&json)?;
    let mut governor = Governor::from_config(config)?;
    governor.subscribe(Box::new(|event| {
        if let GovernorEvent::RoleHandedOver { role, from, to } = event {
            println!("  handover {role}: {from} -> {to}");
        }
    }));

    let mut failures = 0usize;
    for (i, step) in steps.iter().enumerate() {
        match governor.apply(step) {
            Ok(StepOutput::Done) => println!("[{i}] {} ok", step.name()),
            Ok(StepOutput::Height(height)) => println!("[{i}] {} -> {height}", step.name()),
            Ok(StepOutput::Closed(outcome)) => println!(
                "[{i}] {} cycle {} finalist={} support={} threshold={} quorum={}",
                step.name(),
                outcome.cycle,
                outcome
                    .finalist
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "none".into()),
                outcome.finalist_support,
                outcome.threshold,
                outcome.quorum_reached,
            ),
            Err(e) => {
                println!("[{i}] {} failed: {e}", step.name());
                failures += 1;
                if fail_fast {
                    anyhow::bail!("step {i} ({}) failed: {e}", step.name());
                }
            }
        }
    }
    tracing::info!(steps = steps.len(), failures, "replay finished");

    if let Some(path) = save {
        std::fs::write(path, governor.save_state()?)
            .with_context(|| format!("writing state to {}", path.display()))?;
        tracing::info!(path = %path.display(), "state saved");
    }
    Ok(())
}

fn inspect(snapshot: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(snapshot)
        .with_context(|| format!("reading state {}", snapshot.display()))?;
    let governor = Governor::load_state(&bytes)?;
    let ledger = governor.ledger();
    println!(
        "height {}  supply {}  accounts {}",
        ledger.height(),
        ledger.circulating_supply(),
        ledger.accounts().count()
    );

    for role in Role::ALL {
        let engine = governor.engine(role);
        println!("{role}");
        println!("  holder      {}", governor.relay().holder(role));
        println!(
            "  engine      {}{}",
            engine.id(),
            if engine.is_retired(governor.relay()) {
                " (retired)"
            } else {
                ""
            }
        );
        println!(
            "  cycle       {} from {} ({})",
            engine.cycle_index(),
            engine.cycle_started_at(),
            governor.phase(role)
        );
        println!("  candidates  {}", engine.candidates().len());
        match engine.finalist() {
            Some(finalist) => println!(
                "  finalist    {finalist} weight {} support {} / {}",
                engine.finalist_weight(),
                engine.finalist_support(),
                engine.quorum_threshold(ledger)
            ),
            None => println!("  finalist    none"),
        }
        for outcome in engine.outcomes() {
            println!(
                "  closed      cycle {} at {} quorum={} elected={}",
                outcome.cycle,
                outcome.closed_at,
                outcome.quorum_reached,
                outcome
                    .elected()
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".into())
            );
        }
    }

    for handover in governor.relay().handovers() {
        println!(
            "handover {}: {} -> {}",
            handover.role, handover.from, handover.to
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level);

    match &cli.command {
        Command::Replay {
            script,
            save,
            fail_fast,
        } => replay(&config, script, save.as_deref(), *fail_fast),
        Command::Inspect { snapshot } => inspect(snapshot),
        Command::Config => {
            print!("{}", NodeConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}
