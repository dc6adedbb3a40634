use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use glint_config::Settings;
use glint_definition::{Serializable, StateMachine};
use glint_deploy::{FsDeployer, deploy};

/// Glint - build, check and register workflow definitions
#[derive(Parser)]
#[command(name = "glint")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.glint)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Check a definition document and print its canonical form
  Validate {
    /// Path to the definition file (JSON)
    definition_file: PathBuf,
  },

  /// Register every state machine listed in a settings file
  Deploy {
    /// Path to the settings file (JSON)
    #[arg(long)]
    file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".glint"),
  };

  let rt = tokio::runtime::Runtime::new()?;

  match cli.command {
    Some(Commands::Validate { definition_file }) => {
      rt.block_on(validate(definition_file))?;
    }
    Some(Commands::Deploy { file }) => {
      rt.block_on(deploy_all(file, data_dir))?;
    }
    None => {
      println!("glint - use --help to see available commands");
    }
  }

  Ok(())
}

async fn validate(definition_file: PathBuf) -> Result<()> {
  let machine = load_definition(&definition_file).await?;

  eprintln!(
    "Definition is valid: {} states, starting at {}",
    machine.states().len(),
    machine.start_at()
  );
  println!("{}", machine.to_json_pretty()?);

  Ok(())
}

async fn deploy_all(settings_file: PathBuf, data_dir: PathBuf) -> Result<()> {
  let content = tokio::fs::read_to_string(&settings_file)
    .await
    .with_context(|| format!("failed to read settings file: {}", settings_file.display()))?;

  let mut settings = Settings::from_json(&content)
    .with_context(|| format!("failed to parse settings file: {}", settings_file.display()))?;

  if let Some(base) = settings_file.parent() {
    settings.resolve_paths(base);
  }

  let deployer = FsDeployer::new(
    data_dir.join("state-machines"),
    &settings.region,
    &settings.aws_client_id,
  );

  let skipped = settings.state_machines.len() - settings.active().count();
  if skipped > 0 {
    warn!(skipped, "skipping state machines marked skip");
  }

  for entry in settings.active() {
    info!(name = %entry.name, definition = %entry.definition.display(), "deploying state machine");

    let machine = load_definition(&entry.definition).await?;
    let arn = deploy(&deployer, &entry.name, &machine, &entry.role_arn)
      .await
      .with_context(|| format!("failed to deploy state machine: {}", entry.name))?;

    println!("{}\t{}", entry.name, arn);
  }

  Ok(())
}

async fn load_definition(path: &Path) -> Result<StateMachine> {
  let content = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read definition file: {}", path.display()))?;

  let machine = StateMachine::from_json(&content)
    .with_context(|| format!("failed to parse definition file: {}", path.display()))?;

  machine
    .validate()
    .with_context(|| format!("invalid definition: {}", path.display()))?;

  Ok(machine)
}
