//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use invex_core::models::config::CONFIG_KEYS;
use invex_core::InvexConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the configuration and report values the pipeline cannot use
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Print one value, e.g. `output.delimiter`
    Get {
        /// Configuration key
        key: String,
    },

    /// Change one value; the file is only written if the result is valid
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// List the known keys with their current values
    Keys,

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Get { key } => get_value(&path, &key),
        ConfigCommand::Set { key, value } => set_value(&path, &key, &value),
        ConfigCommand::Keys => list_keys(&path),
        ConfigCommand::Path => show_path(&path),
    }
}

/// The file at `path`, or defaults when it does not exist yet.
fn read_or_default(path: &Path) -> anyhow::Result<InvexConfig> {
    if path.exists() {
        Ok(InvexConfig::from_file(path)?)
    } else {
        Ok(InvexConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    let config = read_or_default(path)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    if let Err(e) = config.validate() {
        eprintln!("{} {}", style("⚠").yellow(), e);
    }

    Ok(())
}

fn init_config(args: InitArgs, default_path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(default_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    InvexConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_value(path: &Path, key: &str) -> anyhow::Result<()> {
    let config = read_or_default(path)?;
    let value = config.get(key).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown configuration key: {} (run 'invex config keys' for the list)",
            key
        )
    })?;

    println!("{}", value);
    Ok(())
}

fn set_value(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = read_or_default(path)?;
    config.set(key, value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        config.get(key).unwrap_or_default()
    );

    Ok(())
}

fn list_keys(path: &Path) -> anyhow::Result<()> {
    let config = read_or_default(path)?;
    let width = CONFIG_KEYS.iter().map(|key| key.len()).max().unwrap_or(0);

    for key in CONFIG_KEYS {
        println!(
            "{:width$}  {}",
            key,
            config.get(key).unwrap_or_default(),
            width = width
        );
    }

    Ok(())
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'invex config init' to create a configuration file.");
    }

    Ok(())
}
