//! Configuration view and validation commands: `issueboard config`.

use anyhow::Result;

use issueboard::config::{API_URL_ENV, Config, IssueboardToml};

use super::super::ConfigCommands;

fn print_sections(toml: &IssueboardToml) {
    println!("[api]");
    println!("  base_url = \"{}\"", toml.api.base_url);
    println!("  api_key_env = \"{}\"", toml.api.api_key_env);
    println!("  timeout_secs = {}", toml.api.timeout_secs);
    println!();
    println!("[local]");
    println!("  state_file = \"{}\"", toml.local.state_file.display());
    println!();
    println!("[logging]");
    println!("  format = \"{}\"", toml.logging.format.as_str());
    println!("  level = \"{}\"", toml.logging.level);
    println!();
}

pub fn cmd_config(config: &Config, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = config.config_file();

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Issueboard Configuration");
            println!("========================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No issueboard.toml found at {}", config_path.display());
                println!("Using default configuration:");
            }
            println!();
            print_sections(&config.toml);

            println!("Effective values (with env/CLI overrides):");
            println!("  base_url = \"{}\" ({} overrides)", config.base_url(), API_URL_ENV);
            println!(
                "  api_key = {}",
                if config.api_key().is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
            println!("  state_file = \"{}\"", config.state_file().display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No issueboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("issueboard.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config.config_dir.exists() {
                std::fs::create_dir_all(&config.config_dir)?;
            }

            IssueboardToml::default().save(&config_path)?;

            println!("Created issueboard.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, api_key_env, timeout_secs");
            println!("  - [local] state_file");
            println!("  - [logging] format, level");
            println!();
        }
    }

    Ok(())
}
