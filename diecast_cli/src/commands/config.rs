use crate::cli::{Cli, ConfigAction};
use crate::commands::{load_config, Result};
use crate::output::{format_output, OutputData};
use diecast_core::config::ENV_CONFIG_PATH;
use diecast_core::DiecastConfig;
use owo_colors::OwoColorize;

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    // client_secret is never serialized
    let rendered = toml::to_string_pretty(&config)?;
    format_output(&OutputData::ConfigInfo(rendered), &cli.output)?;

    if cli.output == crate::cli::OutputFormat::Pretty {
        println!();
        let ebay = if config.ebay.has_credentials() {
            "credentials present".green().to_string()
        } else {
            "no credentials".yellow().to_string()
        };
        println!("{} eBay: {}", "Status:".dimmed(), ebay);
    }
    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(Into::into))
        .or_else(DiecastConfig::default_path);

    match path {
        Some(path) => {
            let exists = path.exists();
            match cli.output {
                crate::cli::OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({"path": path.display().to_string(), "exists": exists})
                ),
                crate::cli::OutputFormat::Text => println!("{}", path.display()),
                crate::cli::OutputFormat::Pretty => {
                    let marker = if exists {
                        "(exists)".green().to_string()
                    } else {
                        "(not created, defaults apply)".dimmed().to_string()
                    };
                    println!("{} {}", path.display().to_string().cyan(), marker);
                }
            }
        }
        None => println!("{}", "No config directory on this platform".yellow()),
    }
    Ok(())
}
