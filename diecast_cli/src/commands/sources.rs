use crate::cli::Cli;
use crate::commands::{create_registry, load_config, Result};
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;

pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let registry = create_registry(&config)?;
    let sources = registry.list_sources();

    if sources.is_empty() {
        println!("{}", "No sources enabled".yellow());
        return Ok(());
    }

    format_output(&OutputData::Sources(sources), &cli.output)?;

    if cli.output == crate::cli::OutputFormat::Pretty
        && config.ebay.enabled
        && !config.ebay.has_credentials()
    {
        println!();
        println!(
            "{} eBay needs {} and {} to return listings",
            "Tip:".green().bold(),
            "EBAY_CLIENT_ID".cyan(),
            "EBAY_CLIENT_SECRET".cyan()
        );
    }
    Ok(())
}
