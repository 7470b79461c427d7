use crate::cli::Cli;
use crate::commands::{create_registry, load_config, CommandError, Result};
use crate::output::{format_output, OutputData};
use diecast_core::{Aggregator, AggregatorSettings, SearchError, Source};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Parse `--sources` ids into sources.
fn parse_sources(ids: &[String]) -> Result<Vec<Source>> {
    ids.iter()
        .map(|id| id.trim().to_lowercase())
        .filter(|id| !id.is_empty())
        .map(|id| Source::from_id(&id).ok_or(CommandError::UnknownSource(id)))
        .collect()
}

/// Run one aggregation and print the merged listings.
pub async fn run(cli: &Cli, query: &str, sources: &[String], limit: Option<usize>) -> Result<()> {
    let config = load_config(cli)?;
    let mut registry = create_registry(&config)?;

    let selected = parse_sources(sources)?;
    if !selected.is_empty() {
        if let Some(missing) = selected.iter().find(|s| registry.get(**s).is_none()) {
            return Err(CommandError::UnknownSource(missing.id().to_string()));
        }
        registry.retain_sources(&selected);
        tracing::debug!(sources = ?selected, "restricted search to selected sources");
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    spinner.set_message(format!(
        "Searching {} sources for '{}'...",
        registry.len(),
        query.trim()
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let aggregator = Aggregator::new(registry, AggregatorSettings::from(&config.aggregator));
    let result = aggregator.aggregate(query).await;
    spinner.finish_and_clear();

    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(SearchError::NoResults) => {
            match cli.output {
                crate::cli::OutputFormat::Json => {
                    println!("{}", serde_json::json!({"error": "No results found"}))
                }
                _ => println!("{} for '{}'", "No results found".yellow(), query.trim()),
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(limit) = limit {
        outcome.listings.truncate(limit);
    }

    format_output(&OutputData::Listings(outcome), &cli.output)
}
