use crate::cli::OutputFormat;
use crate::commands::Result;
use diecast_core::{AggregateOutcome, SourceInfo};
use serde::Serialize;

mod pretty;
pub use pretty::{format_outcome, format_sources};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    Listings(AggregateOutcome),
    Sources(Vec<SourceInfo>),
    ConfigInfo(String),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            format_text_output(data);
        }
        OutputFormat::Pretty => {
            format_pretty_output(data);
        }
    }
    Ok(())
}

fn format_text_output(data: &OutputData) {
    match data {
        OutputData::Listings(outcome) => {
            for listing in &outcome.listings {
                println!(
                    "{}\t{}\t{}\t{}",
                    listing.source, listing.price, listing.title, listing.link
                );
            }
        }
        OutputData::Sources(sources) => {
            for source in sources {
                println!("{}: {}", source.id, source.description);
            }
        }
        OutputData::ConfigInfo(config) => {
            print!("{}", config);
        }
    }
}

fn format_pretty_output(data: &OutputData) {
    use owo_colors::OwoColorize;

    match data {
        OutputData::Listings(outcome) => {
            print!("{}", format_outcome(outcome));
        }
        OutputData::Sources(sources) => {
            println!("{}", "Registered Sources".cyan().bold());
            println!();
            println!("{}", format_sources(sources));
        }
        OutputData::ConfigInfo(config) => {
            println!("{}", "Configuration".cyan().bold());
            println!();
            print!("{}", config);
        }
    }
}
