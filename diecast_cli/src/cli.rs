use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "diecast")]
#[command(about = "Diecast - search die-cast model shops and eBay in one go")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  diecast search \"porsche 911\"                  Search every enabled source
  diecast search \"ferrari 250\" -s stmdiecast    Search one source
  diecast search \"bmw m3\" --output json         Machine-readable output
  diecast sources                               List registered sources
  diecast config show                           Print the effective configuration

\x1b[1;36mConfiguration:\x1b[0m
  --config <path>, $DIECAST_CONFIG, or ~/.config/diecast/config.toml
  EBAY_CLIENT_ID / EBAY_CLIENT_SECRET enable the eBay source")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every enabled source for a model
    ///
    /// All sources are queried concurrently; a source that fails or times out
    /// simply contributes no listings.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  diecast search \"porsche 911\"
  diecast search \"ferrari 250 gto\" --sources stmdiecast,replicarz
  diecast search \"lamborghini miura\" --limit 10 --output text")]
    Search {
        /// The search query
        query: String,

        /// Comma-separated source ids to query (default: all enabled)
        #[arg(short = 's', long = "sources", value_delimiter = ',')]
        sources: Vec<String>,

        /// Show at most this many listings
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the registered sources
    #[command(alias = "ls")]
    Sources,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML (default)
    Show,
    /// Print the default config file location
    Path,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// Plain text output
    Text,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_with_sources() {
        let cli = Cli::try_parse_from([
            "diecast",
            "search",
            "porsche 911",
            "-s",
            "stmdiecast,ebay",
            "--output",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Search {
                query,
                sources,
                limit,
            } => {
                assert_eq!(query, "porsche 911");
                assert_eq!(sources, vec!["stmdiecast", "ebay"]);
                assert_eq!(limit, None);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["diecast", "sources", "-vv", "--config", "/tmp/d.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/d.toml")));
    }
}
