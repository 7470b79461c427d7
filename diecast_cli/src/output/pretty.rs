//! Pretty formatter for terminal output.
//!
//! Listings render as numbered cards: bold title, price and source on the
//! second line, then the clickable product link. A per-source summary table
//! closes the output so the eye settles on which shops answered.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use diecast_core::{AggregateOutcome, Listing, SourceInfo, SourceReport};
use owo_colors::OwoColorize;

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Indent for card content (after number)
const CARD_INDENT: usize = 6;

// ============================================================================
// Public API
// ============================================================================

/// Render a full aggregation: header, listing cards, source summary.
pub fn format_outcome(outcome: &AggregateOutcome) -> String {
    let width = terminal_width();
    let mut output = String::new();

    output.push_str(&format_section_header(
        outcome.query.trim(),
        Some(outcome.total()),
        width,
    ));
    output.push_str("\n\n");

    for (i, listing) in outcome.listings.iter().enumerate() {
        output.push_str(&format_card(listing, i + 1, width));
        output.push('\n');
    }

    output.push_str(&format_source_table(&outcome.sources));
    output.push('\n');
    output.push_str(
        &format!(
            "{} sources answered in {} ms",
            outcome.contributing_sources().len(),
            outcome.duration_ms
        )
        .dimmed()
        .to_string(),
    );
    output.push('\n');
    output
}

/// Table of registered sources.
pub fn format_sources(sources: &[SourceInfo]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("id".cyan().bold().to_string()),
        Cell::new("name".cyan().bold().to_string()),
        Cell::new("description".cyan().bold().to_string()),
    ]);
    for source in sources {
        table.add_row(vec![
            Cell::new(&source.id),
            Cell::new(source.name.green().to_string()),
            Cell::new(&source.description),
        ]);
    }
    table.to_string()
}

// ============================================================================
// Cards
// ============================================================================

fn format_card(listing: &Listing, index: usize, width: usize) -> String {
    let mut output = String::new();
    let title_width = width.saturating_sub(CARD_INDENT + 2).max(20);

    output.push_str(&format!(
        "{}{}\n",
        format!(" {:>3}. ", index).cyan().bold(),
        truncate_str(&listing.title, title_width).bold()
    ));

    let price = if listing.has_price() {
        listing.price.green().bold().to_string()
    } else {
        listing.price.dimmed().to_string()
    };
    output.push_str(&format!(
        "      {} {} {}\n",
        price,
        "·".dimmed(),
        listing.source.label().magenta()
    ));

    output.push_str(&format!(
        "      {}\n",
        format_hyperlink(&listing.link, &listing.link).blue()
    ));

    if let Some(image) = &listing.image {
        output.push_str(&format!(
            "      {}: {}\n",
            "image".dimmed(),
            truncate_str(image, title_width).dimmed()
        ));
    }

    output
}

fn format_source_table(reports: &[SourceReport]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("source".cyan().bold().to_string()),
        Cell::new("listings".cyan().bold().to_string()),
        Cell::new("time".cyan().bold().to_string()),
        Cell::new("status".cyan().bold().to_string()),
    ]);

    for report in reports {
        let status = if report.timed_out {
            "timed out".yellow().to_string()
        } else if report.count == 0 {
            "empty".dimmed().to_string()
        } else {
            "ok".green().to_string()
        };
        table.add_row(vec![
            Cell::new(report.source.label()),
            Cell::new(report.count).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} ms", report.duration_ms)).set_alignment(CellAlignment::Right),
            Cell::new(status),
        ]);
    }

    table.to_string()
}

// ============================================================================
// Helpers
// ============================================================================

fn format_section_header(label: &str, count: Option<usize>, width: usize) -> String {
    let count_str = match count {
        Some(n) => format!(" ({} results)", n),
        None => String::new(),
    };

    let header_text = format!("{}{}", label, count_str);
    let line_len = (width.saturating_sub(header_text.len() + 4)).min(60);
    let line = "─".repeat(line_len);

    format!(
        "{} {} {}",
        "──".cyan(),
        header_text.green().bold(),
        line.cyan()
    )
}

fn truncate_str(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or(s);

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Format a URL as a clickable hyperlink using OSC 8 escape sequences.
fn format_hyperlink(url: &str, display_text: &str) -> String {
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, display_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diecast_core::Source;

    fn listing(price: Option<&str>, image: Option<&str>) -> Listing {
        Listing::new(
            Source::Replicarz,
            "Ferrari 250 GTO 1:18",
            price.map(str::to_string),
            "https://www.replicarz.com/products/250-gto",
            image.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_format_card() {
        let output = format_card(&listing(Some("$189.95"), None), 1, 80);
        assert!(output.contains("Ferrari 250 GTO 1:18"));
        assert!(output.contains("$189.95"));
        assert!(output.contains("Replicarz"));
        assert!(output.contains("replicarz.com/products/250-gto"));
        assert!(!output.contains("image"));
    }

    #[test]
    fn test_format_card_with_image_and_missing_price() {
        let output = format_card(
            &listing(None, Some("https://cdn.replicarz.com/250.jpg")),
            2,
            80,
        );
        assert!(output.contains("Price not found"));
        assert!(output.contains("cdn.replicarz.com/250.jpg"));
    }

    #[test]
    fn test_truncate_str() {
        let long = "Porsche 911 RSR #92 Le Mans 24h GTE Pro Class Winner 1:18 Resin Model";
        let truncated = truncate_str(long, 20);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().count() <= 20);
        assert_eq!(truncate_str("short", 20), "short");
    }

    #[test]
    fn test_format_section_header() {
        let header = format_section_header("porsche 911", Some(3), 80);
        assert!(header.contains("porsche 911"));
        assert!(header.contains("3 results"));
    }

    #[test]
    fn test_format_source_table() {
        let reports = vec![
            SourceReport {
                source: Source::StmDiecast,
                count: 4,
                duration_ms: 812,
                timed_out: false,
            },
            SourceReport {
                source: Source::Ebay,
                count: 0,
                duration_ms: 120_000,
                timed_out: true,
            },
        ];
        let table = format_source_table(&reports);
        assert!(table.contains("STMDiecast"));
        assert!(table.contains("812 ms"));
        assert!(table.contains("timed out"));
    }
}
