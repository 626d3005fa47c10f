//! Output module for run summaries and statistics
//!
//! This module handles:
//! - Printing the end-of-run summary of a campaign
//! - Reading statistics from an existing result file (`--stats`)

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use crate::campaign::CampaignReport;
use crate::state::CampaignStatus;

/// Prints the summary of a finished or interrupted campaign to stdout
pub fn print_run_summary(report: &CampaignReport) {
    println!("\n=== Campaign Summary ===\n");

    if !report.queries.is_empty() {
        println!("Queries:");
        let width = report
            .queries
            .iter()
            .map(|q| q.query.chars().count())
            .max()
            .unwrap_or(0);
        for query in &report.queries {
            println!(
                "  {:<width$}  {:>4} new  {:>4} pages  {}",
                query.query,
                query.saved,
                query.pages_attempted,
                query.stop,
                width = width
            );
        }
        println!();
    }

    println!("Status: {}", report.status);
    println!("New rows this run: {}", report.saved_this_run);
    println!("Unique URLs in output: {}", report.known_urls);

    let stopped_early = report.stopped_early();
    if stopped_early > 0 {
        println!("Queries stopped early (failed or stalled): {}", stopped_early);
    }

    if report.status == CampaignStatus::Interrupted {
        println!("\nRe-run to resume from the saved checkpoint.");
    }
}
