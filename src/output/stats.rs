//! Statistics from the result file and checkpoint
//!
//! This module provides functionality for summarizing what previous runs
//! have harvested, without touching the search backend.

use crate::config::OutputConfig;
use crate::storage::csv::parse_records;
use crate::storage::{CheckpointRecord, CheckpointStore};
use crate::HarvestError;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;
use url::Url;

/// Harvest statistics summary
#[derive(Debug, Clone, Default)]
pub struct HarvestStatistics {
    /// The result file the statistics were read from
    pub output_path: PathBuf,

    /// Data rows in the result file (header excluded)
    pub total_rows: u64,

    /// Distinct non-empty URLs
    pub unique_urls: u64,

    /// Rows whose URL column was empty or missing
    pub rows_without_url: u64,

    /// Distinct URL counts per host, most frequent first
    pub top_hosts: Vec<(String, u64)>,

    /// The saved resume position, if a run was interrupted
    pub pending: Option<CheckpointRecord>,
}

/// How many hosts `load_statistics` keeps
const TOP_HOSTS: usize = 10;

/// Loads statistics for the configured output file and checkpoint
///
/// # Arguments
///
/// * `output` - Where the result file and checkpoint live
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - A missing result file yields zero counts
/// * `Err(HarvestError)` - A file exists but could not be read
pub fn load_statistics(output: &OutputConfig) -> Result<HarvestStatistics, HarvestError> {
    let output_path = PathBuf::from(&output.filename);
    let content = match fs::read_to_string(&output_path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let mut stats = summarize_rows(&content, &output.url_column);
    stats.output_path = output_path;
    stats.pending = CheckpointStore::new(&output.checkpoint_path).load()?;

    Ok(stats)
}

fn summarize_rows(content: &str, url_column: &str) -> HarvestStatistics {
    let mut records = parse_records(content).into_iter();
    let Some(header) = records.next() else {
        return HarvestStatistics::default();
    };
    let url_index = header.iter().position(|h| h.trim() == url_column);

    let mut stats = HarvestStatistics::default();
    let mut urls = HashSet::new();
    let mut hosts: HashMap<String, u64> = HashMap::new();

    for record in records {
        stats.total_rows += 1;

        let url = url_index
            .and_then(|i| record.get(i))
            .map(|u| u.trim())
            .filter(|u| !u.is_empty());
        let Some(url) = url else {
            stats.rows_without_url += 1;
            continue;
        };

        if urls.insert(url.to_string()) {
            let host = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "(unparsable)".to_string());
            *hosts.entry(host).or_default() += 1;
        }
    }

    stats.unique_urls = urls.len() as u64;

    let mut top_hosts: Vec<_> = hosts.into_iter().collect();
    top_hosts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_hosts.truncate(TOP_HOSTS);
    stats.top_hosts = top_hosts;

    stats
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Result file: {}", stats.output_path.display());
    println!("  Rows: {}", stats.total_rows);
    println!("  Unique URLs: {}", stats.unique_urls);
    if stats.rows_without_url > 0 {
        println!("  Rows without a URL: {}", stats.rows_without_url);
    }
    println!();

    if !stats.top_hosts.is_empty() {
        println!("Top Hosts:");
        for (host, count) in &stats.top_hosts {
            let percentage = if stats.unique_urls > 0 {
                (*count as f64 / stats.unique_urls as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", host, count, percentage);
        }
        println!();
    }

    match &stats.pending {
        Some(record) => {
            println!("Interrupted Run:");
            println!("  Seed query: {}", record.position.seed_query);
            println!(
                "  Resumes at: \"{}\" page {}",
                record.position.query_text, record.position.next_page
            );
            println!("  Saved at: {}", record.saved_at.to_rfc3339());
        }
        None => println!("No interrupted run pending."),
    }
}
