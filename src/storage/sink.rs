//! CSV result sink
//!
//! Rows are appended to a two-column file (title, url). The set of URLs
//! already in the file is loaded once when the sink is opened and grows with
//! every successful append; it never shrinks except to undo a failed write.

use crate::campaign::ResultItem;
use crate::storage::csv::{format_record, parse_records};
use crate::storage::traits::{ResultSink, SinkResult};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only CSV file with URL deduplication across runs
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    title_column: String,
    url_column: String,
    seen: HashSet<String>,

    /// The existing file ends without a line break
    unterminated: bool,
}

impl CsvSink {
    /// Opens (or prepares to create) the output file and seeds the
    /// deduplication set from its existing rows
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file; it is created on first append
    /// * `title_column` - Header written for the title column
    /// * `url_column` - Header written for, and looked up as, the URL column
    ///
    /// # Returns
    ///
    /// * `Ok(CsvSink)` - The sink, with every existing URL registered
    /// * `Err(SinkError)` - The existing file could not be read
    pub fn open(
        path: impl Into<PathBuf>,
        title_column: impl Into<String>,
        url_column: impl Into<String>,
    ) -> SinkResult<Self> {
        let mut sink = Self {
            path: path.into(),
            title_column: title_column.into(),
            url_column: url_column.into(),
            seen: HashSet::new(),
            unterminated: false,
        };

        let loaded = sink.load_existing_urls()?;
        if loaded > 0 {
            tracing::info!(
                "Loaded {} unique URLs from existing {}",
                loaded,
                sink.path.display()
            );
        }

        Ok(sink)
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_existing_urls(&mut self) -> SinkResult<usize> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        if !content.is_empty() && !content.ends_with('\n') {
            tracing::warn!(
                "{} does not end with a line break; the next row starts on a new line",
                self.path.display()
            );
            self.unterminated = true;
        }

        let mut records = parse_records(&content).into_iter();
        let Some(header) = records.next() else {
            tracing::info!("{} is empty, no existing URLs to load", self.path.display());
            return Ok(0);
        };

        let Some(url_index) = header.iter().position(|h| h.trim() == self.url_column) else {
            tracing::warn!(
                "URL column '{}' not found in {}; existing rows will not be deduplicated",
                self.url_column,
                self.path.display()
            );
            return Ok(0);
        };

        let before = self.seen.len();
        for record in records {
            if let Some(url) = record.get(url_index).map(|u| u.trim()) {
                if !url.is_empty() {
                    self.seen.insert(url.to_string());
                }
            }
        }

        Ok(self.seen.len() - before)
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true)
    }

    fn write_rows(&self, rows: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        write_or_truncate(&mut file, |file| {
            file.write_all(rows.as_bytes())?;
            file.sync_data()
        })
    }
}

/// Runs `write` against `file`, cutting the file back to its prior length
/// if the write fails so no partial row survives
fn write_or_truncate<F>(file: &mut File, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let committed = file.metadata()?.len();

    if let Err(e) = write(file) {
        if let Err(truncate) = file.set_len(committed).and_then(|()| file.sync_data()) {
            tracing::error!(
                "Could not remove partial write (restoring {} bytes): {}",
                committed,
                truncate
            );
        }
        return Err(e);
    }

    Ok(())
}

impl ResultSink for CsvSink {
    fn append(&mut self, items: &[ResultItem]) -> SinkResult<usize> {
        let mut added: Vec<String> = Vec::new();
        let mut rows = String::new();

        for item in items {
            let title = item.title.trim();
            let url = item.url.trim();
            if title.is_empty() || url.is_empty() {
                tracing::debug!("Skipping item with empty title or url: {:?}", item);
                continue;
            }

            if !self.seen.insert(url.to_string()) {
                continue;
            }

            added.push(url.to_string());
            rows.push_str(&format_record(&[title, url]));
        }

        if added.is_empty() {
            return Ok(0);
        }

        if self.needs_header() {
            let header = format_record(&[&self.title_column, &self.url_column]);
            rows.insert_str(0, &header);
        } else if self.unterminated {
            rows.insert(0, '\n');
        }

        if let Err(e) = self.write_rows(&rows) {
            tracing::error!("Error writing to {}: {}", self.path.display(), e);
            for url in &added {
                self.seen.remove(url);
            }
            return Err(e.into());
        }

        self.unterminated = false;
        Ok(added.len())
    }

    fn contains(&self, url: &str) -> bool {
        self.seen.contains(url.trim())
    }

    fn known_urls(&self) -> usize {
        self.seen.len()
    }
}
