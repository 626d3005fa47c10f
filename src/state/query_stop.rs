//! Reasons a query variant stops paginating, and how a campaign ended
use std::fmt;

/// Why pagination of a single query variant ended
///
/// Every variant is terminal for the query only; none of them stop the
/// campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStop {
    /// The per-query quota of new items was reached
    QuotaMet,

    /// The last allowed page was processed
    PageLimit,

    /// A page could not be fetched after all retry attempts
    FetchFailed,

    /// A page stayed empty after the stalled-page pause and retry
    Stalled,
}

impl QueryStop {
    /// Returns true if the query ran to one of its configured limits
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::QuotaMet | Self::PageLimit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuotaMet => "quota_met",
            Self::PageLimit => "page_limit",
            Self::FetchFailed => "fetch_failed",
            Self::Stalled => "stalled",
        }
    }
}

impl fmt::Display for QueryStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a campaign run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    /// Every variant was processed and the checkpoint removed
    Completed,

    /// An interrupt arrived; the checkpoint was flushed
    Interrupted,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}
