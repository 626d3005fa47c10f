//! In-memory campaign position
//!
//! The checkpoint always names the next unit of work that has not been
//! resolved yet. It is updated continuously while the campaign runs and only
//! written to disk at shutdown boundaries (see `storage::CheckpointStore`).

use crate::campaign::QueryVariant;
use serde::{Deserialize, Serialize};

/// Where the campaign should resume: `query_text` (the `modifier_index`-th
/// variant of `seed_query`) starting at `next_page`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCheckpoint {
    pub seed_query: String,

    /// `None` for the unmodified seed, `Some(i)` for the i-th modifier variant
    pub modifier_index: Option<usize>,

    pub query_text: String,

    /// First page not yet successfully processed (1-based)
    pub next_page: u32,

    #[serde(skip)]
    exhausted: bool,
}

impl CampaignCheckpoint {
    /// A checkpoint pointing at page 1 of the seed query
    pub fn new(seed_query: impl Into<String>) -> Self {
        let seed_query = seed_query.into();
        Self {
            query_text: seed_query.clone(),
            seed_query,
            modifier_index: None,
            next_page: 1,
            exhausted: false,
        }
    }

    /// Points the checkpoint at `page` of `variant`
    ///
    /// Pages below 1 are clamped to 1.
    pub fn point_at(&mut self, variant: &QueryVariant, page: u32) {
        self.modifier_index = variant.modifier_index;
        self.query_text.clone_from(&variant.text);
        self.next_page = page.max(1);
        self.exhausted = false;
    }

    /// Marks the whole campaign as finished
    ///
    /// The page is moved past `max_pages` so a stray resume of this position
    /// fetches nothing.
    pub fn mark_exhausted(&mut self, max_pages: u32) {
        self.next_page = max_pages.saturating_add(1);
        self.exhausted = true;
    }

    /// Returns true once every variant has been processed
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns true if this checkpoint refers to the given variant
    pub fn is_at(&self, variant: &QueryVariant) -> bool {
        self.modifier_index == variant.modifier_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(text: &str, index: Option<usize>) -> QueryVariant {
        QueryVariant {
            text: text.to_string(),
            modifier_index: index,
        }
    }

    #[test]
    fn test_new_points_at_seed() {
        let cp = CampaignCheckpoint::new("cats");
        assert_eq!(cp.seed_query, "cats");
        assert_eq!(cp.query_text, "cats");
        assert_eq!(cp.modifier_index, None);
        assert_eq!(cp.next_page, 1);
        assert!(!cp.is_exhausted());
    }

    #[test]
    fn test_point_at_variant() {
        let mut cp = CampaignCheckpoint::new("cats");
        let v = variant("cats gifs", Some(1));

        cp.point_at(&v, 7);

        assert_eq!(cp.query_text, "cats gifs");
        assert_eq!(cp.modifier_index, Some(1));
        assert_eq!(cp.next_page, 7);
        assert!(cp.is_at(&v));
        assert!(!cp.is_at(&variant("cats", None)));
    }

    #[test]
    fn test_page_is_never_zero() {
        let mut cp = CampaignCheckpoint::new("cats");
        cp.point_at(&variant("cats", None), 0);
        assert_eq!(cp.next_page, 1);
    }

    #[test]
    fn test_mark_exhausted() {
        let mut cp = CampaignCheckpoint::new("cats");
        cp.mark_exhausted(100);
        assert!(cp.is_exhausted());
        assert_eq!(cp.next_page, 101);

        cp.point_at(&variant("cats", None), 1);
        assert!(!cp.is_exhausted());
    }

    #[test]
    fn test_serialized_shape() {
        let mut cp = CampaignCheckpoint::new("foo");
        cp.point_at(&variant("foo bar2", Some(2)), 5);

        let json = serde_json::to_value(&cp).unwrap();
        assert_eq!(json["seed_query"], "foo");
        assert_eq!(json["modifier_index"], 2);
        assert_eq!(json["query_text"], "foo bar2");
        assert_eq!(json["next_page"], 5);
        assert!(json.get("exhausted").is_none());
    }
}
