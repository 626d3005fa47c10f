//! State module for tracking campaign progress
//!
//! # Components
//!
//! - `CampaignCheckpoint`: the in-memory resume position (query variant + next page)
//! - `QueryStop`: why a single query variant stopped paginating
//! - `CampaignStatus`: how a whole run ended

mod checkpoint;
mod query_stop;

// Re-export main types
pub use checkpoint::CampaignCheckpoint;
pub use query_stop::{CampaignStatus, QueryStop};
