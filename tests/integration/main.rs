//! Integration tests for Query-Harvest
//!
//! These tests use wiremock to stand in for the search backend and run the
//! client, fetcher, and campaign controller against it end-to-end.

mod campaign_tests;
mod client_tests;
mod common;
