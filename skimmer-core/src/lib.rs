//! Skimmer Core
//!
//! Core types shared by the Skimmer search poller.
//!
//! This crate contains:
//! - Domain types: checkpoint records, search items, pages and queries
//! - Cutoff helpers used by every component that filters by time

pub mod domain;
