//! # Rift Coach
//!
//! Data acquisition and analytics core for a League of Legends coaching tool.
//!
//! ## Architecture
//!
//! - **models**: Riot API data structures and derived report types
//! - **fetch**: Rate-limit-aware Riot API gateway with caching and fan-out
//! - **analytics**: Per-match digests, player summaries, DNA and learning paths
//! - **timeline**: Early-game digests from match timelines
//! - **ranked**: Layered ranked-data resolution (LCU, apex, entries, history)
//! - **leaderboard**: Apex ladder assembly with identity enrichment
//! - **assets**: Data Dragon name and icon resolution
//! - **storage**: JSONL persistence for players, ranked stats and matches
//! - **coach**: The orchestrator tying acquisition to analysis
//! - **config**: Configuration loading and validation

pub mod analytics;
pub mod assets;
pub mod cache;
pub mod coach;
pub mod config;
pub mod fetch;
pub mod lcu;
pub mod leaderboard;
pub mod models;
pub mod ranked;
pub mod storage;
pub mod timeline;

pub use models::*;
