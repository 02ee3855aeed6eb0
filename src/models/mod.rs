//! Core data models for the coaching pipeline.

mod account;
mod analysis;
mod league;
mod leaderboard;
mod mastery;
mod matches;
mod summoner;
mod timeline;

pub use account::*;
pub use analysis::*;
pub use league::*;
pub use leaderboard::*;
pub use mastery::*;
pub use matches::*;
pub use summoner::*;
pub use timeline::*;
