//! # Core Module
//!
//! Stateless building blocks of the resilience evaluation. Every function here
//! is pure: the same design and reference data always produce the same output.
//!
//! - **Data Models** ([`models`]) - design input, score breakdown and simulation result
//! - **Reference Data** ([`reference`]) - immutable catalog and sea-level-rise tables
//! - **Scoring** ([`scoring`]) - component scores and the capped composite
//! - **Timeline** ([`timeline`]) - first year a scenario overtops the structure
//! - **Prompt** ([`prompt`]) - advisory prompt for the narrative generator

pub mod models;
pub mod prompt;
pub mod reference;
pub mod scoring;
pub mod timeline;
