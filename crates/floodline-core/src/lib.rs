//! # Floodline Core Library
//!
//! A deterministic engine that estimates a building design's flood resilience:
//! a bounded composite score, the first year a sea-level-rise scenario
//! overtakes the structure, and a generated design narrative.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Data models, the immutable reference tables,
//!   and the pure scoring, timeline and prompt computations.
//!
//! - **[`engine`]: Request Machinery.** Configuration, errors, the narrative
//!   generator boundary with its fallback policy, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** The simulation orchestrator that
//!   sequences the above into a single [`core::models::result::SimulationResult`].

pub mod core;
pub mod engine;
pub mod workflows;
