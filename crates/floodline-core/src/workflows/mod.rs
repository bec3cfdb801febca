//! # Workflows Module
//!
//! Top-level entry points of the library. A workflow sequences the pure
//! computations in [`crate::core`] with the engine's narrative boundary and
//! assembles the final, immutable result.
//!
//! - **Simulation Workflow** ([`simulate`]) - score a design, project its cutoff
//!   year, assemble the advisory prompt and merge the generated narrative.

pub mod simulate;
