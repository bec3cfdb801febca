//! # Engine Module
//!
//! Request-level machinery shared by the workflows: the simulation
//! configuration, the error type surfaced to callers, the boundary to the
//! external narrative generator, and phase progress reporting.
//!
//! - **Configuration** ([`config`]) - scenario selection and the narrative call budget
//! - **Error Handling** ([`error`]) - integrity and scenario failures that abort a request
//! - **Narrative** ([`narrative`]) - generator trait, output parsing and fallback texts
//! - **Progress Monitoring** ([`progress`]) - phase events for interactive front ends

pub mod config;
pub mod error;
pub mod narrative;
pub mod progress;
