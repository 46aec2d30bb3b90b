//! Sector-weighted climate risk scoring and assessment orchestration.
//!
//! `scoring` holds the pure pieces (weight table, resolver, classifier, residual
//! risk formula). `assessment` fans subject-level requests out to the external
//! generation collaborator and assembles sanitized records.

pub mod assessment;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
