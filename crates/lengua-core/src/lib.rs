//! lengua-core — Answer normalization, grading, tense classification and scoring.
//!
//! This crate defines the quiz data model, the ingestion of loosely keyed
//! data files, and the pure session logic the Lengua front ends build on.

pub mod error;
pub mod grading;
pub mod ingest;
pub mod model;
pub mod normalize;
pub mod repository;
pub mod score;
pub mod session;
pub mod tense;
