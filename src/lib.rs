//! campusdb - A strict, deterministic query engine for course and room datasets
//!
//! Queries are JSON documents with a WHERE filter, optional grouping and
//! aggregation, and projection and ordering options. Each query is validated
//! against the registered datasets and then evaluated over one dataset.

pub mod api;
pub mod cli;
pub mod dataset;
pub mod executor;
pub mod observability;
pub mod query;
