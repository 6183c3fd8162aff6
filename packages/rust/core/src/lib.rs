//! Rollup pipeline for work logs.
//!
//! Daily logs are rolled up into weekly achievements and weekly achievements
//! into monthly highlights. Each run resolves a period, fetches the lower
//! tier's records with their content, asks a [`summarizer::Summarizer`] for a
//! summary, and persists an aggregate that links back to every source record.

pub mod aggregate;
pub mod daily;
pub mod fetcher;
pub mod period;
pub mod rollup;
pub mod summarizer;
