//! Shared types, error model, and configuration for the worklog rollup tools.
//!
//! This crate is the foundation depended on by all other worklog crates.
//! It provides:
//! - [`WorklogError`] is the unified error type
//! - Domain types ([`RecordId`], [`PropertyValue`], [`ContentNode`], [`RecordDraft`])
//! - Configuration ([`AppConfig`], [`LlmConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CollectionsConfig, LlmConfig, ProviderConfig, RollupConfig, StorageConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, WorklogError};
pub use types::{
    Category, ContentNode, EnrichedRecord, ImpactLevel, LogStatus, Properties, PropertyValue,
    RawRecord, RecordDraft, RecordId, fields,
};
