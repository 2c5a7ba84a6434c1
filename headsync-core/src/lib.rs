//! Headsync core library — tag domain types, range resolution, checkpoints.
//!
//! Public API surface:
//! - [`types`] — [`Tag`], [`ReleaseLine`], version-key ordering
//! - [`catalog`] — run-scoped [`TagCatalog`] snapshot and line matching
//! - [`range`] — update-range resolution
//! - [`checkpoint`] — `.version` checkpoint persistence
//! - [`config`] — [`MirrorConfig`] YAML loading
//! - [`error`] — per-concern error enums

pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod range;
pub mod types;

pub use catalog::TagCatalog;
pub use config::MirrorConfig;
pub use error::{CheckpointError, ConfigError, RangeError, TagError};
pub use types::{ReleaseLine, Tag};
