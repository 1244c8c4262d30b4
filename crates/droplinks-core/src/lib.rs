//! Core data model for DropLinks boards.
//!
//! A board is an ordered list of panels, each holding an ordered list of
//! links. This crate owns the board state, its mutation operations and
//! invariants, the snapshot/export wire documents, and the URL-derived
//! metadata heuristics. It performs no I/O and reads no clocks; callers
//! supply timestamps.

pub mod error;
pub mod model;
pub mod snapshot;
pub mod url_meta;

pub use error::{CoreError, Result};
pub use model::{AddLinkOutcome, BoardState, Link, Panel, PanelId};
pub use snapshot::{
    EXPORT_VERSION, ExportDocument, MIRROR_FILE_NAME, STORAGE_KEY, SnapshotDocument,
};
