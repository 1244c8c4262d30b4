//! IO capabilities for the DropLinks board: snapshot storage, clocks,
//! clipboard, file dialogs and background metadata fetches.
//!
//! Everything the board core touches in the outside world goes through
//! this crate, either as a trait the board holds ([`KvStore`], [`Clock`],
//! [`ClipboardText`]) or as a request/poll service the host drives
//! ([`FileDialogService`], [`MetadataFetchService`]).

#![allow(clippy::all)]

pub mod clipboard;
pub mod clock;
pub mod dialog;
pub mod fetch;
pub mod mirror;
pub mod storage;

pub use clipboard::{ClipboardText, StaticClipboard, SystemClipboard};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dialog::{FileDialogKind, FileDialogResult, FileDialogService};
pub use fetch::{MetadataFetchService, MetadataResult};
pub use mirror::MirrorFile;
pub use storage::{APP_HOME_DIR, FileKvStore, KvStore, MemoryKvStore};
