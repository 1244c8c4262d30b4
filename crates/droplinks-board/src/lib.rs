//! Board application: ties the pure link-board model to storage,
//! gestures and background metadata work.
//!
//! [`BoardApp`] is the single entry point. Hosts feed it [`RawInput`]
//! events or explicit [`Command`]s and carry out the [`Effect`]s it
//! returns. Everything that talks to the outside world (dialogs, HTTP,
//! the browser) stays on the host side of that boundary, which keeps
//! the whole command loop testable with in-memory services.

pub mod app;
pub mod command;
pub mod gateway;
pub mod metadata;
pub mod router;

pub use app::BoardApp;
pub use command::{Command, Effect, MessageKind};
pub use gateway::{MirrorStatus, ReconcileOutcome, SnapshotGateway};
pub use metadata::MetadataTracker;
pub use router::{DropPayload, HitTarget, InteractionRouter, PointerPos, RawInput, RouterConfig};

// Hosts usually only depend on this crate, so surface the model and
// config types they need to drive it.
pub use droplinks_config::DropConfig;
pub use droplinks_core::{AddLinkOutcome, BoardState, Link, Panel, PanelId};
