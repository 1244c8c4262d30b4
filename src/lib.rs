//! DropLinks: a panel-based link organizer core.
//!
//! This facade re-exports the board application surface. Hosts construct a
//! [`BoardApp`], feed it [`RawInput`] events and [`Command`]s, and carry out
//! the returned [`Effect`]s (rendering, dialogs, opening URLs).

pub use droplinks_board::{
    BoardApp, BoardState, Command, Effect, HitTarget, Link, MessageKind, Panel, RawInput,
};

use anyhow::Result;
use droplinks_board::DropConfig;

/// Open a board backed by the default on-disk store, with configuration
/// loaded from `droplinks.toml` and the environment.
pub fn open() -> Result<BoardApp> {
    BoardApp::with_default_services(DropConfig::load())
}
