//! Semantic commands and host effects.
//!
//! Commands flow in (from the interaction router or directly from host
//! chrome), effects flow out. Both are plain data so a host can queue,
//! log or replay them.

use std::path::PathBuf;

use droplinks_core::PanelId;

/// One board operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddPanel,
    /// First phase of panel deletion: remember the target and ask.
    RequestDeletePanel { panel_id: PanelId },
    /// Second phase: the user confirmed the pending deletion.
    ConfirmDelete,
    CancelDelete,
    /// Reorder panels by display position.
    MovePanel { from_index: usize, to_index: usize },
    RenamePanel { panel_id: PanelId, title: String },
    AddLink { panel_id: PanelId, url: String },
    RemoveLink { panel_id: PanelId, link_index: usize },
    MoveLink {
        source_panel: PanelId,
        target_panel: PanelId,
        link_index: usize,
    },
    /// Commit edited title and URL for an existing link.
    EditLink {
        panel_id: PanelId,
        link_index: usize,
        title: String,
        url: String,
    },
    OpenLink { panel_id: PanelId, link_index: usize },
    /// Long press resolved on a link; the host should open its editor.
    BeginEditLink { panel_id: PanelId, link_index: usize },
    ToggleView,
    ExportData,
    /// Import a board document the host already read into memory.
    ImportText { json: String },
    /// Text pasted outside any editable field.
    PasteText { text: String },
    /// Explicit clipboard shortcut; the app reads the clipboard itself.
    ReadClipboard,
    SyncNow,
    /// Periodic tick; runs a sync only when the configured interval
    /// elapsed.
    SyncTick,
    /// Reply to a mirror file dialog. `None` means the user cancelled.
    MirrorPathChosen { path: Option<PathBuf> },
    /// Reply from the metadata fetch service.
    MetadataFetched {
        request_id: u64,
        title: Option<String>,
    },
}

/// Severity of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// Work the host must carry out after applying commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Board content changed; redraw it.
    RenderRequested,
    /// Ask the user to confirm the pending panel deletion.
    ConfirmDeletePanel { panel_id: PanelId },
    /// Let the user pick which panel a pasted URL lands in.
    PromptPanelChoice { url: String },
    /// Open a link in the system browser.
    OpenUrl { url: String },
    /// Open the editor for a long-pressed link.
    EditLinkPrompt { panel_id: PanelId, link_index: usize },
    /// Write an export document wherever downloads go.
    SaveExportFile { file_name: String, contents: String },
    /// Ask for a location to keep the mirror file at (save dialog).
    PromptMirrorSave { suggested_name: String },
    /// Ask for an existing board file to sync against (open dialog).
    PromptMirrorOpen,
    /// Start a background title fetch.
    FetchTitle { request_id: u64, url: String },
    /// Abandon a background title fetch.
    CancelFetch { request_id: u64 },
    /// Show a transient status message.
    ShowMessage { kind: MessageKind, text: String },
}
