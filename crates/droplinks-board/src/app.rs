//! The board application: hydration, the command loop and service wiring.
//!
//! [`BoardApp`] owns the state, the persistence gateway, the interaction
//! router and the metadata tracker. Every mutation flows through
//! [`BoardApp::apply`], which persists after each change and reports the
//! work the host still has to do as [`Effect`]s.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use droplinks_config::DropConfig;
use droplinks_core::snapshot::MIRROR_FILE_NAME;
use droplinks_core::{url_meta, AddLinkOutcome, BoardState, Link, PanelId};
use droplinks_io::{ClipboardText, Clock, FileKvStore, KvStore, SystemClipboard, SystemClock};

use crate::command::{Command, Effect, MessageKind};
use crate::gateway::{MirrorStatus, ReconcileOutcome, SnapshotGateway};
use crate::metadata::MetadataTracker;
use crate::router::{InteractionRouter, RawInput, RouterConfig};

/// Why a mirror path dialog is currently out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MirrorRequest {
    /// Save dialog, to attach a mirror for future saves.
    ForSave,
    /// Open dialog, to pick an existing file to sync against.
    ForSync,
}

pub struct BoardApp {
    state: BoardState,
    config: DropConfig,
    gateway: SnapshotGateway,
    router: InteractionRouter,
    tracker: MetadataTracker,
    clipboard: Box<dyn ClipboardText>,
    clock: Arc<dyn Clock>,
    /// Outstanding mirror path dialog, if any.
    mirror_request: Option<MirrorRequest>,
    /// The user declined a mirror this session; stop asking on save.
    mirror_declined: bool,
    last_sync_ms: u64,
}

impl BoardApp {
    /// Build a board over explicit capabilities and hydrate it.
    ///
    /// An empty board is seeded with three starter panels and persisted
    /// right away, matching what a first launch looks like.
    pub fn new(
        config: DropConfig,
        store: Box<dyn KvStore>,
        clock: Arc<dyn Clock>,
        clipboard: Box<dyn ClipboardText>,
    ) -> Self {
        let gateway = SnapshotGateway::new(store, clock.clone());
        let state = gateway.load();
        let router = InteractionRouter::new(RouterConfig {
            long_press_ms: config.gestures.long_press_ms,
            drag_threshold_px: config.gestures.drag_threshold_px,
        });
        let mut app = Self {
            state,
            config,
            gateway,
            router,
            tracker: MetadataTracker::new(),
            clipboard,
            clock,
            mirror_request: None,
            mirror_declined: false,
            last_sync_ms: 0,
        };
        if app.state.seed_default_panels() {
            info!("seeded starter panels");
            app.save_quiet();
        }
        info!(
            panels = app.state.panels.len(),
            links = app.state.total_links(),
            "board hydrated"
        );
        app
    }

    /// Build a board on the real filesystem, clock and clipboard.
    pub fn with_default_services(config: DropConfig) -> Result<Self> {
        let store: Box<dyn KvStore> = match config.storage.data_dir.clone() {
            Some(dir) => Box::new(FileKvStore::new(dir)),
            None => Box::new(FileKvStore::open_default()?),
        };
        Ok(Self::new(
            config,
            store,
            Arc::new(SystemClock),
            Box::new(SystemClipboard::new()),
        ))
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    /// Route one raw input event and apply whatever it resolved to.
    pub fn handle_input(&mut self, input: RawInput) -> Vec<Effect> {
        let commands = self.router.process(input);
        let mut effects = Vec::new();
        for command in commands {
            effects.extend(self.apply(command));
        }
        effects
    }

    /// Apply one semantic command, returning the host work it produced.
    pub fn apply(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::AddPanel => {
                self.state.add_panel();
                self.save_and_render()
            }
            Command::RequestDeletePanel { panel_id } => {
                self.state.request_delete(panel_id);
                vec![Effect::ConfirmDeletePanel { panel_id }]
            }
            Command::ConfirmDelete => match self.state.confirm_delete() {
                Some(panel_id) => {
                    let mut effects = cancel_effects(self.tracker.cancel_panel(panel_id));
                    effects.extend(self.save_and_render());
                    effects
                }
                None => Vec::new(),
            },
            Command::CancelDelete => {
                self.state.cancel_delete();
                Vec::new()
            }
            Command::MovePanel {
                from_index,
                to_index,
            } => self.mutate(move |s| s.move_panel(from_index, to_index)),
            Command::RenamePanel { panel_id, title } => {
                self.mutate(move |s| s.rename_title(panel_id, &title))
            }
            Command::AddLink { panel_id, url } => self.add_link(panel_id, &url),
            Command::RemoveLink {
                panel_id,
                link_index,
            } => match self.state.remove_link(panel_id, link_index) {
                Some(removed) => {
                    let mut effects = match self.tracker.cancel_link(panel_id, &removed.url) {
                        Some(request_id) => vec![Effect::CancelFetch { request_id }],
                        None => Vec::new(),
                    };
                    effects.extend(self.save_and_render());
                    effects
                }
                None => Vec::new(),
            },
            Command::MoveLink {
                source_panel,
                target_panel,
                link_index,
            } => {
                if self.state.move_link(source_panel, target_panel, link_index) {
                    let moved_url = self
                        .state
                        .panel(target_panel)
                        .and_then(|p| p.links.last())
                        .map(|l| l.url.clone());
                    if let Some(url) = moved_url {
                        self.tracker.rekey_link(source_panel, &url, target_panel);
                    }
                    self.save_and_render()
                } else {
                    debug!(source_panel, target_panel, link_index, "link move target vanished");
                    Vec::new()
                }
            }
            Command::EditLink {
                panel_id,
                link_index,
                title,
                url,
            } => {
                match self.state.edit_link(
                    panel_id,
                    link_index,
                    &title,
                    &url,
                    &self.config.metadata.favicon_base,
                ) {
                    Ok(true) => {
                        let mut effects = self.save_and_render();
                        effects.push(message(
                            MessageKind::Success,
                            "Link updated successfully!",
                        ));
                        effects
                    }
                    Ok(false) => Vec::new(),
                    Err(error) => {
                        debug!(%error, "rejected link edit");
                        vec![message(
                            MessageKind::Error,
                            "Please enter a valid title and URL",
                        )]
                    }
                }
            }
            Command::OpenLink {
                panel_id,
                link_index,
            } => match self.state.panel(panel_id).and_then(|p| p.links.get(link_index)) {
                Some(link) => vec![Effect::OpenUrl {
                    url: link.url.clone(),
                }],
                None => Vec::new(),
            },
            Command::BeginEditLink {
                panel_id,
                link_index,
            } => {
                if self
                    .state
                    .panel(panel_id)
                    .and_then(|p| p.links.get(link_index))
                    .is_some()
                {
                    vec![Effect::EditLinkPrompt {
                        panel_id,
                        link_index,
                    }]
                } else {
                    Vec::new()
                }
            }
            Command::ToggleView => {
                self.state.toggle_compact_view();
                self.save_and_render()
            }
            Command::ExportData => match self.gateway.export(&self.state) {
                Ok((file_name, contents)) => vec![Effect::SaveExportFile {
                    file_name,
                    contents,
                }],
                Err(error) => {
                    warn!(?error, "export failed");
                    Vec::new()
                }
            },
            Command::ImportText { json } => self.import_text(&json),
            Command::PasteText { text } => {
                let text = text.trim();
                if url_meta::is_valid_url(text) {
                    self.route_pasted_url(text.to_string())
                } else {
                    debug!("ignoring pasted text that is not a URL");
                    Vec::new()
                }
            }
            Command::ReadClipboard => match self.clipboard.read_text() {
                Some(text) if url_meta::is_valid_url(text.trim()) => {
                    self.route_pasted_url(text.trim().to_string())
                }
                Some(_) => vec![message(
                    MessageKind::Error,
                    "Clipboard does not contain a valid URL",
                )],
                None => vec![message(
                    MessageKind::Error,
                    "Could not access clipboard. Try using Ctrl+V instead.",
                )],
            },
            Command::SyncNow => self.sync_now(),
            Command::SyncTick => self.sync_tick(),
            Command::MirrorPathChosen { path } => self.mirror_path_chosen(path),
            Command::MetadataFetched { request_id, title } => {
                self.metadata_fetched(request_id, title)
            }
        }
    }

    fn mutate(&mut self, op: impl FnOnce(&mut BoardState) -> bool) -> Vec<Effect> {
        if op(&mut self.state) {
            self.save_and_render()
        } else {
            Vec::new()
        }
    }

    fn add_link(&mut self, panel_id: PanelId, url: &str) -> Vec<Effect> {
        let link = Link::from_url(url, &self.config.metadata.favicon_base, self.clock.now_ms());
        match self.state.add_link(panel_id, link) {
            AddLinkOutcome::Added => {
                let mut effects = self.save_and_render();
                if self.config.metadata.fetch_titles && url_meta::is_web_url(url) {
                    let request_id = self.tracker.track(panel_id, url);
                    effects.push(Effect::FetchTitle {
                        request_id,
                        url: url.to_string(),
                    });
                }
                effects
            }
            AddLinkOutcome::DuplicateUrl => {
                debug!(panel_id, %url, "panel already holds this URL");
                Vec::new()
            }
            AddLinkOutcome::NoSuchPanel => {
                debug!(panel_id, "add link target vanished");
                Vec::new()
            }
        }
    }

    fn route_pasted_url(&mut self, url: String) -> Vec<Effect> {
        if self.state.panels.is_empty() {
            let panel_id = self.state.add_panel();
            let mut effects = self.save_and_render();
            effects.extend(self.add_link(panel_id, &url));
            effects
        } else {
            vec![Effect::PromptPanelChoice { url }]
        }
    }

    fn import_text(&mut self, json: &str) -> Vec<Effect> {
        match self.gateway.import(&mut self.state, json) {
            Ok(()) => {
                let mut effects = cancel_effects(self.tracker.cancel_all());
                effects.push(Effect::RenderRequested);
                effects.push(message(MessageKind::Success, "Data imported successfully!"));
                effects
            }
            Err(error) => {
                warn!(%error, "import rejected");
                vec![message(
                    MessageKind::Error,
                    "Failed to import data. Invalid JSON format.",
                )]
            }
        }
    }

    fn sync_now(&mut self) -> Vec<Effect> {
        if self.gateway.mirror_attached() {
            match self.gateway.read_mirror() {
                Ok(contents) => self.reconcile_with(&contents),
                Err(error) => {
                    warn!(?error, "mirror read failed, asking for the file again");
                    self.gateway.detach_mirror();
                    self.mirror_request = Some(MirrorRequest::ForSync);
                    vec![Effect::PromptMirrorOpen]
                }
            }
        } else {
            self.mirror_request = Some(MirrorRequest::ForSync);
            vec![Effect::PromptMirrorOpen]
        }
    }

    fn sync_tick(&mut self) -> Vec<Effect> {
        let interval = self.config.sync.interval_secs;
        if interval == 0 {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        if now.saturating_sub(self.last_sync_ms) < interval * 1_000 {
            return Vec::new();
        }
        self.last_sync_ms = now;
        self.sync_now()
    }

    fn reconcile_with(&mut self, contents: &str) -> Vec<Effect> {
        match self.gateway.reconcile(&mut self.state, contents) {
            ReconcileOutcome::Imported => {
                let mut effects = vec![message(MessageKind::Info, "Newer data found - syncing...")];
                effects.extend(cancel_effects(self.tracker.cancel_all()));
                effects.push(Effect::RenderRequested);
                effects.push(message(MessageKind::Success, "Synced with newer data!"));
                effects
            }
            ReconcileOutcome::UpToDate => {
                info!("local data is up to date");
                Vec::new()
            }
            ReconcileOutcome::Invalid(reason) => {
                warn!(%reason, "sync file rejected");
                vec![message(
                    MessageKind::Error,
                    "Failed to import data. Invalid JSON format.",
                )]
            }
        }
    }

    fn mirror_path_chosen(&mut self, path: Option<PathBuf>) -> Vec<Effect> {
        match (self.mirror_request.take(), path) {
            (Some(MirrorRequest::ForSave), Some(path)) => {
                self.gateway.attach_mirror(path);
                // Push the current board through the fresh path right away.
                // A failing path falls back below without re-prompting.
                self.save_with_prompt(false)
            }
            (Some(MirrorRequest::ForSave), None) => {
                info!("mirror declined, saving locally only this session");
                self.mirror_declined = true;
                Vec::new()
            }
            (Some(MirrorRequest::ForSync), Some(path)) => {
                self.gateway.attach_mirror(path);
                match self.gateway.read_mirror() {
                    Ok(contents) => self.reconcile_with(&contents),
                    Err(error) => {
                        warn!(?error, "selected sync file unreadable");
                        self.gateway.detach_mirror();
                        vec![message(MessageKind::Error, "Failed to read file.")]
                    }
                }
            }
            (Some(MirrorRequest::ForSync), None) => {
                debug!("sync file selection cancelled");
                Vec::new()
            }
            (None, _) => {
                debug!("unsolicited mirror path result, ignoring");
                Vec::new()
            }
        }
    }

    fn metadata_fetched(&mut self, request_id: u64, title: Option<String>) -> Vec<Effect> {
        let Some((panel_id, url)) = self.tracker.complete(request_id) else {
            debug!(request_id, "stale metadata result, ignoring");
            return Vec::new();
        };
        let Some(title) = title else {
            return Vec::new();
        };
        // The link may have been removed or edited while the fetch ran.
        if self.state.update_link_title(panel_id, &url, &title) {
            self.save_and_render()
        } else {
            debug!(panel_id, %url, "fetched a title for a vanished link");
            Vec::new()
        }
    }

    fn save_quiet(&mut self) {
        if let Err(error) = self.gateway.save(&mut self.state) {
            warn!(?error, "failed to persist snapshot");
        }
    }

    fn save_effects(&mut self) -> Vec<Effect> {
        self.save_with_prompt(true)
    }

    fn save_with_prompt(&mut self, allow_prompt: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.gateway.save(&mut self.state) {
            Ok(MirrorStatus::Written) | Ok(MirrorStatus::Skipped) => {}
            Ok(MirrorStatus::Failed { fallback }) => {
                // One-shot download so the external copy is not lost.
                effects.push(Effect::SaveExportFile {
                    file_name: MIRROR_FILE_NAME.to_string(),
                    contents: fallback,
                });
            }
            Err(error) => {
                warn!(?error, "failed to persist snapshot");
            }
        }
        if allow_prompt && self.wants_mirror_prompt() {
            self.mirror_request = Some(MirrorRequest::ForSave);
            effects.push(Effect::PromptMirrorSave {
                suggested_name: MIRROR_FILE_NAME.to_string(),
            });
        }
        effects
    }

    fn wants_mirror_prompt(&self) -> bool {
        self.config.sync.auto_mirror
            && !self.gateway.mirror_attached()
            && !self.mirror_declined
            && self.mirror_request.is_none()
    }

    fn save_and_render(&mut self) -> Vec<Effect> {
        let mut effects = self.save_effects();
        effects.push(Effect::RenderRequested);
        effects
    }
}

fn cancel_effects(request_ids: Vec<u64>) -> Vec<Effect> {
    request_ids
        .into_iter()
        .map(|request_id| Effect::CancelFetch { request_id })
        .collect()
}

fn message(kind: MessageKind, text: &str) -> Effect {
    Effect::ShowMessage {
        kind,
        text: text.to_string(),
    }
}
