//! Snapshot persistence gateway.
//!
//! Owns the local key-value snapshot, the optional mirror file and the
//! export/import documents. Saving stamps `lastSaveTime` and then writes
//! the mirror when one is attached; importing persists locally only, so
//! a sync can never loop through the mirror it just read.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use droplinks_core::snapshot::{self, ExportDocument, SnapshotDocument, STORAGE_KEY};
use droplinks_core::BoardState;
use droplinks_io::{Clock, KvStore, MirrorFile};

/// What happened to the mirror during a save.
#[derive(Debug, PartialEq)]
pub enum MirrorStatus {
    /// No mirror attached; only the local snapshot was written.
    Skipped,
    Written,
    /// The write failed and the path was dropped. Carries the document
    /// so the caller can offer a one-shot fallback download.
    Failed { fallback: String },
}

/// How a reconcile against an external document ended.
#[derive(Debug, PartialEq)]
pub enum ReconcileOutcome {
    /// The external document was strictly newer and replaced the board.
    Imported,
    /// Local data is as new or newer; nothing changed.
    UpToDate,
    /// The document could not be used.
    Invalid(String),
}

pub struct SnapshotGateway {
    store: Box<dyn KvStore>,
    clock: Arc<dyn Clock>,
    mirror: MirrorFile,
}

impl SnapshotGateway {
    pub fn new(store: Box<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            mirror: MirrorFile::new(),
        }
    }

    pub fn mirror_attached(&self) -> bool {
        self.mirror.is_attached()
    }

    pub fn attach_mirror(&mut self, path: PathBuf) {
        info!(?path, "mirror file attached");
        self.mirror.attach(path);
    }

    pub fn detach_mirror(&mut self) {
        self.mirror.detach();
    }

    pub fn read_mirror(&self) -> Result<String> {
        self.mirror.read()
    }

    /// Hydrate board state. Absent or malformed data yields a default
    /// board rather than an error.
    pub fn load(&self) -> BoardState {
        match self.store.get(STORAGE_KEY) {
            Some(raw) => match serde_json::from_str::<SnapshotDocument>(&raw) {
                Ok(doc) => doc.into_state(),
                Err(error) => {
                    warn!(?error, "failed to parse stored snapshot, starting fresh");
                    BoardState::default()
                }
            },
            None => BoardState::default(),
        }
    }

    /// Stamp `state` with the current time and persist it, mirroring
    /// when a mirror file is attached.
    pub fn save(&mut self, state: &mut BoardState) -> Result<MirrorStatus> {
        state.last_save_time = Some(self.clock.now_iso());
        self.persist_local(state)?;
        Ok(self.write_mirror(state))
    }

    fn persist_local(&mut self, state: &BoardState) -> Result<()> {
        let doc = SnapshotDocument::from_state(state);
        let json = serde_json::to_string_pretty(&doc)?;
        self.store.set(STORAGE_KEY, &json)
    }

    fn write_mirror(&mut self, state: &BoardState) -> MirrorStatus {
        if !self.mirror.is_attached() {
            return MirrorStatus::Skipped;
        }
        let doc = ExportDocument::new(state, self.clock.now_iso());
        let contents = match serde_json::to_string_pretty(&doc) {
            Ok(contents) => contents,
            Err(error) => {
                warn!(?error, "failed to serialize mirror document");
                return MirrorStatus::Skipped;
            }
        };
        match self.mirror.write(&contents) {
            Ok(()) => MirrorStatus::Written,
            Err(error) => {
                warn!(
                    ?error,
                    path = ?self.mirror.path(),
                    "mirror write failed, dropping the remembered path"
                );
                self.mirror.detach();
                MirrorStatus::Failed { fallback: contents }
            }
        }
    }

    /// Build the export document and its dated file name.
    pub fn export(&self, state: &BoardState) -> Result<(String, String)> {
        let now_iso = self.clock.now_iso();
        let doc = ExportDocument::new(state, now_iso.clone());
        let contents = serde_json::to_string_pretty(&doc)?;
        Ok((snapshot::export_file_name(&now_iso), contents))
    }

    /// Strict import. On success the panels are replaced, the counter
    /// recomputed and the result persisted locally. The mirror is left
    /// alone, and the payload's own saved timestamp is kept so a later
    /// sync can still compare against the file it came from.
    pub fn import(&mut self, state: &mut BoardState, json: &str) -> droplinks_core::Result<()> {
        let doc = snapshot::parse_import(json)?;
        snapshot::apply_import(state, doc);
        if let Err(error) = self.persist_local(state) {
            warn!(?error, "failed to persist imported snapshot");
        }
        Ok(())
    }

    /// Last-write-wins reconcile against an external board document.
    ///
    /// The external document wins only when its saved timestamp is
    /// strictly newer than ours; a missing or unreadable external stamp
    /// never wins, while missing local state counts as the epoch.
    pub fn reconcile(&mut self, state: &mut BoardState, contents: &str) -> ReconcileOutcome {
        let value: Value = match serde_json::from_str(contents) {
            Ok(value) => value,
            Err(error) => return ReconcileOutcome::Invalid(error.to_string()),
        };
        let file_time = value
            .get("lastSaveTime")
            .and_then(Value::as_str)
            .and_then(parse_rfc3339);
        let Some(file_time) = file_time else {
            debug!("external file carries no usable save stamp");
            return ReconcileOutcome::UpToDate;
        };
        let local_time = state
            .last_save_time
            .as_deref()
            .and_then(parse_rfc3339)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        if file_time > local_time {
            info!("external file is newer, importing");
            match self.import(state, contents) {
                Ok(()) => ReconcileOutcome::Imported,
                Err(error) => ReconcileOutcome::Invalid(error.to_string()),
            }
        } else {
            debug!("local data is up to date");
            ReconcileOutcome::UpToDate
        }
    }
}

fn parse_rfc3339(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339).ok()
}
