//! Snapshot, export and import wire documents.
//!
//! The on-disk field names are camelCase so existing `droplinks-data`
//! snapshots and `.droplinks` files keep working. Loading is lenient
//! (every field defaults), while importing requires at least a `panels`
//! array and recomputes the panel counter rather than trusting the
//! payload's.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::model::{BoardState, Panel};

/// Key the board snapshot is stored under.
pub const STORAGE_KEY: &str = "droplinks-data";

/// Schema version written into export and mirror documents.
pub const EXPORT_VERSION: &str = "1.0";

/// Suggested file name for the external mirror file.
pub const MIRROR_FILE_NAME: &str = ".droplinks";

/// The persisted board snapshot.
///
/// `is_compact_view` stays an `Option` on the wire so imports can tell
/// "absent" (keep the current view) from an explicit `false`; saves always
/// write `Some`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    #[serde(default)]
    pub panels: Vec<Panel>,
    #[serde(default)]
    pub panel_counter: u64,
    #[serde(default)]
    pub is_compact_view: Option<bool>,
    #[serde(default)]
    pub last_save_time: Option<String>,
}

impl SnapshotDocument {
    pub fn from_state(state: &BoardState) -> Self {
        Self {
            panels: state.panels.clone(),
            panel_counter: state.panel_counter,
            is_compact_view: Some(state.is_compact_view),
            last_save_time: state.last_save_time.clone(),
        }
    }

    /// Turn a loaded snapshot into board state.
    ///
    /// The counter is raised to the highest panel id when a hand-edited
    /// file understates it, so freshly minted ids stay unique.
    pub fn into_state(self) -> BoardState {
        let max_id = self.panels.iter().map(|p| p.id).max().unwrap_or(0);
        BoardState {
            panel_counter: self.panel_counter.max(max_id),
            panels: self.panels,
            is_compact_view: self.is_compact_view.unwrap_or(false),
            last_save_time: self.last_save_time,
            pending_delete: None,
        }
    }
}

/// Export and mirror document: the full snapshot plus provenance fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(flatten)]
    pub snapshot: SnapshotDocument,
    pub export_date: String,
    pub version: String,
}

impl ExportDocument {
    pub fn new(state: &BoardState, export_date_iso: String) -> Self {
        Self {
            snapshot: SnapshotDocument::from_state(state),
            export_date: export_date_iso,
            version: EXPORT_VERSION.to_string(),
        }
    }
}

/// Parse an import payload.
///
/// Mirrors the historical contract: the payload must be JSON carrying a
/// `panels` array. Everything else is optional, so legacy exports without
/// `panelCounter` or `isCompactView` import cleanly.
pub fn parse_import(json: &str) -> Result<SnapshotDocument> {
    let value: Value = serde_json::from_str(json)?;
    if !value.get("panels").map(Value::is_array).unwrap_or(false) {
        return Err(CoreError::SnapshotShape("panels must be an array".into()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Apply an import wholesale: panels replace the current set and the
/// counter is recomputed from the surviving ids. The saved timestamp and
/// view flag are adopted only when the payload carries them.
pub fn apply_import(state: &mut BoardState, doc: SnapshotDocument) {
    state.panels = doc.panels;
    state.panel_counter = state.panels.iter().map(|p| p.id).max().unwrap_or(0);
    if doc.last_save_time.is_some() {
        state.last_save_time = doc.last_save_time;
    }
    if let Some(compact) = doc.is_compact_view {
        state.is_compact_view = compact;
    }
}

/// Dated export file name, e.g. `droplinks-export-2026-08-25.json`.
pub fn export_file_name(now_iso: &str) -> String {
    let date = now_iso.split('T').next().unwrap_or(now_iso);
    format!("droplinks-export-{date}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Link;
    use crate::url_meta::DEFAULT_FAVICON_BASE;

    fn sample_state() -> BoardState {
        let mut state = BoardState::default();
        let a = state.add_panel();
        state.add_panel();
        state.add_link(a, Link::from_url("https://example.com/x", DEFAULT_FAVICON_BASE, 42));
        state.rename_title(a, "Reading");
        state
    }

    #[test]
    fn test_snapshot_uses_camel_case_names() {
        let doc = SnapshotDocument::from_state(&sample_state());
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"panelCounter\""));
        assert!(json.contains("\"isCompactView\""));
        assert!(json.contains("\"lastSaveTime\""));
    }

    #[test]
    fn test_export_import_round_trip() {
        let state = sample_state();
        let doc = ExportDocument::new(&state, "2026-08-25T10:00:00Z".to_string());
        let json = serde_json::to_string_pretty(&doc).unwrap();

        let mut restored = BoardState::default();
        apply_import(&mut restored, parse_import(&json).unwrap());

        assert_eq!(restored.panels, state.panels);
        assert_eq!(restored.panel_counter, 2);
    }

    #[test]
    fn test_import_rejects_non_array_panels() {
        assert!(matches!(
            parse_import(r#"{"panels":"not an array"}"#),
            Err(CoreError::SnapshotShape(_))
        ));
        assert!(matches!(
            parse_import(r#"{"version":"1.0"}"#),
            Err(CoreError::SnapshotShape(_))
        ));
        assert!(matches!(
            parse_import("not json"),
            Err(CoreError::MalformedSnapshot(_))
        ));
    }

    #[test]
    fn test_import_accepts_legacy_shape() {
        // Old exports carried only panels plus provenance fields.
        let json = r#"{
            "panels": [
                {"id": 7, "title": "Old", "links": [
                    {"url": "https://a.example", "title": "A", "domain": "a.example", "favicon": null}
                ]}
            ],
            "exportDate": "2024-01-01T00:00:00.000Z",
            "version": "1.0"
        }"#;

        let mut state = sample_state();
        state.toggle_compact_view();
        apply_import(&mut state, parse_import(json).unwrap());

        assert_eq!(state.panels.len(), 1);
        assert_eq!(state.panel_counter, 7);
        // Absent view flag keeps the current setting.
        assert!(state.is_compact_view);
        assert_eq!(state.panels[0].links[0].timestamp, 0);
    }

    #[test]
    fn test_import_recomputes_counter_ignoring_payload() {
        let json = r#"{"panels":[{"id":3,"title":"P","links":[]}],"panelCounter":100}"#;
        let mut state = BoardState::default();
        apply_import(&mut state, parse_import(json).unwrap());
        assert_eq!(state.panel_counter, 3);
    }

    #[test]
    fn test_into_state_raises_understated_counter() {
        let doc: SnapshotDocument =
            serde_json::from_str(r#"{"panels":[{"id":9,"title":"P","links":[]}],"panelCounter":2}"#)
                .unwrap();
        let state = doc.into_state();
        assert_eq!(state.panel_counter, 9);
    }

    #[test]
    fn test_export_file_name_uses_date_part() {
        assert_eq!(
            export_file_name("2026-08-25T10:30:00Z"),
            "droplinks-export-2026-08-25.json"
        );
    }
}
