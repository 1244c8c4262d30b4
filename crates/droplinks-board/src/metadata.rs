//! Bookkeeping for in-flight link metadata fetches.
//!
//! Fetches run on the host side; this tracker only remembers which
//! (panel, url) pair each request id belongs to, so a completed fetch
//! can be applied to the right link, follow it across panel moves, and
//! be cancelled when the link disappears.

use std::collections::HashMap;

use droplinks_core::PanelId;

#[derive(Debug, Clone, PartialEq)]
struct PendingFetch {
    panel_id: PanelId,
    url: String,
}

/// Maps request ids handed to the fetch service back to links.
#[derive(Debug, Default)]
pub struct MetadataTracker {
    next_request_id: u64,
    pending: HashMap<u64, PendingFetch>,
}

impl MetadataTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetch for a link. Returns the request id to pass to
    /// the fetch service.
    pub fn track(&mut self, panel_id: PanelId, url: &str) -> u64 {
        self.next_request_id += 1;
        self.pending.insert(
            self.next_request_id,
            PendingFetch {
                panel_id,
                url: url.to_string(),
            },
        );
        self.next_request_id
    }

    /// Resolve a completed fetch to its link, forgetting the entry.
    /// `None` means the fetch was cancelled in the meantime.
    pub fn complete(&mut self, request_id: u64) -> Option<(PanelId, String)> {
        self.pending
            .remove(&request_id)
            .map(|p| (p.panel_id, p.url))
    }

    /// Keep a pending fetch pointed at a link that moved between panels.
    pub fn rekey_link(&mut self, from: PanelId, url: &str, to: PanelId) {
        for entry in self.pending.values_mut() {
            if entry.panel_id == from && entry.url == url {
                entry.panel_id = to;
            }
        }
    }

    /// Drop the pending fetch for one link, returning its request id.
    pub fn cancel_link(&mut self, panel_id: PanelId, url: &str) -> Option<u64> {
        let id = self
            .pending
            .iter()
            .find(|(_, p)| p.panel_id == panel_id && p.url == url)
            .map(|(id, _)| *id)?;
        self.pending.remove(&id);
        Some(id)
    }

    /// Drop every pending fetch for a panel, returning their request ids.
    pub fn cancel_panel(&mut self, panel_id: PanelId) -> Vec<u64> {
        let ids: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, p)| p.panel_id == panel_id)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.pending.remove(id);
        }
        ids
    }

    /// Drop everything, e.g. after an import replaced every panel.
    pub fn cancel_all(&mut self) -> Vec<u64> {
        self.pending.drain().map(|(id, _)| id).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_and_complete() {
        let mut t = MetadataTracker::new();
        let id = t.track(1, "https://example.com");
        assert_eq!(t.pending_len(), 1);
        assert_eq!(t.complete(id), Some((1, "https://example.com".to_string())));
        assert_eq!(t.complete(id), None);
        assert_eq!(t.pending_len(), 0);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let mut t = MetadataTracker::new();
        let a = t.track(1, "https://a.example");
        let b = t.track(1, "https://b.example");
        assert_ne!(a, b);
    }

    #[test]
    fn test_cancel_link_targets_the_right_entry() {
        let mut t = MetadataTracker::new();
        let a = t.track(1, "https://a.example");
        let b = t.track(2, "https://a.example");
        assert_eq!(t.cancel_link(2, "https://a.example"), Some(b));
        assert_eq!(t.complete(a), Some((1, "https://a.example".to_string())));
        assert_eq!(t.cancel_link(2, "https://a.example"), None);
    }

    #[test]
    fn test_cancel_panel_sweeps_all_entries() {
        let mut t = MetadataTracker::new();
        t.track(1, "https://a.example");
        t.track(1, "https://b.example");
        let kept = t.track(2, "https://c.example");
        let mut cancelled = t.cancel_panel(1);
        cancelled.sort_unstable();
        assert_eq!(cancelled.len(), 2);
        assert_eq!(t.pending_len(), 1);
        assert!(t.complete(kept).is_some());
    }

    #[test]
    fn test_rekey_follows_a_moved_link() {
        let mut t = MetadataTracker::new();
        let id = t.track(1, "https://a.example");
        t.rekey_link(1, "https://a.example", 5);
        assert_eq!(t.complete(id), Some((5, "https://a.example".to_string())));
    }

    #[test]
    fn test_cancel_all_drains() {
        let mut t = MetadataTracker::new();
        t.track(1, "https://a.example");
        t.track(2, "https://b.example");
        assert_eq!(t.cancel_all().len(), 2);
        assert_eq!(t.pending_len(), 0);
    }
}
