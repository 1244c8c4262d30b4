//! Board state and its mutation operations.
//!
//! Panel ids are minted from a monotonic counter and never reused within a
//! session. Every operation is a total function: missing targets and
//! out-of-range indices are quiet no-ops, reported through the return value
//! so callers can decide whether to persist and re-render.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::url_meta;

/// Identifier of a panel, unique for the lifetime of a session.
pub type PanelId = u64;

/// A single saved link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub favicon: Option<String>,
    #[serde(default)]
    pub timestamp: u64,
}

impl Link {
    /// Build a link from a URL, deriving title, domain and favicon.
    ///
    /// Total even for unparseable URLs: the title falls back to the raw
    /// URL, the domain to [`url_meta::UNKNOWN_DOMAIN`], and the favicon to
    /// `None`.
    pub fn from_url(url: &str, favicon_base: &str, now_ms: u64) -> Self {
        Self {
            url: url.to_string(),
            title: url_meta::extract_title_from_url(url),
            domain: url_meta::domain_of(url),
            favicon: url_meta::favicon_url_for(url, favicon_base),
            timestamp: now_ms,
        }
    }
}

/// A titled, ordered collection of links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Panel {
    pub id: PanelId,
    pub title: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Outcome of a direct link insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLinkOutcome {
    Added,
    /// The panel already holds this URL.
    DuplicateUrl,
    NoSuchPanel,
}

/// The whole board: panels in display order plus view and bookkeeping state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub panels: Vec<Panel>,
    pub panel_counter: u64,
    pub is_compact_view: bool,
    /// RFC 3339 stamp of the most recent persisted snapshot.
    pub last_save_time: Option<String>,
    /// Two-phase deletion target; set by [`request_delete`], consumed by
    /// [`confirm_delete`] or cleared by [`cancel_delete`].
    ///
    /// [`request_delete`]: BoardState::request_delete
    /// [`confirm_delete`]: BoardState::confirm_delete
    /// [`cancel_delete`]: BoardState::cancel_delete
    pub pending_delete: Option<PanelId>,
}

impl BoardState {
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id == id)
    }

    /// Total number of links across all panels.
    pub fn total_links(&self) -> usize {
        self.panels.iter().map(|p| p.links.len()).sum()
    }

    /// Append a new empty panel titled after its id. Returns the id.
    pub fn add_panel(&mut self) -> PanelId {
        self.panel_counter += 1;
        let id = self.panel_counter;
        self.panels.push(Panel {
            id,
            title: format!("Panel {id}"),
            links: Vec::new(),
        });
        id
    }

    /// Create three starter panels on an empty board. Returns true when
    /// panels were created.
    pub fn seed_default_panels(&mut self) -> bool {
        if !self.panels.is_empty() {
            return false;
        }
        for _ in 0..3 {
            self.add_panel();
        }
        true
    }

    /// Record `id` as the pending deletion target. The panel is not touched
    /// until [`confirm_delete`](BoardState::confirm_delete).
    pub fn request_delete(&mut self, id: PanelId) {
        self.pending_delete = Some(id);
    }

    /// Remove the pending panel, if any. Returns the consumed target id.
    pub fn confirm_delete(&mut self) -> Option<PanelId> {
        let target = self.pending_delete.take()?;
        self.panels.retain(|p| p.id != target);
        Some(target)
    }

    /// Clear the pending deletion target without removing anything.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Move the panel at `from` so it ends up at index `to`.
    pub fn move_panel(&mut self, from: usize, to: usize) -> bool {
        if from >= self.panels.len() {
            return false;
        }
        let panel = self.panels.remove(from);
        let to = to.min(self.panels.len());
        self.panels.insert(to, panel);
        true
    }

    /// Assign a new title. Empty titles are allowed; display fallbacks are
    /// the caller's concern.
    pub fn rename_title(&mut self, id: PanelId, title: &str) -> bool {
        match self.panel_mut(id) {
            Some(panel) => {
                panel.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Append `link` to the panel unless the panel already holds its URL.
    pub fn add_link(&mut self, panel_id: PanelId, link: Link) -> AddLinkOutcome {
        let Some(panel) = self.panel_mut(panel_id) else {
            return AddLinkOutcome::NoSuchPanel;
        };
        if panel.links.iter().any(|l| l.url == link.url) {
            return AddLinkOutcome::DuplicateUrl;
        }
        panel.links.push(link);
        AddLinkOutcome::Added
    }

    /// Remove the link at `index`, returning it when the target exists.
    pub fn remove_link(&mut self, panel_id: PanelId, index: usize) -> Option<Link> {
        let panel = self.panel_mut(panel_id)?;
        if index >= panel.links.len() {
            return None;
        }
        Some(panel.links.remove(index))
    }

    /// Move a link to the end of another panel.
    ///
    /// The move is atomic: when either panel or the index is invalid,
    /// nothing changes. Moving may duplicate a URL already present in the
    /// target; uniqueness is enforced for direct adds only, so a move never
    /// drops data.
    pub fn move_link(&mut self, source_id: PanelId, target_id: PanelId, index: usize) -> bool {
        let Some(source_pos) = self.panels.iter().position(|p| p.id == source_id) else {
            return false;
        };
        let Some(target_pos) = self.panels.iter().position(|p| p.id == target_id) else {
            return false;
        };
        if index >= self.panels[source_pos].links.len() {
            return false;
        }
        let link = self.panels[source_pos].links.remove(index);
        self.panels[target_pos].links.push(link);
        true
    }

    /// Replace a link's title and URL, re-deriving domain and favicon.
    ///
    /// Returns `Ok(false)` when the target link no longer exists; invalid
    /// input is an error and leaves the board untouched.
    pub fn edit_link(
        &mut self,
        panel_id: PanelId,
        index: usize,
        title: &str,
        url: &str,
        favicon_base: &str,
    ) -> Result<bool> {
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() {
            return Err(CoreError::Required("title"));
        }
        if url.is_empty() {
            return Err(CoreError::Required("url"));
        }
        if !url_meta::is_valid_url(url) {
            return Err(CoreError::InvalidUrl(url.to_string()));
        }

        let Some(panel) = self.panel_mut(panel_id) else {
            return Ok(false);
        };
        let Some(link) = panel.links.get_mut(index) else {
            return Ok(false);
        };
        link.title = title.to_string();
        link.url = url.to_string();
        link.domain = url_meta::domain_of(url);
        link.favicon = url_meta::favicon_url_for(url, favicon_base);
        Ok(true)
    }

    /// Set the title of the first link in `panel_id` matching `url`.
    ///
    /// Used by background metadata resolution, which keys its work by URL
    /// so a fetched title is dropped when the link is gone.
    pub fn update_link_title(&mut self, panel_id: PanelId, url: &str, title: &str) -> bool {
        let Some(panel) = self.panel_mut(panel_id) else {
            return false;
        };
        match panel.links.iter_mut().find(|l| l.url == url) {
            Some(link) => {
                link.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Flip the compact view flag, returning the new value.
    pub fn toggle_compact_view(&mut self) -> bool {
        self.is_compact_view = !self.is_compact_view;
        self.is_compact_view
    }
}
