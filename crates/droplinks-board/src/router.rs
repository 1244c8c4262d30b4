//! Translation of raw pointer, drag and paste events into board commands.
//!
//! The router is a small state machine over already hit-tested events.
//! It owns exactly one ambiguity: a button press on a link row can turn
//! out to be a click (open), a drag (move between panels) or a long
//! press (edit), and only time and motion decide which.
//!
//! ```text
//!                 move > threshold
//!   Pressed ────────────────────────► Dragging ──(release over
//!      │                                            other panel)──► MoveLink
//!      │  held >= long_press_ms
//!      ├────────────────────────────► LongPressFired ──► BeginEditLink
//!      │
//!      │  release before either
//!      └────────────────────────────► OpenLink
//! ```
//!
//! Native drag-and-drop is routed separately: panels reorder through it,
//! and external payloads (dragged URLs, exported board files) arrive
//! through it. Link rows never start a native drag, the press machine
//! owns them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use droplinks_core::{url_meta, PanelId};

use crate::command::Command;

/// Pointer position in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: PointerPos) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// What the host resolved to be under a pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HitTarget {
    /// Panel background or header. `index` is the display position.
    Panel { panel_id: PanelId, index: usize },
    /// A link row inside a panel.
    Link { panel_id: PanelId, link_index: usize },
    /// The remove affordance on a link row.
    LinkDeleteButton { panel_id: PanelId, link_index: usize },
    /// The delete affordance in a panel header.
    PanelDeleteButton { panel_id: PanelId },
    Outside,
}

impl HitTarget {
    /// Panel containing this target, if any.
    fn containing_panel(&self) -> Option<PanelId> {
        match self {
            HitTarget::Panel { panel_id, .. }
            | HitTarget::Link { panel_id, .. }
            | HitTarget::LinkDeleteButton { panel_id, .. }
            | HitTarget::PanelDeleteButton { panel_id } => Some(*panel_id),
            HitTarget::Outside => None,
        }
    }
}

/// Payload of a completed native drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DropPayload {
    /// Plain text, e.g. a URL dragged out of another window.
    Text(String),
    /// A file the host already read into memory.
    File {
        name: String,
        media_type: String,
        contents: String,
    },
}

/// A raw input event, hit-tested and timestamped by the host.
///
/// Timestamps are milliseconds on any monotonic-enough host clock; the
/// router only ever compares them to each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawInput {
    PointerDown {
        target: HitTarget,
        pos: PointerPos,
        time_ms: u64,
    },
    PointerMove {
        over: HitTarget,
        pos: PointerPos,
        time_ms: u64,
    },
    PointerUp {
        over: HitTarget,
        pos: PointerPos,
        time_ms: u64,
    },
    /// Periodic tick so a long press fires without further motion.
    Tick { time_ms: u64 },
    /// A native drag started on `origin`.
    NativeDragStart { origin: HitTarget, time_ms: u64 },
    NativeDragEnd { time_ms: u64 },
    /// A native drop landed on `target`.
    NativeDrop {
        target: HitTarget,
        payload: DropPayload,
        time_ms: u64,
    },
    /// Text pasted. `editable_target` is true when focus sat in a text
    /// field, which the board must not intercept.
    PasteText {
        text: String,
        editable_target: bool,
        time_ms: u64,
    },
    /// The explicit read-the-clipboard shortcut.
    ClipboardShortcut { time_ms: u64 },
}

/// Press-disambiguation state.
#[derive(Debug, Clone, PartialEq)]
enum PressState {
    Idle,
    /// Button went down on a link; outcome undecided.
    Pressed {
        panel_id: PanelId,
        link_index: usize,
        start: PointerPos,
        down_ms: u64,
    },
    /// Motion crossed the threshold; the link is being dragged.
    Dragging {
        source_panel: PanelId,
        link_index: usize,
    },
    /// The long press fired; the rest of this press is ignored.
    LongPressFired,
    /// Press started on a delete affordance.
    ButtonHeld { target: HitTarget },
}

/// Gesture thresholds, usually lifted from
/// [`droplinks_config::GestureConfig`].
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub long_press_ms: u64,
    pub drag_threshold_px: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 800,
            drag_threshold_px: 5.0,
        }
    }
}

/// The input state machine. One per board.
#[derive(Debug)]
pub struct InteractionRouter {
    config: RouterConfig,
    press: PressState,
    /// Display index the current native panel drag started from.
    panel_drag: Option<usize>,
}

impl InteractionRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            press: PressState::Idle,
            panel_drag: None,
        }
    }

    /// Advance the machine with one event, emitting any commands it
    /// resolved to.
    pub fn process(&mut self, input: RawInput) -> Vec<Command> {
        match input {
            RawInput::PointerDown { target, pos, time_ms } => {
                self.on_pointer_down(target, pos, time_ms)
            }
            RawInput::PointerMove { pos, time_ms, .. } => self.on_pointer_move(pos, time_ms),
            RawInput::PointerUp { over, time_ms, .. } => self.on_pointer_up(over, time_ms),
            RawInput::Tick { time_ms } => self.fire_due_long_press(time_ms),
            RawInput::NativeDragStart { origin, .. } => {
                self.on_native_drag_start(origin);
                Vec::new()
            }
            RawInput::NativeDragEnd { .. } => {
                self.panel_drag = None;
                Vec::new()
            }
            RawInput::NativeDrop { target, payload, .. } => self.on_native_drop(target, payload),
            RawInput::PasteText {
                text,
                editable_target,
                ..
            } => {
                if editable_target {
                    Vec::new()
                } else {
                    vec![Command::PasteText { text }]
                }
            }
            RawInput::ClipboardShortcut { .. } => vec![Command::ReadClipboard],
        }
    }

    fn on_pointer_down(&mut self, target: HitTarget, pos: PointerPos, time_ms: u64) -> Vec<Command> {
        // A stray second press just restarts tracking.
        self.press = match target {
            HitTarget::Link {
                panel_id,
                link_index,
            } => PressState::Pressed {
                panel_id,
                link_index,
                start: pos,
                down_ms: time_ms,
            },
            HitTarget::LinkDeleteButton { .. } | HitTarget::PanelDeleteButton { .. } => {
                PressState::ButtonHeld { target }
            }
            _ => PressState::Idle,
        };
        Vec::new()
    }

    fn on_pointer_move(&mut self, pos: PointerPos, time_ms: u64) -> Vec<Command> {
        // The deadline wins over motion that arrives in the same frame.
        let out = self.fire_due_long_press(time_ms);
        if let PressState::Pressed {
            panel_id,
            link_index,
            start,
            ..
        } = self.press
        {
            if start.distance(pos) > self.config.drag_threshold_px {
                self.press = PressState::Dragging {
                    source_panel: panel_id,
                    link_index,
                };
            }
        }
        out
    }

    fn on_pointer_up(&mut self, over: HitTarget, time_ms: u64) -> Vec<Command> {
        let mut out = self.fire_due_long_press(time_ms);
        match std::mem::replace(&mut self.press, PressState::Idle) {
            PressState::Pressed {
                panel_id,
                link_index,
                ..
            } => out.push(Command::OpenLink {
                panel_id,
                link_index,
            }),
            PressState::Dragging {
                source_panel,
                link_index,
            } => {
                // Dropping back onto the source panel is a no-op.
                if let Some(target_panel) = over.containing_panel() {
                    if target_panel != source_panel {
                        out.push(Command::MoveLink {
                            source_panel,
                            target_panel,
                            link_index,
                        });
                    }
                }
            }
            PressState::ButtonHeld { target } => {
                // Affordances trigger only when released on themselves.
                if over == target {
                    match target {
                        HitTarget::LinkDeleteButton {
                            panel_id,
                            link_index,
                        } => out.push(Command::RemoveLink {
                            panel_id,
                            link_index,
                        }),
                        HitTarget::PanelDeleteButton { panel_id } => {
                            out.push(Command::RequestDeletePanel { panel_id })
                        }
                        _ => {}
                    }
                }
            }
            PressState::LongPressFired | PressState::Idle => {}
        }
        out
    }

    fn fire_due_long_press(&mut self, now_ms: u64) -> Vec<Command> {
        if let PressState::Pressed {
            panel_id,
            link_index,
            down_ms,
            ..
        } = self.press
        {
            if now_ms.saturating_sub(down_ms) >= self.config.long_press_ms {
                self.press = PressState::LongPressFired;
                return vec![Command::BeginEditLink {
                    panel_id,
                    link_index,
                }];
            }
        }
        Vec::new()
    }

    fn on_native_drag_start(&mut self, origin: HitTarget) {
        // Only panels travel through native drag. A drag that starts on
        // a link row is suppressed so it cannot shadow the press machine.
        self.panel_drag = match origin {
            HitTarget::Panel { index, .. } => Some(index),
            _ => None,
        };
    }

    fn on_native_drop(&mut self, target: HitTarget, payload: DropPayload) -> Vec<Command> {
        // An in-flight panel drag claims the drop outright.
        if let Some(from_index) = self.panel_drag.take() {
            if let HitTarget::Panel {
                index: to_index, ..
            } = target
            {
                if to_index != from_index {
                    return vec![Command::MovePanel {
                        from_index,
                        to_index,
                    }];
                }
            }
            return Vec::new();
        }
        match payload {
            DropPayload::Text(text) => {
                let text = text.trim();
                if let Some(panel_id) = target.containing_panel() {
                    if url_meta::is_valid_url(text) {
                        return vec![Command::AddLink {
                            panel_id,
                            url: text.to_string(),
                        }];
                    }
                }
                debug!("ignoring dropped text that is not a URL over a panel");
                Vec::new()
            }
            DropPayload::File {
                name,
                media_type,
                contents,
            } => {
                if name.ends_with(".droplinks")
                    || name.ends_with(".json")
                    || media_type == "application/json"
                {
                    vec![Command::ImportText { json: contents }]
                } else {
                    debug!(%name, %media_type, "ignoring dropped file");
                    Vec::new()
                }
            }
        }
    }
}

impl Default for InteractionRouter {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> InteractionRouter {
        InteractionRouter::default()
    }

    fn link(panel_id: PanelId, link_index: usize) -> HitTarget {
        HitTarget::Link {
            panel_id,
            link_index,
        }
    }

    fn panel(panel_id: PanelId, index: usize) -> HitTarget {
        HitTarget::Panel { panel_id, index }
    }

    fn pos(x: f32, y: f32) -> PointerPos {
        PointerPos::new(x, y)
    }

    fn down(r: &mut InteractionRouter, target: HitTarget, p: PointerPos, t: u64) -> Vec<Command> {
        r.process(RawInput::PointerDown {
            target,
            pos: p,
            time_ms: t,
        })
    }

    fn mv(r: &mut InteractionRouter, over: HitTarget, p: PointerPos, t: u64) -> Vec<Command> {
        r.process(RawInput::PointerMove {
            over,
            pos: p,
            time_ms: t,
        })
    }

    fn up(r: &mut InteractionRouter, over: HitTarget, p: PointerPos, t: u64) -> Vec<Command> {
        r.process(RawInput::PointerUp {
            over,
            pos: p,
            time_ms: t,
        })
    }

    #[test]
    fn test_quick_release_is_a_click() {
        let mut r = router();
        assert!(down(&mut r, link(1, 0), pos(10.0, 10.0), 0).is_empty());
        let cmds = up(&mut r, link(1, 0), pos(11.0, 10.0), 150);
        assert_eq!(
            cmds,
            vec![Command::OpenLink {
                panel_id: 1,
                link_index: 0
            }]
        );
    }

    #[test]
    fn test_jitter_below_threshold_still_clicks() {
        let mut r = router();
        down(&mut r, link(1, 2), pos(10.0, 10.0), 0);
        assert!(mv(&mut r, link(1, 2), pos(13.0, 12.0), 80).is_empty());
        let cmds = up(&mut r, link(1, 2), pos(13.0, 12.0), 160);
        assert_eq!(
            cmds,
            vec![Command::OpenLink {
                panel_id: 1,
                link_index: 2
            }]
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut r = router();
        down(&mut r, link(1, 0), pos(10.0, 10.0), 0);
        // Exactly the threshold keeps the press a press.
        mv(&mut r, link(1, 0), pos(15.0, 10.0), 50);
        let cmds = up(&mut r, link(1, 0), pos(15.0, 10.0), 100);
        assert_eq!(
            cmds,
            vec![Command::OpenLink {
                panel_id: 1,
                link_index: 0
            }]
        );
    }

    #[test]
    fn test_drag_to_other_panel_moves_link() {
        let mut r = router();
        down(&mut r, link(1, 0), pos(10.0, 10.0), 0);
        assert!(mv(&mut r, link(1, 0), pos(40.0, 10.0), 60).is_empty());
        let cmds = up(&mut r, panel(2, 1), pos(200.0, 10.0), 300);
        assert_eq!(
            cmds,
            vec![Command::MoveLink {
                source_panel: 1,
                target_panel: 2,
                link_index: 0
            }]
        );
    }

    #[test]
    fn test_drag_back_to_source_panel_is_noop() {
        let mut r = router();
        down(&mut r, link(1, 0), pos(10.0, 10.0), 0);
        mv(&mut r, link(1, 0), pos(40.0, 10.0), 60);
        assert!(up(&mut r, panel(1, 0), pos(40.0, 40.0), 300).is_empty());
    }

    #[test]
    fn test_drag_released_outside_is_noop() {
        let mut r = router();
        down(&mut r, link(1, 0), pos(10.0, 10.0), 0);
        mv(&mut r, HitTarget::Outside, pos(400.0, 400.0), 60);
        assert!(up(&mut r, HitTarget::Outside, pos(400.0, 400.0), 120).is_empty());
    }

    #[test]
    fn test_long_press_fires_on_tick() {
        let mut r = router();
        down(&mut r, link(3, 1), pos(10.0, 10.0), 1_000);
        assert!(r.process(RawInput::Tick { time_ms: 1_700 }).is_empty());
        let cmds = r.process(RawInput::Tick { time_ms: 1_800 });
        assert_eq!(
            cmds,
            vec![Command::BeginEditLink {
                panel_id: 3,
                link_index: 1
            }]
        );
        // The release that ends the press does nothing further.
        assert!(up(&mut r, link(3, 1), pos(10.0, 10.0), 1_900).is_empty());
    }

    #[test]
    fn test_long_press_fires_on_late_release() {
        let mut r = router();
        down(&mut r, link(1, 0), pos(10.0, 10.0), 0);
        let cmds = up(&mut r, link(1, 0), pos(10.0, 10.0), 900);
        assert_eq!(
            cmds,
            vec![Command::BeginEditLink {
                panel_id: 1,
                link_index: 0
            }]
        );
    }

    #[test]
    fn test_drag_cancels_long_press() {
        let mut r = router();
        down(&mut r, link(1, 0), pos(10.0, 10.0), 0);
        mv(&mut r, link(1, 0), pos(60.0, 10.0), 100);
        assert!(r.process(RawInput::Tick { time_ms: 2_000 }).is_empty());
        let cmds = up(&mut r, panel(2, 1), pos(200.0, 10.0), 2_100);
        assert_eq!(
            cmds,
            vec![Command::MoveLink {
                source_panel: 1,
                target_panel: 2,
                link_index: 0
            }]
        );
    }

    #[test]
    fn test_link_delete_button_release_on_itself() {
        let mut r = router();
        let btn = HitTarget::LinkDeleteButton {
            panel_id: 1,
            link_index: 2,
        };
        down(&mut r, btn.clone(), pos(10.0, 10.0), 0);
        let cmds = up(&mut r, btn, pos(10.0, 10.0), 100);
        assert_eq!(
            cmds,
            vec![Command::RemoveLink {
                panel_id: 1,
                link_index: 2
            }]
        );
    }

    #[test]
    fn test_delete_button_release_elsewhere_is_noop() {
        let mut r = router();
        let btn = HitTarget::LinkDeleteButton {
            panel_id: 1,
            link_index: 2,
        };
        down(&mut r, btn, pos(10.0, 10.0), 0);
        assert!(up(&mut r, HitTarget::Outside, pos(90.0, 90.0), 100).is_empty());
    }

    #[test]
    fn test_panel_delete_button_requests_deletion() {
        let mut r = router();
        let btn = HitTarget::PanelDeleteButton { panel_id: 4 };
        down(&mut r, btn.clone(), pos(10.0, 10.0), 0);
        let cmds = up(&mut r, btn, pos(10.0, 10.0), 100);
        assert_eq!(cmds, vec![Command::RequestDeletePanel { panel_id: 4 }]);
    }

    #[test]
    fn test_native_panel_drag_reorders() {
        let mut r = router();
        r.process(RawInput::NativeDragStart {
            origin: panel(1, 0),
            time_ms: 0,
        });
        let cmds = r.process(RawInput::NativeDrop {
            target: panel(3, 2),
            payload: DropPayload::Text(String::new()),
            time_ms: 100,
        });
        assert_eq!(
            cmds,
            vec![Command::MovePanel {
                from_index: 0,
                to_index: 2
            }]
        );
    }

    #[test]
    fn test_panel_dropped_on_itself_is_noop() {
        let mut r = router();
        r.process(RawInput::NativeDragStart {
            origin: panel(1, 0),
            time_ms: 0,
        });
        let cmds = r.process(RawInput::NativeDrop {
            target: panel(1, 0),
            payload: DropPayload::Text(String::new()),
            time_ms: 100,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_panel_drag_ended_without_drop_clears_state() {
        let mut r = router();
        r.process(RawInput::NativeDragStart {
            origin: panel(1, 0),
            time_ms: 0,
        });
        r.process(RawInput::NativeDragEnd { time_ms: 50 });
        // The next text drop is treated as external content again.
        let cmds = r.process(RawInput::NativeDrop {
            target: panel(2, 1),
            payload: DropPayload::Text("https://example.com".into()),
            time_ms: 100,
        });
        assert_eq!(
            cmds,
            vec![Command::AddLink {
                panel_id: 2,
                url: "https://example.com".into()
            }]
        );
    }

    #[test]
    fn test_native_drag_from_link_row_is_suppressed() {
        let mut r = router();
        r.process(RawInput::NativeDragStart {
            origin: link(1, 0),
            time_ms: 0,
        });
        let cmds = r.process(RawInput::NativeDrop {
            target: panel(2, 1),
            payload: DropPayload::Text(String::new()),
            time_ms: 100,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_text_drop_adds_link() {
        let mut r = router();
        let cmds = r.process(RawInput::NativeDrop {
            target: link(2, 0),
            payload: DropPayload::Text("  https://example.com/docs \n".into()),
            time_ms: 0,
        });
        assert_eq!(
            cmds,
            vec![Command::AddLink {
                panel_id: 2,
                url: "https://example.com/docs".into()
            }]
        );
    }

    #[test]
    fn test_non_url_text_drop_ignored() {
        let mut r = router();
        let cmds = r.process(RawInput::NativeDrop {
            target: panel(2, 1),
            payload: DropPayload::Text("just some words".into()),
            time_ms: 0,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_text_drop_outside_panels_ignored() {
        let mut r = router();
        let cmds = r.process(RawInput::NativeDrop {
            target: HitTarget::Outside,
            payload: DropPayload::Text("https://example.com".into()),
            time_ms: 0,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_board_file_drops_import() {
        let mut r = router();
        for (name, media_type) in [
            ("board.droplinks", "application/octet-stream"),
            ("backup.json", "text/plain"),
            ("data.txt", "application/json"),
        ] {
            let cmds = r.process(RawInput::NativeDrop {
                target: HitTarget::Outside,
                payload: DropPayload::File {
                    name: name.into(),
                    media_type: media_type.into(),
                    contents: "{}".into(),
                },
                time_ms: 0,
            });
            assert_eq!(
                cmds,
                vec![Command::ImportText { json: "{}".into() }],
                "{name} should import"
            );
        }
    }

    #[test]
    fn test_other_file_drops_ignored() {
        let mut r = router();
        let cmds = r.process(RawInput::NativeDrop {
            target: panel(1, 0),
            payload: DropPayload::File {
                name: "photo.png".into(),
                media_type: "image/png".into(),
                contents: String::new(),
            },
            time_ms: 0,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_paste_outside_editable_routes() {
        let mut r = router();
        let cmds = r.process(RawInput::PasteText {
            text: "https://example.com".into(),
            editable_target: false,
            time_ms: 0,
        });
        assert_eq!(
            cmds,
            vec![Command::PasteText {
                text: "https://example.com".into()
            }]
        );
    }

    #[test]
    fn test_paste_into_editable_field_ignored() {
        let mut r = router();
        let cmds = r.process(RawInput::PasteText {
            text: "https://example.com".into(),
            editable_target: true,
            time_ms: 0,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_clipboard_shortcut() {
        let mut r = router();
        let cmds = r.process(RawInput::ClipboardShortcut { time_ms: 0 });
        assert_eq!(cmds, vec![Command::ReadClipboard]);
    }
}
