//! Headless DropLinks shell driven from stdin.
//!
//! Reads `droplinks.toml` plus `DROPLINKS_*` env overrides for config.
//! Each input line is one command; type `help` for the list. Snapshots
//! persist under `~/.droplinks`, so a board survives restarts.

use std::fs;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use droplinks_board::{BoardApp, Command, DropConfig, Effect, MessageKind};
use droplinks_io::{FileDialogKind, FileDialogService, MetadataFetchService};
use tracing::{debug, warn};

struct Shell {
    app: BoardApp,
    dialogs: FileDialogService,
    fetches: MetadataFetchService,
    next_dialog_id: u64,
    /// URL waiting for a panel choice after a paste.
    pending_paste: Option<String>,
    needs_redraw: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = DropConfig::load();
    let fetch_timeout = Duration::from_secs(config.metadata.fetch_timeout_secs);
    let app = BoardApp::with_default_services(config)?;

    let mut fetches = MetadataFetchService::new();
    fetches.set_default_timeout(fetch_timeout);

    let mut shell = Shell {
        app,
        dialogs: FileDialogService::new(),
        fetches,
        next_dialog_id: 0,
        pending_paste: None,
        needs_redraw: true,
    };

    println!("DropLinks board ready. Type `help` for commands.");
    shell.flush_output();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if !shell.dispatch(line.trim()) {
            break;
        }
        shell.pump();
        shell.flush_output();
    }
    Ok(())
}

impl Shell {
    /// Run one command line. Returns false when the shell should exit.
    fn dispatch(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }
        let (verb, rest) = match line.split_once(' ') {
            Some((v, r)) => (v, r.trim()),
            None => (line, ""),
        };
        match verb {
            "help" => print_help(),
            "quit" | "exit" => return false,
            "show" => self.needs_redraw = true,
            "add-panel" => self.run(Command::AddPanel),
            "delete-panel" => match rest.parse() {
                Ok(panel_id) => self.run(Command::RequestDeletePanel { panel_id }),
                Err(_) => println!("usage: delete-panel <id>"),
            },
            "confirm" => self.run(Command::ConfirmDelete),
            "cancel" => self.run(Command::CancelDelete),
            "rename-panel" => match parse_id_and_rest(rest) {
                Some((panel_id, title)) => self.run(Command::RenamePanel {
                    panel_id,
                    title: title.to_string(),
                }),
                None => println!("usage: rename-panel <id> <title>"),
            },
            "move-panel" => match parse_two(rest) {
                Some((from_index, to_index)) => self.run(Command::MovePanel {
                    from_index,
                    to_index,
                }),
                None => println!("usage: move-panel <from> <to>"),
            },
            "add" => match parse_id_and_rest(rest) {
                Some((panel_id, url)) if !url.is_empty() => self.run(Command::AddLink {
                    panel_id,
                    url: url.to_string(),
                }),
                _ => println!("usage: add <panel-id> <url>"),
            },
            "remove" => match parse_two(rest) {
                Some((panel_id, link_index)) => self.run(Command::RemoveLink {
                    panel_id,
                    link_index,
                }),
                None => println!("usage: remove <panel-id> <link-index>"),
            },
            "move" => match parse_three(rest) {
                Some((source_panel, target_panel, link_index)) => self.run(Command::MoveLink {
                    source_panel,
                    target_panel,
                    link_index,
                }),
                None => println!("usage: move <from-panel> <to-panel> <link-index>"),
            },
            "edit" => match parse_edit(rest) {
                Some((panel_id, link_index, url, title)) => self.run(Command::EditLink {
                    panel_id,
                    link_index,
                    title,
                    url,
                }),
                None => println!("usage: edit <panel-id> <link-index> <url> <title>"),
            },
            "open" => match parse_two(rest) {
                Some((panel_id, link_index)) => self.run(Command::OpenLink {
                    panel_id,
                    link_index,
                }),
                None => println!("usage: open <panel-id> <link-index>"),
            },
            "pick" => match (self.pending_paste.take(), rest.parse()) {
                (Some(url), Ok(panel_id)) => self.run(Command::AddLink { panel_id, url }),
                (Some(url), Err(_)) => {
                    self.pending_paste = Some(url);
                    println!("usage: pick <panel-id>");
                }
                (None, _) => println!("nothing pasted yet"),
            },
            "paste" => self.run(Command::PasteText {
                text: rest.to_string(),
            }),
            "clipboard" => self.run(Command::ReadClipboard),
            "view" => self.run(Command::ToggleView),
            "export" => self.run(Command::ExportData),
            "import" => match fs::read_to_string(rest) {
                Ok(json) => self.run(Command::ImportText { json }),
                Err(error) => println!("[error] could not read {rest}: {error}"),
            },
            "sync" => self.run(Command::SyncNow),
            _ => println!("unknown command `{verb}`; try `help`"),
        }
        true
    }

    fn run(&mut self, command: Command) {
        let effects = self.app.apply(command);
        self.handle_effects(effects);
    }

    /// Collect finished background work and feed it back as commands.
    fn pump(&mut self) {
        for result in self.dialogs.poll() {
            self.run(Command::MirrorPathChosen { path: result.path });
        }
        for result in self.fetches.poll() {
            if let Some(error) = &result.error {
                debug!(request_id = result.request_id, %error, "title fetch failed");
            }
            self.run(Command::MetadataFetched {
                request_id: result.request_id,
                title: result.title,
            });
        }
        self.run(Command::SyncTick);
    }

    fn handle_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RenderRequested => self.needs_redraw = true,
                Effect::ConfirmDeletePanel { panel_id } => {
                    println!("Delete panel {panel_id} and all its links? (`confirm` / `cancel`)");
                }
                Effect::PromptPanelChoice { url } => {
                    println!("Add {url} to which panel? (`pick <id>`)");
                    for panel in &self.app.state().panels {
                        println!("  {}: {}", panel.id, panel.title);
                    }
                    self.pending_paste = Some(url);
                }
                Effect::OpenUrl { url } => println!("-> open {url}"),
                Effect::EditLinkPrompt {
                    panel_id,
                    link_index,
                } => {
                    println!("Edit with: edit {panel_id} {link_index} <url> <title>");
                }
                Effect::SaveExportFile {
                    file_name,
                    contents,
                } => match fs::write(&file_name, contents) {
                    Ok(()) => println!("Saved {file_name}"),
                    Err(error) => warn!(?error, %file_name, "failed to write export"),
                },
                Effect::PromptMirrorSave { suggested_name } => {
                    self.next_dialog_id += 1;
                    self.dialogs.request(
                        self.next_dialog_id,
                        FileDialogKind::SaveFile { suggested_name },
                    );
                    println!("Pick a location for the board mirror file (dialog open).");
                }
                Effect::PromptMirrorOpen => {
                    self.next_dialog_id += 1;
                    self.dialogs.request(self.next_dialog_id, FileDialogKind::OpenFile);
                    println!("Pick a board file to sync with (dialog open).");
                }
                Effect::FetchTitle { request_id, url } => {
                    self.fetches.request(request_id, &url);
                }
                Effect::CancelFetch { request_id } => self.fetches.cancel(request_id),
                Effect::ShowMessage { kind, text } => {
                    let tag = match kind {
                        MessageKind::Info => "info",
                        MessageKind::Success => "ok",
                        MessageKind::Error => "error",
                    };
                    println!("[{tag}] {text}");
                }
            }
        }
    }

    fn flush_output(&mut self) {
        if self.needs_redraw {
            self.render();
            self.needs_redraw = false;
        }
        print!("> ");
        let _ = io::stdout().flush();
    }

    fn render(&self) {
        let state = self.app.state();
        let view = if state.is_compact_view { "compact" } else { "full" };
        println!();
        println!(
            "Board ({} panels, {} links, {view} view)",
            state.panels.len(),
            state.total_links()
        );
        for (index, panel) in state.panels.iter().enumerate() {
            println!("[{index}] #{} {}", panel.id, panel.title);
            for (li, link) in panel.links.iter().enumerate() {
                if state.is_compact_view {
                    println!("   {li}: {} ({})", link.title, link.domain);
                } else {
                    println!("   {li}: {} ({})", link.title, link.domain);
                    println!("      {}", link.url);
                }
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  show                                  redraw the board");
    println!("  add-panel                             create a panel");
    println!("  delete-panel <id>                     start deleting a panel");
    println!("  confirm | cancel                      answer a pending deletion");
    println!("  rename-panel <id> <title>             rename a panel");
    println!("  move-panel <from> <to>                reorder panels by position");
    println!("  add <panel-id> <url>                  add a link");
    println!("  remove <panel-id> <link-index>        remove a link");
    println!("  move <from-panel> <to-panel> <index>  move a link");
    println!("  edit <panel-id> <index> <url> <title> edit a link");
    println!("  open <panel-id> <link-index>          open a link");
    println!("  paste <text>                          hand text to the board");
    println!("  pick <panel-id>                       place the last pasted URL");
    println!("  clipboard                             read the system clipboard");
    println!("  view                                  toggle compact view");
    println!("  export                                write a dated export file");
    println!("  import <path>                         import a board file");
    println!("  sync                                  reconcile with a board file");
    println!("  quit                                  leave");
    println!();
    println!("Background work (dialogs, title fetches) is picked up when the");
    println!("next line is read; press Enter on an empty line to poll.");
}

fn parse_id_and_rest(rest: &str) -> Option<(u64, &str)> {
    let (id, tail) = rest.split_once(' ')?;
    Some((id.trim().parse().ok()?, tail.trim()))
}

fn parse_two<A, B>(rest: &str) -> Option<(A, B)>
where
    A: std::str::FromStr,
    B: std::str::FromStr,
{
    let mut parts = rest.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    Some((a, b))
}

fn parse_three(rest: &str) -> Option<(u64, u64, usize)> {
    let mut parts = rest.split_whitespace();
    let a = parts.next()?.parse().ok()?;
    let b = parts.next()?.parse().ok()?;
    let c = parts.next()?.parse().ok()?;
    Some((a, b, c))
}

fn parse_edit(rest: &str) -> Option<(u64, usize, String, String)> {
    let mut parts = rest.splitn(4, ' ');
    let panel_id = parts.next()?.trim().parse().ok()?;
    let link_index = parts.next()?.trim().parse().ok()?;
    let url = parts.next()?.trim().to_string();
    let title = parts.next()?.trim().to_string();
    Some((panel_id, link_index, url, title))
}
