//! Asynchronous file dialog requests.

use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread::{self, JoinHandle},
};

/// The type of file dialog to present to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDialogKind {
    /// Pick an existing board file.
    OpenFile,
    /// Choose where a board file should be written.
    SaveFile { suggested_name: String },
}

/// Result emitted once a file dialog completes. `path` is `None` when the
/// user dismissed the dialog.
#[derive(Debug)]
pub struct FileDialogResult {
    pub request_id: u64,
    pub path: Option<PathBuf>,
}

struct PendingDialog {
    request_id: u64,
    receiver: Receiver<Option<PathBuf>>,
    join: Option<JoinHandle<()>>,
}

/// Manages asynchronous file dialog requests without blocking the command
/// loop.
pub struct FileDialogService {
    pending: Vec<PendingDialog>,
}

impl FileDialogService {
    /// Create a new service instance.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Request that a dialog of `kind` be shown. The result will become
    /// available on a future call to [`poll`](FileDialogService::poll).
    pub fn request(&mut self, request_id: u64, kind: FileDialogKind) {
        let (tx, rx) = mpsc::channel();

        let join = thread::spawn(move || {
            let dialog =
                rfd::FileDialog::new().add_filter("DropLinks files", &["droplinks", "json"]);
            let selection = match kind {
                FileDialogKind::OpenFile => dialog.pick_file(),
                FileDialogKind::SaveFile { suggested_name } => {
                    dialog.set_file_name(suggested_name).save_file()
                }
            };

            let _ = tx.send(selection);
        });

        self.pending.push(PendingDialog {
            request_id,
            receiver: rx,
            join: Some(join),
        });
    }

    /// Poll for dialog completions, returning all results that are ready.
    pub fn poll(&mut self) -> Vec<FileDialogResult> {
        let mut ready = Vec::new();
        let mut still_pending = Vec::new();

        for mut dialog in self.pending.drain(..) {
            match dialog.receiver.try_recv() {
                Ok(path) => {
                    if let Some(join) = dialog.join.take() {
                        let _ = join.join();
                    }
                    ready.push(FileDialogResult {
                        request_id: dialog.request_id,
                        path,
                    });
                }
                Err(TryRecvError::Empty) => {
                    still_pending.push(dialog);
                }
                Err(TryRecvError::Disconnected) => {
                    if let Some(join) = dialog.join.take() {
                        let _ = join.join();
                    }
                    ready.push(FileDialogResult {
                        request_id: dialog.request_id,
                        path: None,
                    });
                }
            }
        }

        self.pending = still_pending;
        ready
    }

    /// True if there are outstanding dialogs waiting to complete.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Default for FileDialogService {
    fn default() -> Self {
        Self::new()
    }
}
