use rustc_hash::FxHashSet;

use crate::kernel::action::SaveTrigger;
use crate::kernel::services::ports::DirHandle;
use crate::models::{FileTree, OpenFiles, TreeFilter};

/// Everything tied to one opened root. Replaced wholesale by a new root.
#[derive(Debug)]
pub struct Session {
    /// Async results carrying another epoch are dropped.
    pub epoch: u64,
    pub root: DirHandle,
    pub tree: FileTree,
    pub open_files: OpenFiles,
    pub active: Option<String>,
    pub editor_bound: bool,
    pub tree_loading: bool,
    pub tree_reload_queued: bool,
}

impl Session {
    pub fn new(epoch: u64, root: DirHandle, tree: FileTree) -> Self {
        Self {
            epoch,
            root,
            tree,
            open_files: OpenFiles::new(),
            active: None,
            editor_bound: false,
            tree_loading: false,
            tree_reload_queued: false,
        }
    }

    pub fn root_name(&self) -> &str {
        self.tree.root_name()
    }

    pub fn is_active(&self, path: &str) -> bool {
        self.active.as_deref() == Some(path)
    }
}

#[derive(Debug)]
pub struct SaveBatch {
    pub id: u64,
    pub epoch: u64,
    pub trigger: SaveTrigger,
    pub pending: FxHashSet<String>,
    pub saved: usize,
    pub failed: usize,
}

/// What the follow-up batch writes once the running one finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRerun {
    All,
    /// Single-file saves, in request order.
    Paths(Vec<String>),
}

impl SaveRerun {
    /// Widens the pending rerun so it also covers `other`.
    pub fn merge(self, other: SaveRerun) -> SaveRerun {
        match (self, other) {
            (SaveRerun::Paths(mut paths), SaveRerun::Paths(more)) => {
                for path in more {
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
                SaveRerun::Paths(paths)
            }
            _ => SaveRerun::All,
        }
    }
}

#[derive(Debug, Default)]
pub struct SaveState {
    pub in_flight: Option<SaveBatch>,
    pub next_batch: u64,
    /// Manual saves that arrived while a batch was running.
    pub rerun: Option<SaveRerun>,
    pub coalesced: u64,
}

impl SaveState {
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn request_rerun(&mut self, scope: SaveRerun) {
        self.rerun = Some(match self.rerun.take() {
            Some(pending) => pending.merge(scope),
            None => scope,
        });
    }
}

#[derive(Debug)]
pub struct AppState {
    pub session: Option<Session>,
    pub save: SaveState,
    pub filter: TreeFilter,
    pub next_epoch: u64,
    pub root_request: u64,
    /// Only the latest `OpenRoot` request may install a session.
    pub pending_root: Option<u64>,
    pub pending_creates: usize,
}

impl AppState {
    pub fn new(filter: TreeFilter) -> Self {
        Self {
            session: None,
            save: SaveState::default(),
            filter,
            next_epoch: 0,
            root_request: 0,
            pending_root: None,
            pending_creates: 0,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn active_path(&self) -> Option<&str> {
        self.session.as_ref()?.active.as_deref()
    }

    /// No request of any kind is outstanding.
    pub fn is_idle(&self) -> bool {
        self.pending_root.is_none()
            && self.pending_creates == 0
            && !self.save.is_saving()
            && self
                .session
                .as_ref()
                .map_or(true, |s| !s.tree_loading && !s.open_files.has_loading())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TreeFilter::default())
    }
}
