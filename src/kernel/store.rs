use std::path::PathBuf;

use crate::kernel::services::ports::{Confirm, DirHandle, FileHandle, Permission};
use crate::models::{CloseError, FileTree, NewFilePath, OpenRequest, PendingWrite};

use super::action::SaveTrigger;
use super::effect::Notice;
use super::state::{SaveBatch, SaveRerun, Session};
use super::{Action, AppState, Effect};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn none() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            state_changed: true,
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            effects: vec![Effect::Notify(notice)],
            state_changed: false,
        }
    }
}

pub struct Store {
    state: AppState,
    confirm: Box<dyn Confirm>,
}

impl Store {
    pub fn new(state: AppState, confirm: Box<dyn Confirm>) -> Self {
        Self { state, confirm }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenRoot { location } => self.open_root(location),
            Action::RootLoaded {
                request,
                root,
                tree,
            } => self.root_loaded(request, root, tree),
            Action::RootLoadError {
                request,
                location,
                error,
            } => self.root_load_error(request, location, error),
            Action::RefreshTree => self.refresh_tree(),
            Action::TreeLoaded { epoch, tree } => self.tree_loaded(epoch, tree),
            Action::TreeLoadError { epoch, error } => self.tree_load_error(epoch, error),
            Action::ToggleDir { path } => {
                let Some(session) = self.state.session.as_mut() else {
                    return DispatchResult::none();
                };
                let state_changed = session.tree.toggle_path(&path);
                DispatchResult {
                    effects: Vec::new(),
                    state_changed,
                }
            }
            Action::OpenFile { path } => self.open_file(path),
            Action::FileLoaded {
                epoch,
                path,
                handle,
                content,
            } => self.file_loaded(epoch, path, handle, content),
            Action::FileLoadError { epoch, path, error } => {
                let Some(session) = self.session_for(epoch) else {
                    return DispatchResult::none();
                };
                session.open_files.abort_open(&path);
                tracing::warn!(path = %path, error = %error, "open file failed");
                DispatchResult {
                    effects: vec![Effect::Notify(Notice::error(format!(
                        "Failed to open {path}: {error}"
                    )))],
                    state_changed: true,
                }
            }
            Action::CloseTab { path } => self.close_tab(path),
            Action::EditorContentChanged { text } => {
                let Some(session) = self.state.session.as_mut() else {
                    return DispatchResult::none();
                };
                let Some(active) = session.active.clone() else {
                    return DispatchResult::none();
                };
                match session.open_files.update(&active, text) {
                    Some(_) => DispatchResult::changed(Vec::new()),
                    None => DispatchResult::none(),
                }
            }
            Action::EditorClosed => {
                tracing::debug!("editor document closed, tab stays open");
                DispatchResult::none()
            }
            Action::SaveAll { trigger } => self.save_all(trigger),
            Action::SaveFile { path } => {
                if self.state.save.is_saving() {
                    self.coalesce(SaveTrigger::Manual, SaveRerun::Paths(vec![path]));
                    return DispatchResult::none();
                }
                self.start_batch(SaveTrigger::Manual, vec![path])
            }
            Action::FileSaved {
                epoch,
                batch,
                path,
                content,
                error,
            } => self.file_saved(epoch, batch, path, content, error),
            Action::NewFile { input, permission } => self.new_file(input, permission),
            Action::FileCreated {
                epoch,
                path,
                handle,
                content,
                created,
                tree,
            } => self.file_created(epoch, path, handle, content, created, tree),
            Action::CreateFailed { epoch, path, error } => {
                self.state.pending_creates = self.state.pending_creates.saturating_sub(1);
                tracing::warn!(epoch, path = %path, error = %error, "create file failed");
                DispatchResult {
                    effects: vec![Effect::Notify(Notice::error(format!(
                        "Failed to create {path}: {error}"
                    )))],
                    state_changed: true,
                }
            }
        }
    }

    fn session_for(&mut self, epoch: u64) -> Option<&mut Session> {
        let session = self.state.session.as_mut().filter(|s| s.epoch == epoch);
        if session.is_none() {
            tracing::debug!(epoch, "drop result from a replaced session");
        }
        session
    }

    fn open_root(&mut self, location: PathBuf) -> DispatchResult {
        self.state.root_request += 1;
        let request = self.state.root_request;
        self.state.pending_root = Some(request);
        tracing::info!(request, location = %location.display(), "open root");
        DispatchResult::changed(vec![Effect::LoadRoot { request, location }])
    }

    fn root_loaded(&mut self, request: u64, root: DirHandle, tree: FileTree) -> DispatchResult {
        if self.state.pending_root != Some(request) {
            tracing::debug!(request, "drop superseded root");
            return DispatchResult::none();
        }
        self.state.pending_root = None;

        let mut effects = Vec::new();
        if let Some(previous) = self.state.session.take() {
            let discarded = previous.open_files.dirty_paths();
            if !discarded.is_empty() {
                tracing::warn!(files = ?discarded, "discarding unsaved changes of previous root");
                effects.push(Effect::Notify(Notice::warn(format!(
                    "Discarded unsaved changes in {} file(s)",
                    discarded.len()
                ))));
            }
            if previous.editor_bound {
                effects.push(Effect::UnbindEditor);
            }
        }

        self.state.next_epoch += 1;
        let epoch = self.state.next_epoch;
        let session = Session::new(epoch, root.clone(), tree);
        let name = session.root_name().to_string();
        tracing::info!(epoch, root = %name, files = session.tree.file_count(), "root opened");
        self.state.session = Some(session);

        effects.push(Effect::WatchRoot(root));
        effects.push(Effect::SetStatus(name.clone()));
        effects.push(Effect::Notify(Notice::info(format!("Opened folder {name}"))));
        DispatchResult::changed(effects)
    }

    fn root_load_error(&mut self, request: u64, location: PathBuf, error: String) -> DispatchResult {
        if self.state.pending_root != Some(request) {
            return DispatchResult::none();
        }
        self.state.pending_root = None;
        tracing::warn!(location = %location.display(), error = %error, "open root failed");
        DispatchResult {
            effects: vec![Effect::Notify(Notice::error(format!(
                "Cannot open {}: {error}",
                location.display()
            )))],
            state_changed: true,
        }
    }

    fn refresh_tree(&mut self) -> DispatchResult {
        let Some(session) = self.state.session.as_mut() else {
            return DispatchResult::none();
        };
        if session.tree_loading {
            session.tree_reload_queued = true;
            return DispatchResult::none();
        }
        session.tree_loading = true;
        DispatchResult::changed(vec![Effect::LoadTree {
            epoch: session.epoch,
            root: session.root.clone(),
        }])
    }

    fn tree_loaded(&mut self, epoch: u64, tree: FileTree) -> DispatchResult {
        let Some(session) = self.session_for(epoch) else {
            return DispatchResult::none();
        };
        replace_tree(session, tree);
        session.tree_loading = false;
        DispatchResult::changed(reload_if_queued(session))
    }

    fn tree_load_error(&mut self, epoch: u64, error: String) -> DispatchResult {
        let Some(session) = self.session_for(epoch) else {
            return DispatchResult::none();
        };
        session.tree_loading = false;
        tracing::warn!(epoch, error = %error, "tree refresh failed");
        let mut effects = vec![Effect::Notify(Notice::warn(format!(
            "Cannot refresh folder: {error}"
        )))];
        effects.extend(reload_if_queued(session));
        DispatchResult::changed(effects)
    }

    fn open_file(&mut self, path: String) -> DispatchResult {
        let Some(session) = self.state.session.as_mut() else {
            return DispatchResult::notice(Notice::warn("Open a directory first"));
        };

        match session.open_files.begin_open(&path) {
            OpenRequest::Activate => DispatchResult::changed(activate(session, &path)),
            OpenRequest::InFlight => {
                tracing::debug!(path = %path, "open already in flight");
                DispatchResult::none()
            }
            OpenRequest::Load => match session.tree.file_handle(&path).cloned() {
                Some(handle) => DispatchResult::changed(vec![Effect::ReadFile {
                    epoch: session.epoch,
                    path,
                    handle,
                }]),
                None => {
                    session.open_files.abort_open(&path);
                    DispatchResult::notice(Notice::warn(format!(
                        "No markdown file at {path}"
                    )))
                }
            },
        }
    }

    fn file_loaded(
        &mut self,
        epoch: u64,
        path: String,
        handle: FileHandle,
        content: String,
    ) -> DispatchResult {
        let Some(session) = self.session_for(epoch) else {
            return DispatchResult::none();
        };
        if !session.open_files.finish_open(&path, handle, content) {
            return DispatchResult::none();
        }
        tracing::info!(path = %path, tabs = session.open_files.len(), "file opened");
        DispatchResult::changed(activate(session, &path))
    }

    fn close_tab(&mut self, path: String) -> DispatchResult {
        let Some(session) = self.state.session.as_mut() else {
            return DispatchResult::none();
        };
        let confirm = &mut self.confirm;
        let closed = session.open_files.close(&path, |record| {
            confirm.confirm(&format!(
                "{} has unsaved changes. Close anyway?",
                record.handle().name()
            ))
        });
        match closed {
            Ok(_) => {}
            Err(CloseError::NotOpen) => return DispatchResult::none(),
            Err(CloseError::ConfirmationDeclined) => {
                tracing::debug!(path = %path, "close declined");
                return DispatchResult::none();
            }
        }

        let mut effects = Vec::new();
        if session.is_active(&path) {
            match session.open_files.last_path().map(str::to_string) {
                Some(next) => effects.extend(activate(session, &next)),
                None => {
                    session.active = None;
                    session.tree.select_path(None);
                    if session.editor_bound {
                        session.editor_bound = false;
                        effects.push(Effect::UnbindEditor);
                    }
                }
            }
        }
        DispatchResult::changed(effects)
    }

    fn save_all(&mut self, trigger: SaveTrigger) -> DispatchResult {
        if self.state.save.is_saving() {
            self.coalesce(trigger, SaveRerun::All);
            return DispatchResult::none();
        }
        let paths = match self.state.session.as_ref() {
            Some(session) => session.open_files.paths().map(str::to_string).collect(),
            None => return DispatchResult::none(),
        };
        self.start_batch(trigger, paths)
    }

    /// Timer ticks during a running batch are dropped; manual requests leave
    /// exactly one follow-up batch behind, covering every requested path.
    fn coalesce(&mut self, trigger: SaveTrigger, scope: SaveRerun) {
        self.state.save.coalesced += 1;
        if trigger == SaveTrigger::Manual {
            self.state.save.request_rerun(scope);
        }
        tracing::debug!(?trigger, "save already running");
    }

    fn start_batch(&mut self, trigger: SaveTrigger, paths: Vec<String>) -> DispatchResult {
        let Some(session) = self.state.session.as_ref() else {
            return DispatchResult::none();
        };
        let writes: Vec<PendingWrite> = paths
            .iter()
            .filter_map(|path| session.open_files.begin_persist(path))
            .collect();
        if writes.is_empty() {
            return DispatchResult::none();
        }

        let epoch = session.epoch;
        let save = &mut self.state.save;
        save.next_batch += 1;
        let id = save.next_batch;
        save.in_flight = Some(SaveBatch {
            id,
            epoch,
            trigger,
            pending: writes.iter().map(|w| w.path.clone()).collect(),
            saved: 0,
            failed: 0,
        });
        tracing::debug!(batch = id, ?trigger, files = writes.len(), "save batch started");
        DispatchResult::changed(vec![Effect::WriteFiles {
            epoch,
            batch: id,
            writes,
        }])
    }

    fn file_saved(
        &mut self,
        epoch: u64,
        batch: u64,
        path: String,
        content: String,
        error: Option<String>,
    ) -> DispatchResult {
        let Some(current) = self.state.save.in_flight.as_mut().filter(|b| b.id == batch) else {
            tracing::debug!(batch, path = %path, "drop result of unknown save batch");
            return DispatchResult::none();
        };
        current.pending.remove(&path);

        let mut effects = Vec::new();
        match error {
            None => {
                current.saved += 1;
                if let Some(session) = self.state.session.as_mut().filter(|s| s.epoch == epoch) {
                    session.open_files.finish_persist(&path, &content);
                }
            }
            Some(error) => {
                current.failed += 1;
                match current.trigger {
                    SaveTrigger::Manual => {
                        tracing::warn!(path = %path, error = %error, "save failed");
                        effects.push(Effect::Notify(Notice::error(format!(
                            "Failed to save {path}: {error}"
                        ))));
                    }
                    SaveTrigger::Timer => {
                        tracing::warn!(path = %path, error = %error, "autosave failed");
                    }
                }
            }
        }

        if !current.pending.is_empty() {
            return DispatchResult::changed(effects);
        }

        if let Some(finished) = self.state.save.in_flight.take() {
            tracing::info!(
                batch = finished.id,
                trigger = ?finished.trigger,
                saved = finished.saved,
                failed = finished.failed,
                "save batch finished"
            );
            if finished.saved > 0 {
                effects.push(Effect::Notify(Notice::info(format!(
                    "Saved {} file(s)",
                    finished.saved
                ))));
                effects.push(Effect::SetStatus("Saved".to_string()));
            }
        }

        match self.state.save.rerun.take() {
            Some(SaveRerun::All) => effects.extend(self.save_all(SaveTrigger::Manual).effects),
            Some(SaveRerun::Paths(paths)) => {
                effects.extend(self.start_batch(SaveTrigger::Manual, paths).effects)
            }
            None => {}
        }
        DispatchResult::changed(effects)
    }

    fn new_file(&mut self, input: String, permission: Permission) -> DispatchResult {
        let Some(session) = self.state.session.as_ref() else {
            return DispatchResult::notice(Notice::warn("Open a directory first"));
        };
        if permission == Permission::Denied {
            return DispatchResult::notice(Notice::error(
                "Write permission is required to create files",
            ));
        }

        let target = match NewFilePath::parse(&input, &self.state.filter) {
            Ok(Some(target)) => target,
            Ok(None) => return DispatchResult::none(),
            Err(e) => return DispatchResult::notice(Notice::error(format!("Cannot create file: {e}"))),
        };
        let initial_content = target.initial_content(&self.state.filter);
        let epoch = session.epoch;
        let root = session.root.clone();

        self.state.pending_creates += 1;
        tracing::info!(path = %target.relative_path(), "create file");
        DispatchResult::changed(vec![Effect::CreateFile {
            epoch,
            root,
            target,
            initial_content,
        }])
    }

    fn file_created(
        &mut self,
        epoch: u64,
        path: String,
        handle: FileHandle,
        content: String,
        created: bool,
        tree: FileTree,
    ) -> DispatchResult {
        self.state.pending_creates = self.state.pending_creates.saturating_sub(1);
        let Some(session) = self.session_for(epoch) else {
            return DispatchResult::changed(Vec::new());
        };
        replace_tree(session, tree);

        let mut effects = Vec::new();
        match session.open_files.begin_open(&path) {
            OpenRequest::Activate => effects.extend(activate(session, &path)),
            // the pending read activates it when it lands
            OpenRequest::InFlight => {}
            OpenRequest::Load => {
                session.open_files.finish_open(&path, handle, content);
                effects.extend(activate(session, &path));
            }
        }

        let message = if created {
            format!("Created {path}")
        } else {
            format!("{path} already exists, opened it")
        };
        effects.push(Effect::Notify(Notice::info(message)));
        DispatchResult::changed(effects)
    }
}

/// Makes `path` the active tab and rebinds the editor to it. The path must be
/// open.
fn activate(session: &mut Session, path: &str) -> Vec<Effect> {
    let Some(record) = session.open_files.get(path) else {
        return Vec::new();
    };
    let name = record.handle().name();
    let text = record.content().to_string();

    let mut effects = Vec::new();
    if session.editor_bound {
        effects.push(Effect::UnbindEditor);
    }
    effects.push(Effect::BindEditor {
        name: name.clone(),
        text,
    });
    effects.push(Effect::SetStatus(format!("Editing {name}")));

    session.editor_bound = true;
    session.active = Some(path.to_string());
    session.tree.select_path(Some(path));
    effects
}

/// Installs a rebuilt tree, keeping collapsed directories and the selection.
fn replace_tree(session: &mut Session, mut tree: FileTree) {
    let collapsed = session.tree.collapsed_paths();
    tree.collapse_paths(collapsed.iter().map(String::as_str));
    tree.select_path(session.active.as_deref());
    session.tree = tree;
}

fn reload_if_queued(session: &mut Session) -> Vec<Effect> {
    if !std::mem::take(&mut session.tree_reload_queued) {
        return Vec::new();
    }
    session.tree_loading = true;
    vec![Effect::LoadTree {
        epoch: session.epoch,
        root: session.root.clone(),
    }]
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
