//! 工作区监听：目录结构变化（创建/删除/重命名）时通知刷新目录树。
//!
//! 文件内容修改不会改变目录树，因此被忽略；我们自己的原子写临时文件也被忽略。

use super::file::local::is_temp_file;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct WorkspaceWatcher {
    watcher: RecommendedWatcher,
    raw_event_rx: mpsc::Receiver<notify::Event>,
    root: PathBuf,
}

impl WorkspaceWatcher {
    pub fn new(root: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                let _ = tx.send(event);
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            watcher,
            raw_event_rx: rx,
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drains pending events; true when any of them changed the tree shape.
    pub fn drain_changes(&mut self) -> bool {
        let _watcher_guard = &self.watcher;
        let mut changed = false;
        while let Ok(event) = self.raw_event_rx.try_recv() {
            changed |= is_structural(&event);
        }
        changed
    }
}

fn is_structural(event: &notify::Event) -> bool {
    let kind_matches = match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Name(
            RenameMode::Both | RenameMode::From | RenameMode::To | RenameMode::Any,
        )) => true,
        _ => false,
    };
    kind_matches && event.paths.iter().any(|p| !is_temp_file(p))
}
