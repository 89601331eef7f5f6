use super::message::AppMessage;
use crate::kernel::services::ports::{
    CreatedFile, DirHandle, FileHandle, FileResult, FileSystem,
};
use crate::models::{build_file_tree, NewFilePath, PendingWrite, TreeFilter};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// Runs file system work off the UI thread. Every result comes back as an
/// `AppMessage`; nothing here touches application state.
pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    tx: Sender<AppMessage>,
    fs: Arc<dyn FileSystem>,
    filter: TreeFilter,
}

impl AsyncRuntime {
    pub fn new(
        tx: Sender<AppMessage>,
        fs: Arc<dyn FileSystem>,
        filter: TreeFilter,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            tx,
            fs,
            filter,
        })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Runs `job` on the blocking pool. If it panics, `on_panic` builds the
    /// failure message so the kernel never waits on a lost result.
    fn spawn_io<F, P>(&self, op: &'static str, job: F, on_panic: P)
    where
        F: FnOnce(&dyn FileSystem) -> AppMessage + Send + 'static,
        P: FnOnce(String) -> AppMessage + Send + 'static,
    {
        let tx = self.tx.clone();
        let fs = Arc::clone(&self.fs);
        self.runtime.spawn(async move {
            let msg = match tokio::task::spawn_blocking(move || job(fs.as_ref())).await {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!(op, error = %e, "io task panicked");
                    on_panic(format!("{op} failed: {e}"))
                }
            };
            let _ = tx.send(msg);
        });
    }

    pub fn load_root(&self, request: u64, location: PathBuf) {
        let filter = self.filter.clone();
        let failed_location = location.clone();
        self.spawn_io(
            "load_root",
            move |fs| {
                let result = fs
                    .open_root(&location)
                    .and_then(|root| build_file_tree(fs, &root, &filter).map(|tree| (root, tree)));
                match result {
                    Ok((root, tree)) => AppMessage::RootLoaded {
                        request,
                        root,
                        tree,
                    },
                    Err(e) => AppMessage::RootLoadError {
                        request,
                        location,
                        error: e.to_string(),
                    },
                }
            },
            move |error| AppMessage::RootLoadError {
                request,
                location: failed_location,
                error,
            },
        );
    }

    pub fn load_tree(&self, epoch: u64, root: DirHandle) {
        let filter = self.filter.clone();
        self.spawn_io(
            "load_tree",
            move |fs| match build_file_tree(fs, &root, &filter) {
                Ok(tree) => AppMessage::TreeLoaded { epoch, tree },
                Err(e) => AppMessage::TreeLoadError {
                    epoch,
                    error: e.to_string(),
                },
            },
            move |error| AppMessage::TreeLoadError { epoch, error },
        );
    }

    pub fn read_file(&self, epoch: u64, path: String, handle: FileHandle) {
        let failed_path = path.clone();
        self.spawn_io(
            "read_file",
            move |fs| match fs.read_text(&handle) {
                Ok(content) => AppMessage::FileLoaded {
                    epoch,
                    path,
                    handle,
                    content,
                },
                Err(e) => AppMessage::FileError {
                    epoch,
                    path,
                    error: e.to_string(),
                },
            },
            move |error| AppMessage::FileError {
                epoch,
                path: failed_path,
                error,
            },
        );
    }

    /// Writes one batch sequentially in a single task, reporting each file as
    /// it finishes. Files left unreported by a panicking task are reported as
    /// failed.
    pub fn write_files(&self, epoch: u64, batch: u64, writes: Vec<PendingWrite>) {
        let tx = self.tx.clone();
        let fs = Arc::clone(&self.fs);
        let planned: Vec<String> = writes.iter().map(|w| w.path.clone()).collect();
        let reported = Arc::new(AtomicUsize::new(0));
        let reported_by_task = Arc::clone(&reported);
        self.runtime.spawn(async move {
            let tx_for_files = tx.clone();
            let result = tokio::task::spawn_blocking(move || {
                for PendingWrite {
                    path,
                    handle,
                    content,
                } in writes
                {
                    let error = fs
                        .write_text_atomic(&handle, &content)
                        .err()
                        .map(|e| e.to_string());
                    let _ = tx_for_files.send(AppMessage::FileSaved {
                        epoch,
                        batch,
                        path,
                        content,
                        error,
                    });
                    reported_by_task.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;
            if let Err(e) = result {
                tracing::error!(batch, error = %e, "save task panicked");
                let done = reported.load(Ordering::SeqCst);
                for path in planned.into_iter().skip(done) {
                    let _ = tx.send(AppMessage::FileSaved {
                        epoch,
                        batch,
                        path,
                        content: String::new(),
                        error: Some(format!("save failed: {e}")),
                    });
                }
            }
        });
    }

    pub fn create_file(
        &self,
        epoch: u64,
        root: DirHandle,
        target: NewFilePath,
        initial_content: String,
    ) {
        let filter = self.filter.clone();
        let failed_path = target.relative_path();
        self.spawn_io(
            "create_file",
            move |fs| {
                let path = target.relative_path();
                let result = create_markdown(fs, &root, &target, &initial_content).and_then(
                    |(handle, content, created)| {
                        let tree = build_file_tree(fs, &root, &filter)?;
                        Ok((handle, content, created, tree))
                    },
                );
                match result {
                    Ok((handle, content, created, tree)) => AppMessage::FileCreated {
                        epoch,
                        path,
                        handle,
                        content,
                        created,
                        tree,
                    },
                    Err(e) => AppMessage::CreateFailed {
                        epoch,
                        path,
                        error: e.to_string(),
                    },
                }
            },
            move |error| AppMessage::CreateFailed {
                epoch,
                path: failed_path,
                error,
            },
        );
    }

    /// Sends `AutosaveTick` every `interval` until the receiver goes away.
    pub fn spawn_autosave(&self, interval: Duration) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(AppMessage::AutosaveTick).is_err() {
                    break;
                }
            }
        });
    }
}

/// Creates the intermediate directories and the file. An existing file keeps
/// its content.
fn create_markdown(
    fs: &dyn FileSystem,
    root: &DirHandle,
    target: &NewFilePath,
    initial_content: &str,
) -> FileResult<(FileHandle, String, bool)> {
    let mut dir = root.clone();
    for name in &target.dirs {
        dir = fs.create_directory(&dir, name)?;
    }

    let CreatedFile { handle, created } = fs.create_file(&dir, &target.file_name)?;
    let content = if created {
        fs.write_text_atomic(&handle, initial_content)?;
        initial_content.to_string()
    } else {
        fs.read_text(&handle)?
    };
    Ok((handle, content, created))
}
