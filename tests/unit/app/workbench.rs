use super::*;
use crate::core::event::{Key, KeyCode, KeyModifiers};
use crate::kernel::services::adapters::MemoryFileSystem;
use crate::kernel::services::ports::{
    Confirmation, EditorEvent, FileSystem, KeybindingRule, Permission,
};
use crate::kernel::{Notice, NoticeLevel};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Recorded {
    document: Option<(String, String)>,
    binds: usize,
    unbinds: usize,
    notices: Vec<Notice>,
    status: Vec<String>,
}

type Shared = Rc<RefCell<Recorded>>;

struct FakeEditor(Shared);

impl EditorBridge for FakeEditor {
    fn bind_document(&mut self, name: &str, text: &str) {
        let mut rec = self.0.borrow_mut();
        assert!(rec.document.is_none(), "bound twice without unbind");
        rec.document = Some((name.to_string(), text.to_string()));
        rec.binds += 1;
    }

    fn unbind(&mut self) {
        let mut rec = self.0.borrow_mut();
        rec.document = None;
        rec.unbinds += 1;
    }
}

struct FakeNotifier(Shared);

impl Notifier for FakeNotifier {
    fn notify(&mut self, notice: &Notice) {
        self.0.borrow_mut().notices.push(notice.clone());
    }

    fn set_status(&mut self, text: &str) {
        self.0.borrow_mut().status.push(text.to_string());
    }
}

struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> Confirmation {
        Confirmation::Accepted
    }
}

fn quiet_settings() -> Settings {
    Settings {
        autosave_interval_secs: 0,
        watch_workspace: false,
        ..Settings::default()
    }
}

fn sample_fs() -> Arc<MemoryFileSystem> {
    Arc::new(
        MemoryFileSystem::new()
            .with_file("/ws/a.md", "# a\n")
            .with_file("/ws/b.md", "# b\n")
            .with_file("/ws/notes/c.md", "# c\n")
            .with_file("/ws/skip.txt", "no"),
    )
}

struct Fixture {
    workbench: Workbench,
    rx: mpsc::Receiver<AppMessage>,
    fs: Arc<MemoryFileSystem>,
    rec: Shared,
}

fn create_fixture(settings: &Settings) -> Fixture {
    let fs = sample_fs();
    let (tx, rx) = mpsc::channel();
    let runtime = AsyncRuntime::new(
        tx,
        fs.clone() as Arc<dyn FileSystem>,
        TreeFilter::from_settings(settings),
    )
    .unwrap();
    let rec = Shared::default();
    let workbench = Workbench::new(
        runtime,
        Box::new(FakeEditor(rec.clone())),
        Box::new(AlwaysConfirm),
        Box::new(FakeNotifier(rec.clone())),
        settings,
    );
    Fixture {
        workbench,
        rx,
        fs,
        rec,
    }
}

fn drain_runtime_messages(workbench: &mut Workbench, rx: &mpsc::Receiver<AppMessage>) -> bool {
    let mut changed = false;
    while let Ok(msg) = rx.try_recv() {
        workbench.handle_message(msg);
        changed = true;
    }
    changed
}

fn drive_until(
    workbench: &mut Workbench,
    rx: &mpsc::Receiver<AppMessage>,
    timeout: Duration,
    mut done: impl FnMut(&Workbench) -> bool,
) {
    let start = Instant::now();
    loop {
        drain_runtime_messages(workbench, rx);
        workbench.tick();
        if done(workbench) {
            return;
        }
        if start.elapsed() > timeout {
            panic!("timeout waiting for condition");
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn settle(f: &mut Fixture) {
    drive_until(&mut f.workbench, &f.rx, Duration::from_secs(2), |w| {
        w.is_idle()
    });
}

fn opened(settings: &Settings) -> Fixture {
    let mut f = create_fixture(settings);
    f.workbench
        .run_command(Command::OpenRoot(PathBuf::from("/ws")));
    drive_until(&mut f.workbench, &f.rx, Duration::from_secs(2), |w| {
        w.state().session().is_some() && w.is_idle()
    });
    f
}

fn open_file(f: &mut Fixture, path: &str) {
    f.workbench.run_command(Command::OpenFile(path.to_string()));
    settle(f);
}

fn edit(f: &mut Fixture, text: &str) {
    f.workbench
        .handle_editor_event(EditorEvent::ContentChanged(text.to_string()));
}

#[test]
fn test_open_root_builds_filtered_tree() {
    let f = opened(&quiet_settings());
    let session = f.workbench.state().session().unwrap();

    assert_eq!(session.root_name(), "ws");
    assert!(session.tree.find("notes/c.md").is_some());
    assert!(session.tree.find("skip.txt").is_none());
    assert!(!f.workbench.is_watching());
    assert_eq!(f.rec.borrow().status.last().map(String::as_str), Some("ws"));
}

#[test]
fn test_open_file_binds_editor_once() {
    let mut f = opened(&quiet_settings());
    open_file(&mut f, "a.md");
    open_file(&mut f, "notes/c.md");
    open_file(&mut f, "a.md");

    let rec = f.rec.borrow();
    assert_eq!(
        rec.document,
        Some(("a.md".to_string(), "# a\n".to_string()))
    );
    assert_eq!(rec.binds, 3);
    assert_eq!(rec.unbinds, 2);
    assert_eq!(f.fs.read_count(), 2);
}

#[test]
fn test_ctrl_s_saves_only_dirty_files() {
    let mut f = opened(&quiet_settings());
    open_file(&mut f, "a.md");
    open_file(&mut f, "b.md");
    edit(&mut f, "# b\n\nchanged\n");

    let outcome = f.workbench.handle_key(Key::ctrl(KeyCode::Char('s')));
    assert!(outcome.is_consumed());
    settle(&mut f);

    assert_eq!(f.fs.write_count(), 1);
    assert_eq!(f.fs.file_content("/ws/b.md").as_deref(), Some("# b\n\nchanged\n"));
    assert_eq!(f.fs.file_content("/ws/a.md").as_deref(), Some("# a\n"));
    let session = f.workbench.state().session().unwrap();
    assert!(session.open_files.dirty_paths().is_empty());
    assert!(f
        .rec
        .borrow()
        .notices
        .iter()
        .any(|n| n.message == "Saved 1 file(s)"));
}

#[test]
fn test_cmd_s_is_bound_and_plain_keys_pass_through() {
    let mut f = opened(&quiet_settings());
    assert!(f
        .workbench
        .handle_key(Key::super_key(KeyCode::Char('s')))
        .is_consumed());
    assert_eq!(
        f.workbench.handle_key(Key::simple(KeyCode::Char('s'))),
        KeyOutcome::Ignored
    );
    assert_eq!(
        f.workbench
            .handle_key(Key::new(KeyCode::Char('x'), KeyModifiers::CONTROL)),
        KeyOutcome::Ignored
    );
}

#[test]
fn test_custom_keybinding_rules_apply() {
    let settings = Settings {
        keybindings: vec![KeybindingRule {
            key: "f5".to_string(),
            command: "refreshTree".to_string(),
        }],
        ..quiet_settings()
    };
    let mut f = opened(&settings);

    f.fs.insert_file("/ws/late.md", "");
    assert!(f.workbench.handle_key(Key::simple(KeyCode::F(5))).is_consumed());
    drive_until(&mut f.workbench, &f.rx, Duration::from_secs(2), |w| {
        w.state()
            .session()
            .is_some_and(|s| s.tree.find("late.md").is_some())
    });
    // user rules extend the defaults
    assert!(f
        .workbench
        .handle_key(Key::ctrl(KeyCode::Char('s')))
        .is_consumed());
}

#[test]
fn test_autosave_tick_flushes_dirty_files() {
    let mut f = opened(&quiet_settings());
    open_file(&mut f, "a.md");
    edit(&mut f, "tick");

    f.workbench.handle_message(AppMessage::AutosaveTick);
    settle(&mut f);
    assert_eq!(f.fs.file_content("/ws/a.md").as_deref(), Some("tick"));
}

#[test]
fn test_autosave_timer_runs_in_background() {
    let settings = Settings {
        autosave_interval_secs: 1,
        ..quiet_settings()
    };
    let mut f = opened(&settings);
    open_file(&mut f, "a.md");
    edit(&mut f, "timed");

    let fs = f.fs.clone();
    drive_until(&mut f.workbench, &f.rx, Duration::from_secs(5), move |w| {
        w.is_idle() && fs.file_content("/ws/a.md").as_deref() == Some("timed")
    });
}

#[test]
fn test_new_file_creates_nested_path_and_activates_it() {
    let mut f = opened(&quiet_settings());
    f.workbench
        .run_command(Command::NewFile("temp/sub/note".to_string()));
    settle(&mut f);

    assert!(f.fs.is_dir("/ws/temp/sub"));
    assert_eq!(
        f.fs.file_content("/ws/temp/sub/note.md").as_deref(),
        Some("# note\n")
    );
    let session = f.workbench.state().session().unwrap();
    assert_eq!(session.active.as_deref(), Some("temp/sub/note.md"));
    assert!(session.tree.find("temp/sub/note.md").is_some());
    assert_eq!(
        f.rec.borrow().document,
        Some(("note.md".to_string(), "# note\n".to_string()))
    );
}

#[test]
fn test_new_file_over_existing_keeps_content() {
    let mut f = opened(&quiet_settings());
    f.workbench.run_command(Command::NewFile("a".to_string()));
    settle(&mut f);

    assert_eq!(f.fs.file_content("/ws/a.md").as_deref(), Some("# a\n"));
    assert_eq!(
        f.workbench.state().active_path(),
        Some("a.md")
    );
}

#[test]
fn test_new_file_without_permission_is_refused() {
    let mut f = opened(&quiet_settings());
    f.fs.deny_permission(true);
    assert_eq!(
        f.workbench.request_write_permission(),
        Permission::Denied
    );

    f.workbench.run_command(Command::NewFile("x".to_string()));
    settle(&mut f);
    assert_eq!(f.fs.file_content("/ws/x.md"), None);
    let rec = f.rec.borrow();
    assert_eq!(rec.notices.last().map(|n| n.level), Some(NoticeLevel::Error));
}

#[test]
fn test_close_tab_and_user_closed_document() {
    let mut f = opened(&quiet_settings());
    open_file(&mut f, "a.md");
    open_file(&mut f, "b.md");

    f.workbench
        .handle_editor_event(EditorEvent::UserClosedDocument);
    assert_eq!(f.workbench.state().active_path(), Some("b.md"));

    edit(&mut f, "dirty");
    f.workbench.run_command(Command::CloseTab("b.md".to_string()));
    assert_eq!(f.workbench.state().active_path(), Some("a.md"));
    assert_eq!(
        f.rec.borrow().document.as_ref().map(|(name, _)| name.as_str()),
        Some("a.md")
    );
}

#[test]
fn test_read_failure_is_reported() {
    let mut f = opened(&quiet_settings());
    f.fs.fail_reads("/ws/a.md");
    open_file(&mut f, "a.md");

    let session = f.workbench.state().session().unwrap();
    assert!(session.open_files.is_empty());
    assert_eq!(
        f.rec.borrow().notices.last().map(|n| n.level),
        Some(NoticeLevel::Error)
    );
}

#[test]
fn test_quit_and_custom_commands() {
    let mut f = create_fixture(&quiet_settings());
    assert!(!f.workbench.run_command(Command::Custom("nope".to_string())));
    assert!(!f.workbench.should_quit());
    f.workbench.run_command(Command::Quit);
    assert!(f.workbench.should_quit());
}
