//! 行命令宿主：把标准输入的命令行当作宿主 UI，驱动 Workbench。
//!
//! 编辑器是一个内存文档，确认框和提示直接读写终端。

use super::workbench::Workbench;
use crate::core::Command;
use crate::kernel::services::adapters::{parse_keybinding, AppMessage, AsyncRuntime};
use crate::kernel::services::ports::{
    Confirm, Confirmation, EditorBridge, EditorEvent, FileSystem, Notifier, Settings,
};
use crate::kernel::{Notice, NoticeLevel};
use crate::models::TreeFilter;
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(50);

const HELP: &str = "\
commands:
  open <dir>          open a folder as the root
  tree                print the directory tree
  toggle <dir>        expand/collapse a directory
  refresh             rebuild the tree
  open-file <path>    open (or switch to) a file
  tabs                list open files
  close <path>        close a tab
  new <path>          create a markdown file (e.g. notes/today)
  edit <text>         replace the editor text (\\n for newlines)
  append <text>       append a line to the editor text
  show                print the editor document
  close-editor        close the document in the editor only
  save [path]         save one file (default: active)
  save-all            save every modified file
  key <chord>         press a key chord, e.g. ctrl+s
  quit";

#[derive(Debug, Clone, Default)]
pub struct ConsoleDocument {
    pub name: String,
    pub text: String,
}

type SharedDocument = Rc<RefCell<Option<ConsoleDocument>>>;
type SharedLines = Rc<RefCell<Receiver<String>>>;

/// In-memory single-document editor.
pub struct ConsoleEditor {
    document: SharedDocument,
}

impl EditorBridge for ConsoleEditor {
    fn bind_document(&mut self, name: &str, text: &str) {
        *self.document.borrow_mut() = Some(ConsoleDocument {
            name: name.to_string(),
            text: text.to_string(),
        });
    }

    fn unbind(&mut self) {
        *self.document.borrow_mut() = None;
    }
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: &Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warn => "warn",
            NoticeLevel::Error => "error",
        };
        println!("[{tag}] {}", notice.message);
    }

    fn set_status(&mut self, text: &str) {
        println!("-- {text}");
    }
}

/// Reads the answer from the same line stream the shell consumes.
pub struct ConsoleConfirm {
    lines: SharedLines,
}

impl Confirm for ConsoleConfirm {
    fn confirm(&mut self, prompt: &str) -> Confirmation {
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();
        match self.lines.borrow().recv() {
            Ok(answer) if matches!(answer.trim(), "y" | "Y" | "yes") => Confirmation::Accepted,
            _ => Confirmation::Declined,
        }
    }
}

pub struct Shell {
    workbench: Workbench,
    app_rx: Receiver<AppMessage>,
    lines: SharedLines,
    document: SharedDocument,
}

impl Shell {
    pub fn new(fs: Arc<dyn FileSystem>, settings: &Settings) -> io::Result<Self> {
        let (app_tx, app_rx) = mpsc::channel();
        let runtime = AsyncRuntime::new(app_tx, fs, TreeFilter::from_settings(settings))?;

        let (line_tx, line_rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("stdin".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        let lines: SharedLines = Rc::new(RefCell::new(line_rx));
        let document: SharedDocument = Rc::new(RefCell::new(None));
        let workbench = Workbench::new(
            runtime,
            Box::new(ConsoleEditor {
                document: Rc::clone(&document),
            }),
            Box::new(ConsoleConfirm {
                lines: Rc::clone(&lines),
            }),
            Box::new(ConsoleNotifier),
            settings,
        );

        Ok(Self {
            workbench,
            app_rx,
            lines,
            document,
        })
    }

    pub fn run(&mut self, root: Option<PathBuf>) {
        if let Some(root) = root {
            self.workbench.run_command(Command::OpenRoot(root));
        }

        let mut input_closed = false;
        while !self.workbench.should_quit() {
            // one line at a time, so a script never races its own results
            if self.workbench.is_idle() {
                let next = self.lines.borrow().try_recv();
                match next {
                    Ok(line) => self.execute(&line),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        if input_closed {
                            break;
                        }
                        input_closed = true;
                    }
                }
            }

            match self.app_rx.recv_timeout(TICK) {
                Ok(msg) => {
                    self.workbench.handle_message(msg);
                    while let Ok(msg) = self.app_rx.try_recv() {
                        self.workbench.handle_message(msg);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.workbench.tick();
        }
        tracing::info!("shell exiting");
    }

    fn execute(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        match verb {
            "help" | "?" => println!("{HELP}"),
            "open" => self.dispatch(Command::OpenRoot(PathBuf::from(arg))),
            "tree" => self.print_tree(),
            "toggle" => self.dispatch(Command::ToggleDir(arg.to_string())),
            "refresh" => self.dispatch(Command::RefreshTree),
            "open-file" | "switch" => self.dispatch(Command::OpenFile(arg.to_string())),
            "tabs" => self.print_tabs(),
            "close" => self.dispatch(Command::CloseTab(arg.to_string())),
            "new" => self.dispatch(Command::NewFile(arg.to_string())),
            "edit" => self.edit(|_| arg.replace("\\n", "\n")),
            "append" => self.edit(|text| {
                let mut text = text.to_string();
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(arg);
                text.push('\n');
                text
            }),
            "show" => match self.document.borrow().as_ref() {
                Some(doc) => println!("== {} ==\n{}", doc.name, doc.text),
                None => println!("(no document)"),
            },
            "close-editor" => {
                *self.document.borrow_mut() = None;
                self.workbench
                    .handle_editor_event(EditorEvent::UserClosedDocument);
            }
            "save" => {
                let path = if arg.is_empty() {
                    self.workbench.state().active_path().map(str::to_string)
                } else {
                    Some(arg.to_string())
                };
                match path {
                    Some(path) => self.dispatch(Command::Save(path)),
                    None => println!("no active file"),
                }
            }
            "save-all" => self.dispatch(Command::SaveAll),
            "key" => match parse_keybinding(arg) {
                Some(key) => {
                    if !self.workbench.handle_key(key).is_consumed() {
                        println!("(unbound key {arg})");
                    }
                }
                None => println!("cannot parse key `{arg}`"),
            },
            "quit" | "exit" => self.dispatch(Command::Quit),
            other => println!("unknown command `{other}`, try `help`"),
        }
    }

    fn dispatch(&mut self, command: Command) {
        let _ = self.workbench.run_command(command);
    }

    fn edit(&mut self, change: impl FnOnce(&str) -> String) {
        let text = {
            let mut document = self.document.borrow_mut();
            let Some(doc) = document.as_mut() else {
                println!("(no document)");
                return;
            };
            doc.text = change(&doc.text);
            doc.text.clone()
        };
        self.workbench
            .handle_editor_event(EditorEvent::ContentChanged(text));
    }

    fn print_tree(&self) {
        let Some(session) = self.workbench.state().session() else {
            println!("(no folder open)");
            return;
        };
        println!("{}/", session.root_name());
        for row in session.tree.flatten_for_view() {
            let indent = "  ".repeat(row.depth as usize + 1);
            let marker = match (row.is_dir, row.is_expanded) {
                (true, true) => "v ",
                (true, false) => "> ",
                (false, _) => "  ",
            };
            let selected = if row.is_selected { " <" } else { "" };
            println!("{indent}{marker}{}{selected}", row.name);
        }
    }

    fn print_tabs(&self) {
        let Some(session) = self.workbench.state().session() else {
            println!("(no folder open)");
            return;
        };
        for path in session.open_files.paths() {
            let active = if session.is_active(path) { "*" } else { " " };
            let dirty = if session.open_files.is_dirty(path) {
                " (modified)"
            } else {
                ""
            };
            println!("{active} {path}{dirty}");
        }
    }
}
