//! 快捷键：按键 → 命令

use super::settings::{parse_command, parse_keybinding};
use crate::core::event::Key;
use crate::core::event::KeyCode;
use crate::core::Command;
use crate::kernel::services::ports::KeybindingRule;
use rustc_hash::FxHashMap;

pub struct KeybindingService {
    global: FxHashMap<Key, Command>,
}

impl KeybindingService {
    pub fn new() -> Self {
        Self::with_defaults()
    }

    pub fn with_defaults() -> Self {
        Self {
            global: default_global_keybindings(),
        }
    }

    pub fn resolve(&self, key: &Key) -> Option<&Command> {
        self.global.get(key)
    }

    pub fn bindings(&self) -> &FxHashMap<Key, Command> {
        &self.global
    }

    pub fn bind(&mut self, key: Key, command: Command) {
        self.global.insert(key, command);
    }

    pub fn unbind(&mut self, key: &Key) -> Option<Command> {
        self.global.remove(key)
    }

    /// Applies user rules on top of the current bindings. An empty command
    /// removes the binding; unparsable keys are skipped.
    pub fn apply_rules(&mut self, rules: &[KeybindingRule]) {
        for rule in rules {
            let Some(key) = parse_keybinding(&rule.key) else {
                tracing::warn!(key = %rule.key, "unrecognized keybinding");
                continue;
            };
            if rule.command.trim().is_empty() {
                self.unbind(&key);
            } else {
                self.bind(key, parse_command(&rule.command));
            }
        }
    }
}

impl Default for KeybindingService {
    fn default() -> Self {
        Self::new()
    }
}

fn default_global_keybindings() -> FxHashMap<Key, Command> {
    let mut map = FxHashMap::default();
    map.insert(Key::ctrl(KeyCode::Char('s')), Command::SaveAll);
    map.insert(Key::super_key(KeyCode::Char('s')), Command::SaveAll);
    map
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/keybinding.rs"]
mod tests;
