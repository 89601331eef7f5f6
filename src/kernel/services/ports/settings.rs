use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autosave_interval_secs: u64,
    pub markdown_extension: String,
    pub hidden_marker: char,
    pub watch_workspace: bool,
    pub keybindings: Vec<KeybindingRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeybindingRule {
    pub key: String,
    pub command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_interval_secs: 5,
            markdown_extension: "md".to_string(),
            hidden_marker: '.',
            watch_workspace: true,
            keybindings: vec![
                KeybindingRule {
                    key: "ctrl+s".to_string(),
                    command: "saveAll".to_string(),
                },
                KeybindingRule {
                    key: "super+s".to_string(),
                    command: "saveAll".to_string(),
                },
            ],
        }
    }
}
