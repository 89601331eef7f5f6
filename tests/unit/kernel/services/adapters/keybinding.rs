use super::*;
use crate::core::event::KeyModifiers;

fn rule(key: &str, command: &str) -> KeybindingRule {
    KeybindingRule {
        key: key.to_string(),
        command: command.to_string(),
    }
}

#[test]
fn save_all_is_bound_to_ctrl_and_cmd_s() {
    let service = KeybindingService::new();
    assert_eq!(
        service.resolve(&Key::ctrl(KeyCode::Char('s'))),
        Some(&Command::SaveAll)
    );
    assert_eq!(
        service.resolve(&Key::super_key(KeyCode::Char('s'))),
        Some(&Command::SaveAll)
    );
}

#[test]
fn plain_s_is_not_bound() {
    let service = KeybindingService::new();
    assert_eq!(service.resolve(&Key::simple(KeyCode::Char('s'))), None);
    assert_eq!(
        service.resolve(&Key::new(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL | KeyModifiers::ALT
        )),
        None
    );
}

#[test]
fn rules_rebind_and_unbind() {
    let mut service = KeybindingService::new();
    service.apply_rules(&[
        rule("ctrl+s", ""),
        rule("ctrl+shift+s", "saveAll"),
        rule("f5", "refreshTree"),
        rule("ctrl+nonsense", "saveAll"),
    ]);

    assert_eq!(service.resolve(&Key::ctrl(KeyCode::Char('s'))), None);
    assert_eq!(
        service.resolve(&Key::ctrl(KeyCode::Char('S'))),
        Some(&Command::SaveAll)
    );
    assert_eq!(
        service.resolve(&Key::simple(KeyCode::F(5))),
        Some(&Command::RefreshTree)
    );
    assert_eq!(service.bindings().len(), 3);
}

#[test]
fn unknown_command_names_become_custom() {
    let mut service = KeybindingService::new();
    service.apply_rules(&[rule("alt+p", "plugin.doThing")]);
    assert_eq!(
        service.resolve(&Key::new(KeyCode::Char('p'), KeyModifiers::ALT)),
        Some(&Command::Custom("plugin.doThing".to_string()))
    );
}
