use super::*;

#[test]
fn test_get_log_dir() {
    let dir = get_log_dir();
    // 在测试环境中应该能获取到目录
    assert!(dir.is_some());
    let dir = dir.unwrap();
    assert!(dir.to_string_lossy().contains(APP_NAME));
    assert!(dir.ends_with(LOG_DIR));
}

#[test]
fn test_settings_live_next_to_logs() {
    let settings = get_settings_path().unwrap();
    let logs = get_log_dir().unwrap();
    assert!(settings.ends_with(SETTINGS_FILE));
    assert_eq!(settings.parent(), logs.parent());
}
