use super::*;
use crate::kernel::services::ports::file::EntryKind;
use std::fs::File;
use tempfile::tempdir;

fn root_of(provider: &LocalFileSystem, dir: &Path) -> DirHandle {
    provider.open_root(dir).unwrap()
}

#[test]
fn test_open_root_requires_a_directory() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("note.md");
    File::create(&file_path).unwrap();

    let provider = LocalFileSystem::new();
    assert!(provider.open_root(dir.path()).is_ok());
    assert!(matches!(
        provider.open_root(&file_path),
        Err(FileError::NotADirectory(_))
    ));
    assert!(matches!(
        provider.open_root(&dir.path().join("missing")),
        Err(FileError::Read { .. })
    ));
}

#[test]
fn test_enumerate() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("subdir")).unwrap();
    File::create(dir.path().join("file1.md")).unwrap();
    File::create(dir.path().join("file2.txt")).unwrap();

    let provider = LocalFileSystem::new();
    let root = root_of(&provider, dir.path());
    let mut entries = provider.enumerate(&root).unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let summary: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.kind())).collect();
    assert_eq!(
        summary,
        vec![
            ("file1.md", EntryKind::File),
            ("file2.txt", EntryKind::File),
            ("subdir", EntryKind::Directory),
        ]
    );
}

#[test]
fn test_write_is_atomic_and_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("note.md");
    fs::write(&file_path, "old").unwrap();

    let provider = LocalFileSystem::new();
    let handle = FileHandle::new(&file_path);
    provider.write_text_atomic(&handle, "# new\n").unwrap();

    assert_eq!(provider.read_text(&handle).unwrap(), "# new\n");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| is_temp_file(&e.path()))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_write_to_deleted_file_is_stale() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("gone.md");
    fs::write(&file_path, "x").unwrap();
    let handle = FileHandle::new(&file_path);
    fs::remove_file(&file_path).unwrap();

    let provider = LocalFileSystem::new();
    let result = provider.write_text_atomic(&handle, "y");
    assert!(matches!(result, Err(FileError::StaleHandle(_))));
    assert!(!file_path.exists());
}

#[cfg(unix)]
#[test]
fn test_write_through_symlink_updates_target() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real.md");
    let link = dir.path().join("link.md");
    fs::write(&real, "old").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let provider = LocalFileSystem::new();
    provider
        .write_text_atomic(&FileHandle::new(&link), "new")
        .unwrap();

    assert_eq!(fs::read_to_string(&real).unwrap(), "new");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&link).unwrap(), "new");
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| is_temp_file(&e.path()))
        .collect();
    assert!(leftovers.is_empty());
}

#[cfg(unix)]
#[test]
fn test_write_through_dangling_symlink_is_stale() {
    let dir = tempdir().unwrap();
    let link = dir.path().join("link.md");
    std::os::unix::fs::symlink(dir.path().join("gone.md"), &link).unwrap();

    let provider = LocalFileSystem::new();
    assert!(matches!(
        provider.write_text_atomic(&FileHandle::new(&link), "new"),
        Err(FileError::StaleHandle(_))
    ));
}

#[test]
fn test_create_file_and_directory_are_idempotent() {
    let dir = tempdir().unwrap();
    let provider = LocalFileSystem::new();
    let root = root_of(&provider, dir.path());

    let sub = provider.create_directory(&root, "temp").unwrap();
    let again = provider.create_directory(&root, "temp").unwrap();
    assert_eq!(sub, again);

    let first = provider.create_file(&sub, "note.md").unwrap();
    assert!(first.created);
    provider.write_text_atomic(&first.handle, "keep").unwrap();

    let second = provider.create_file(&sub, "note.md").unwrap();
    assert!(!second.created);
    assert_eq!(provider.read_text(&second.handle).unwrap(), "keep");
}

#[test]
fn test_create_file_over_directory_fails() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("taken.md")).unwrap();
    let provider = LocalFileSystem::new();
    let root = root_of(&provider, dir.path());

    assert!(matches!(
        provider.create_file(&root, "taken.md"),
        Err(FileError::Create { .. })
    ));
}

#[test]
fn test_permission_granted_for_writable_dir() {
    let dir = tempdir().unwrap();
    let provider = LocalFileSystem::new();
    let root = root_of(&provider, dir.path());
    assert_eq!(provider.request_write_permission(&root), Permission::Granted);
}

#[test]
fn test_temp_file_names() {
    assert!(is_temp_file(Path::new("/ws/.a.md.mdnest-tmp")));
    assert!(!is_temp_file(Path::new("/ws/a.md")));
}
