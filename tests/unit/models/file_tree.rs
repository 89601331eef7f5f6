use super::*;
use crate::kernel::services::adapters::file::MemoryFileSystem;
use crate::kernel::services::ports::FileError;
use std::path::Path;

fn sample_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
        .with_file("/ws/b.md", "b")
        .with_file("/ws/A.md", "a")
        .with_file("/ws/readme.txt", "skip")
        .with_file("/ws/notes/zeta.md", "z")
        .with_file("/ws/notes/alpha.MD", "upper-case extension")
        .with_file("/ws/.git/config.md", "hidden")
        .with_file("/ws/.draft.md", "hidden file")
        .with_dir("/ws/empty")
}

fn build(fs: &MemoryFileSystem) -> FileTree {
    let root = fs.open_root(Path::new("/ws")).unwrap();
    build_file_tree(fs, &root, &TreeFilter::default()).unwrap()
}

#[test]
fn test_new_tree() {
    let tree = FileTree::new_with_root(DirHandle::new("/ws"));
    assert!(tree.is_dir(tree.root()));
    assert!(tree.is_expanded(tree.root()));
    assert_eq!(tree.root_name(), "ws");
    assert_eq!(tree.find(""), Some(tree.root()));
}

#[test]
fn test_only_markdown_and_visible_dirs_are_kept() {
    let tree = build(&sample_fs());
    let root = tree.root();

    assert_eq!(
        tree.child_names(root),
        vec!["empty", "notes", ".draft.md", "A.md", "b.md"]
    );
    let notes = tree.find("notes").unwrap();
    assert_eq!(tree.child_names(notes), vec!["zeta.md"]);
    assert!(tree.find(".git").is_none());
    assert!(tree.find("readme.txt").is_none());
    assert_eq!(tree.file_count(), 4);
}

#[test]
fn test_siblings_sort_dirs_first_then_case_insensitive() {
    let fs = MemoryFileSystem::new()
        .with_file("/ws/beta.md", "")
        .with_file("/ws/Alpha.md", "")
        .with_file("/ws/zoo/x.md", "")
        .with_file("/ws/Docs/y.md", "");
    let tree = build(&fs);

    assert_eq!(
        tree.child_names(tree.root()),
        vec!["Docs", "zoo", "Alpha.md", "beta.md"]
    );
}

#[test]
fn test_case_only_names_put_lowercase_first() {
    assert_eq!(
        compare_entries(NodeKind::File, "note.md", NodeKind::File, "Note.md"),
        std::cmp::Ordering::Less
    );
    assert_eq!(
        compare_entries(NodeKind::File, "a.md", NodeKind::Dir, "z"),
        std::cmp::Ordering::Greater
    );
}

#[test]
fn test_paths_and_handles() {
    let tree = build(&sample_fs());

    let id = tree.find("notes/zeta.md").unwrap();
    assert_eq!(tree.path(id), Some("notes/zeta.md"));
    assert_eq!(tree.kind(id), Some(NodeKind::File));
    assert_eq!(tree.parent(id), tree.find("notes"));

    let handle = tree.file_handle("notes/zeta.md").unwrap();
    assert_eq!(handle.location(), Path::new("/ws/notes/zeta.md"));
    assert!(tree.file_handle("notes").is_none());
    assert!(tree.file_handle("missing.md").is_none());
}

#[test]
fn test_insert_child_rejects_duplicates_and_file_parents() {
    let mut tree = FileTree::new_with_root(DirHandle::new("/ws"));
    let root = tree.root();
    let file = tree
        .insert_child(
            root,
            "a.md".into(),
            EntryHandle::File(FileHandle::new("/ws/a.md")),
        )
        .unwrap();

    assert!(matches!(
        tree.insert_child(
            root,
            "a.md".into(),
            EntryHandle::File(FileHandle::new("/ws/a.md"))
        ),
        Err(FileTreeError::NameExists)
    ));
    assert!(matches!(
        tree.insert_child(
            file,
            "b.md".into(),
            EntryHandle::File(FileHandle::new("/ws/a.md/b.md"))
        ),
        Err(FileTreeError::ParentNotDirectory)
    ));
}

#[test]
fn test_enumeration_failure_fails_the_build() {
    let fs = sample_fs();
    fs.fail_enumerate("/ws/notes");
    let root = fs.open_root(Path::new("/ws")).unwrap();

    let result = build_file_tree(&fs, &root, &TreeFilter::default());
    assert!(matches!(result, Err(FileError::Enumerate { .. })));
}

#[test]
fn test_custom_extension() {
    let fs = MemoryFileSystem::new()
        .with_file("/ws/a.md", "")
        .with_file("/ws/b.markdown", "");
    let root = fs.open_root(Path::new("/ws")).unwrap();
    let tree = build_file_tree(&fs, &root, &TreeFilter::new(".markdown", '_')).unwrap();

    assert_eq!(tree.child_names(tree.root()), vec!["b.markdown"]);
}

#[test]
fn test_flatten_respects_collapse() {
    let mut tree = build(&sample_fs());

    let rows = tree.flatten_for_view();
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["empty", "notes", "zeta.md", ".draft.md", "A.md", "b.md"]
    );
    assert_eq!(rows[2].depth, 1);

    assert!(tree.toggle_path("notes"));
    let names: Vec<_> = tree
        .flatten_for_view()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert!(!names.contains(&"zeta.md".to_string()));
    assert!(!tree.toggle_path("b.md"));
}

#[test]
fn test_collapsed_paths_survive_rebuild() {
    let fs = sample_fs();
    let mut tree = build(&fs);
    tree.toggle_path("notes");
    let collapsed = tree.collapsed_paths();
    assert_eq!(collapsed, vec!["notes".to_string()]);

    fs.insert_file("/ws/notes/new.md", "");
    let mut rebuilt = build(&fs);
    rebuilt.collapse_paths(collapsed.iter().map(String::as_str));

    assert!(!rebuilt.is_expanded(rebuilt.find("notes").unwrap()));
    assert!(rebuilt.is_expanded(rebuilt.find("empty").unwrap()));
}

#[test]
fn test_select_path() {
    let mut tree = build(&sample_fs());

    assert!(tree.select_path(Some("notes/zeta.md")));
    assert_eq!(tree.selected_path(), Some("notes/zeta.md"));
    assert!(!tree.select_path(Some("notes/zeta.md")));

    assert!(tree.select_path(Some("missing.md")));
    assert_eq!(tree.selected(), None);
    assert!(!tree.select_path(None));
}
