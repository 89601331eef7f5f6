//! 新建文件路径解析：`note` / `temp/sub/note.md` / `temp\sub\note`

use crate::models::TreeFilter;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NewFilePathError {
    #[error("invalid path segment `{0}`")]
    InvalidSegment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFilePath {
    pub dirs: Vec<String>,
    pub file_name: String,
}

impl NewFilePath {
    /// `Ok(None)` means the input was empty (the user cancelled).
    pub fn parse(input: &str, filter: &TreeFilter) -> Result<Option<Self>, NewFilePathError> {
        let normalized = input.trim().replace('\\', "/");
        let mut parts: Vec<String> = normalized
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        if let Some(bad) = parts.iter().find(|p| *p == "." || *p == "..") {
            return Err(NewFilePathError::InvalidSegment(bad.clone()));
        }

        let Some(mut file_name) = parts.pop() else {
            return Ok(None);
        };
        if !filter.is_markdown(&file_name) {
            file_name.push_str(&filter.suffix());
        }

        Ok(Some(Self {
            dirs: parts,
            file_name,
        }))
    }

    /// Slash-joined path relative to the root.
    pub fn relative_path(&self) -> String {
        if self.dirs.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.dirs.join("/"), self.file_name)
        }
    }

    /// Heading written into a freshly created file.
    pub fn initial_content(&self, filter: &TreeFilter) -> String {
        let suffix = filter.suffix();
        let stem = self
            .file_name
            .strip_suffix(suffix.as_str())
            .unwrap_or(&self.file_name);
        format!("# {stem}\n")
    }
}
