use std::path::{Path, PathBuf};

/// A validated location for a stored object.
///
/// Only [`NameResolver`](crate::NameResolver) constructs these, so holding a
/// `SafePath` means the path is a direct child of the storage root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafePath {
    name: String,
    path: PathBuf,
}

impl SafePath {
    pub(crate) fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }

    /// The sanitized object name (the file's basename).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The absolute on-disk path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for SafePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// One regular file found directly under the storage root.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectEntry {
    pub name: String,
    pub size: u64,
}

/// What a completed write did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    /// `true` if no entry existed under the name when the write landed.
    pub was_new_file: bool,
    /// Number of bytes now stored under the name.
    pub size: u64,
}
