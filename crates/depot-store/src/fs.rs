use std::fs;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::names::{NameResolver, STAGING_DIR};
use crate::object::{ObjectEntry, SafePath, WriteOutcome};
use crate::traits::ObjectStore;

const STAGING_PREFIX: &str = "upload-";
const OPEN_ATTEMPTS: usize = 8;

/// Object store backed by one flat directory on local disk.
///
/// Uploads are staged in a temporary file under `<root>/.staging`, synced,
/// and then moved into place with a single rename, so the target name only
/// ever points at complete content. The staging area lives on the same
/// filesystem as the root, which keeps the rename atomic.
pub struct FsObjectStore {
    root: PathBuf,
    staging: PathBuf,
}

impl FsObjectStore {
    /// Open a store at `root`, creating the directory and its staging area
    /// if needed.
    ///
    /// Files already in the staging area are left alone; another process
    /// may be writing them.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        fs::create_dir_all(root.as_ref())?;
        let root = fs::canonicalize(root.as_ref())?;
        let staging = root.join(STAGING_DIR);
        fs::create_dir_all(&staging)?;

        info!(root = %root.display(), "opened file store");
        Ok(Self { root, staging })
    }

    /// Open a store at `root` as its owning server and remove temporaries
    /// left in the staging area by an interrupted process.
    ///
    /// Only the single process serving `root` may call this.
    pub fn open_and_recover(root: impl AsRef<Path>) -> StoreResult<Self> {
        let store = Self::open(root)?;
        let swept = sweep_staging(&store.staging)?;
        if swept > 0 {
            warn!(count = swept, "removed stale staging files");
        }
        Ok(store)
    }

    /// Open an existing store without modifying anything on disk.
    ///
    /// Fails with [`StoreError::Io`] if `root` does not exist. Writes through
    /// the returned store create the staging area on first use.
    pub fn open_existing(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !fs::metadata(&root)?.is_dir() {
            return Err(
                io::Error::other(format!("{} is not a directory", root.display())).into(),
            );
        }
        let staging = root.join(STAGING_DIR);
        debug!(root = %root.display(), "opened file store read-only");
        Ok(Self { root, staging })
    }

    /// A resolver confined to this store's root.
    pub fn resolver(&self) -> NameResolver {
        NameResolver::with_canonical_root(self.root.clone())
    }

    fn stage(&self) -> io::Result<NamedTempFile> {
        let builder = || {
            tempfile::Builder::new()
                .prefix(STAGING_PREFIX)
                .tempfile_in(&self.staging)
        };
        match builder() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.staging)?;
                builder()
            }
            other => other,
        }
    }
}

fn sweep_staging(staging: &Path) -> StoreResult<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(staging)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(removed)
}

/// Open `path` only if it is a regular file, never through a symlink.
///
/// Returns `None` when nothing usable is there. The opened handle is
/// checked against the directory entry after the open, so an entry swapped
/// for a symlink in between is never read.
fn open_regular(path: &Path) -> io::Result<Option<File>> {
    for _ in 0..OPEN_ATTEMPTS {
        if !is_regular_file(path)? {
            return Ok(None);
        }
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if opened_entry_matches(path, &file)? {
            return Ok(Some(file));
        }
        // Replaced between the check and the open; look again.
    }
    Err(io::Error::other(format!(
        "{} kept changing while being opened",
        path.display()
    )))
}

/// Whether `file` is the regular file currently linked at `path`.
fn opened_entry_matches(path: &Path, file: &File) -> io::Result<bool> {
    let opened = file.metadata()?;
    let entry = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    Ok(opened.is_file() && entry.file_type().is_file() && same_file(&opened, &entry))
}

#[cfg(unix)]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    a.len() == b.len() && a.modified().ok() == b.modified().ok()
}

fn is_regular_file(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.file_type().is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl ObjectStore for FsObjectStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, target: &SafePath) -> StoreResult<bool> {
        Ok(is_regular_file(target.path())?)
    }

    fn write(&self, target: &SafePath, content: &[u8]) -> StoreResult<WriteOutcome> {
        let mut staged = self.stage()?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;

        // A no-clobber persist fails with AlreadyExists when the name is
        // taken, which decides newness atomically; then replace the old entry.
        let was_new_file = match staged.persist_noclobber(target.path()) {
            Ok(_) => true,
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                e.file.persist(target.path()).map_err(|e| e.error)?;
                false
            }
            Err(e) => return Err(e.error.into()),
        };

        let size = content.len() as u64;
        debug!(name = target.name(), size, was_new_file, "stored object");
        Ok(WriteOutcome { was_new_file, size })
    }

    fn read(&self, target: &SafePath) -> StoreResult<Bytes> {
        let not_found = || StoreError::NotFound {
            name: target.name().to_string(),
        };

        let mut file = match open_regular(target.path())? {
            Some(file) => file,
            None => return Err(not_found()),
        };
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        debug!(name = target.name(), size = data.len(), "read object");
        Ok(Bytes::from(data))
    }

    fn list(&self) -> StoreResult<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(name = ?raw, "skipping entry with non-UTF-8 name");
                    continue;
                }
            };
            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                // Removed out of band since read_dir returned it.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            entries.push(ObjectEntry { name, size });
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for FsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsObjectStore")
            .field("root", &self.root)
            .finish()
    }
}
