//! Object name validation and resolution.
//!
//! Rules for a client-supplied name:
//! - Must not contain a `..` segment (segments split on `/` and `\`)
//! - Leading directory components are stripped; only the basename is kept
//! - The basename must be non-empty and not `.`
//! - The basename must not contain NUL and must fit in 255 bytes
//! - The basename must not be the reserved staging directory name
//! - The resulting path must stay inside the canonical storage root, also
//!   after following any symlink already present under that name

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::object::SafePath;

/// Subdirectory of the storage root that holds in-flight uploads.
pub const STAGING_DIR: &str = ".staging";

/// Longest accepted basename, in bytes.
pub const MAX_NAME_LEN: usize = 255;

const SEPARATORS: &[char] = &['/', '\\'];

/// Reduce a raw client name to a safe basename.
///
/// This is the lexical half of [`NameResolver::resolve`]; it never touches
/// the filesystem.
///
/// # Examples
///
/// ```
/// use depot_store::names::sanitize_name;
///
/// assert_eq!(sanitize_name("report.pdf").unwrap(), "report.pdf");
/// assert_eq!(sanitize_name("C:\\Users\\me\\report.pdf").unwrap(), "report.pdf");
/// assert!(sanitize_name("../../etc/passwd").is_err());
/// assert!(sanitize_name("").is_err());
/// ```
pub fn sanitize_name(raw: &str) -> StoreResult<&str> {
    if raw.split(SEPARATORS).any(|segment| segment == "..") {
        return Err(StoreError::invalid_name(raw, "must not contain '..' segments"));
    }

    let base = raw.rsplit(SEPARATORS).next().unwrap_or(raw);

    if base.is_empty() {
        return Err(StoreError::invalid_name(raw, "name must not be empty"));
    }
    if base == "." {
        return Err(StoreError::invalid_name(raw, "name must not be '.'"));
    }
    if base.contains('\0') {
        return Err(StoreError::invalid_name(raw, "contains a NUL byte"));
    }
    if base.len() > MAX_NAME_LEN {
        return Err(StoreError::invalid_name(
            raw,
            format!("longer than {MAX_NAME_LEN} bytes"),
        ));
    }
    if base == STAGING_DIR {
        return Err(StoreError::invalid_name(raw, "reserved name"));
    }

    Ok(base)
}

/// Maps untrusted names to paths confined to one storage root.
#[derive(Clone, Debug)]
pub struct NameResolver {
    root: PathBuf,
}

impl NameResolver {
    /// Create a resolver for an existing directory.
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    pub(crate) fn with_canonical_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// The canonical storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate `raw` and return the path it maps to.
    ///
    /// Fails with [`StoreError::InvalidName`] when the name is degenerate or
    /// would resolve outside the root. An existing entry under the name is
    /// canonicalized and must still lie inside the root, so a symlink
    /// pointing elsewhere makes its name unusable. Dangling symlinks pass;
    /// the store never follows them.
    pub fn resolve(&self, raw: &str) -> StoreResult<SafePath> {
        let name = sanitize_name(raw)?;
        let path = self.root.join(name);

        if path.parent() != Some(self.root.as_path()) {
            return Err(StoreError::invalid_name(raw, "resolves outside the storage root"));
        }

        if fs::symlink_metadata(&path).is_ok() {
            match fs::canonicalize(&path) {
                Ok(canonical) if !canonical.starts_with(&self.root) => {
                    return Err(StoreError::invalid_name(
                        raw,
                        "resolves outside the storage root",
                    ));
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(SafePath::new(name, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn resolver() -> (TempDir, NameResolver) {
        let dir = TempDir::new().unwrap();
        let resolver = NameResolver::new(dir.path()).unwrap();
        (dir, resolver)
    }

    #[test]
    fn valid_simple_names() {
        assert_eq!(sanitize_name("a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_name("README").unwrap(), "README");
        assert_eq!(sanitize_name(".hidden").unwrap(), ".hidden");
        assert_eq!(sanitize_name("with space.bin").unwrap(), "with space.bin");
        assert_eq!(sanitize_name("v1..2.tar").unwrap(), "v1..2.tar");
    }

    #[test]
    fn strips_directory_components() {
        assert_eq!(sanitize_name("uploads/a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_name("/etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_name("./a.txt").unwrap(), "a.txt");
        assert_eq!(sanitize_name("C:\\tmp\\a.txt").unwrap(), "a.txt");
    }

    #[test]
    fn reject_traversal() {
        assert!(sanitize_name("..").is_err());
        assert!(sanitize_name("../a.txt").is_err());
        assert!(sanitize_name("../../etc/passwd").is_err());
        assert!(sanitize_name("a/../b").is_err());
        assert!(sanitize_name("..\\..\\windows\\win.ini").is_err());
    }

    #[test]
    fn reject_degenerate_names() {
        assert!(sanitize_name("").is_err());
        assert!(sanitize_name(".").is_err());
        assert!(sanitize_name("dir/").is_err());
        assert!(sanitize_name("/").is_err());
        assert!(sanitize_name("a\0b").is_err());
    }

    #[test]
    fn reject_overlong_name() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(sanitize_name(&long).is_err());
        let max = "x".repeat(MAX_NAME_LEN);
        assert!(sanitize_name(&max).is_ok());
    }

    #[test]
    fn reject_staging_name() {
        assert!(sanitize_name(STAGING_DIR).is_err());
        assert!(sanitize_name("nested/.staging").is_err());
    }

    #[test]
    fn error_carries_raw_name() {
        match sanitize_name("../x") {
            Err(StoreError::InvalidName { name, .. }) => assert_eq!(name, "../x"),
            other => panic!("expected InvalidName, got {other:?}"),
        }
    }

    #[test]
    fn resolve_joins_basename_to_root() {
        let (_dir, resolver) = resolver();
        let safe = resolver.resolve("docs/a.txt").unwrap();
        assert_eq!(safe.name(), "a.txt");
        assert_eq!(safe.path(), resolver.root().join("a.txt"));
    }

    #[test]
    fn resolve_is_case_sensitive() {
        let (_dir, resolver) = resolver();
        let lower = resolver.resolve("a.txt").unwrap();
        let upper = resolver.resolve("A.TXT").unwrap();
        assert_ne!(lower.path(), upper.path());
    }

    #[test]
    fn resolve_does_not_create_anything() {
        let (_dir, resolver) = resolver();
        let safe = resolver.resolve("ghost.txt").unwrap();
        assert!(!safe.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_rejects_symlink_escaping_root() {
        let (dir, resolver) = resolver();
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret"), b"x").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret"), dir.path().join("link"))
            .unwrap();

        assert!(matches!(
            resolver.resolve("link"),
            Err(StoreError::InvalidName { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_allows_symlink_inside_root() {
        let (dir, resolver) = resolver();
        std::fs::write(dir.path().join("target"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("target"), dir.path().join("alias"))
            .unwrap();

        assert!(resolver.resolve("alias").is_ok());
    }

    proptest! {
        #[test]
        fn resolved_paths_stay_in_root(raw in "[a-zA-Z0-9./\\\\_-]{0,40}") {
            let (_dir, resolver) = resolver();
            if let Ok(safe) = resolver.resolve(&raw) {
                prop_assert_eq!(safe.path().parent(), Some(resolver.root()));
                prop_assert!(!safe.name().contains('/'));
                prop_assert!(!safe.name().contains('\\'));
            }
        }

        #[test]
        fn parent_segments_always_rejected(
            prefix in "[a-z/]{0,10}",
            suffix in "[a-z.]{0,10}",
        ) {
            let raw = format!("{prefix}/../{suffix}");
            prop_assert!(
                matches!(sanitize_name(&raw), Err(StoreError::InvalidName { .. })),
                "{raw:?} was accepted"
            );
        }
    }
}
