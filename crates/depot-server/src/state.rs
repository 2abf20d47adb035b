use std::path::Path;
use std::sync::Arc;

use depot_store::{AccountingTracker, FsObjectStore, NameResolver, ObjectStore};

use crate::error::{ServerError, ServerResult};

/// Shared state handed to every request handler.
///
/// Cloning is cheap: the store and the tracker are reference counted, so all
/// handlers see the same upload counter.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ObjectStore>,
    resolver: NameResolver,
    tracker: Arc<AccountingTracker>,
}

impl AppState {
    /// Wrap an existing store, seeding the upload counter from its contents.
    pub fn new(store: Arc<dyn ObjectStore>) -> ServerResult<Self> {
        let resolver = NameResolver::new(store.root())?;
        let tracker = Arc::new(AccountingTracker::seeded_from(store.as_ref())?);
        Ok(Self {
            store,
            resolver,
            tracker,
        })
    }

    /// Open (or create) an on-disk store at `root` as its owning server,
    /// clearing uploads abandoned by a previous run.
    pub fn open(root: &Path) -> ServerResult<Self> {
        let store = FsObjectStore::open_and_recover(root)?;
        Self::new(Arc::new(store))
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn tracker(&self) -> &AccountingTracker {
        &self.tracker
    }

    /// Run blocking store work on tokio's blocking pool.
    pub async fn run_blocking<T, F>(&self, work: F) -> ServerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&AppState) -> ServerResult<T> + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || work(&state))
            .await
            .map_err(|e| ServerError::Internal(format!("storage task failed: {e}")))?
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("root", &self.resolver.root())
            .field("files_stored_total", &self.tracker.files_stored_total())
            .finish()
    }
}
