//! Scheme router for backend registration.
//!
//! Routes URL-addressed operations to the backend registered for the URL's
//! scheme. Registration is explicit and per router, so independent routers
//! (one per test, say) never see each other's backends.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use urlfs_types::{FsError, FsResult, Location, is_valid_scheme};

use super::memory::InternalFs;
use super::traits::{FileReader, FileSystem, FileWriter, WatchCallback, WatchHandle};
use crate::config::UrlfsConfig;

/// Scheme identifier conventionally used for [`InternalFs`].
pub const INTERNAL_SCHEME: &str = "internal";

/// Routes filesystem operations to backends by URL scheme.
///
/// Schemes are matched case-insensitively. The host component of the URL is
/// ignored; only the path reaches the backend.
#[derive(Default)]
pub struct SchemeRouter {
    /// Backends, keyed by lowercased scheme.
    backends: BTreeMap<String, Arc<dyn FileSystem>>,
}

impl fmt::Debug for SchemeRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeRouter")
            .field("schemes", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemeRouter {
    /// Create a router with no backends.
    pub fn new() -> Self {
        Self {
            backends: BTreeMap::new(),
        }
    }

    /// Create a router with a fresh [`InternalFs`] registered for
    /// [`INTERNAL_SCHEME`].
    ///
    /// The backend is returned alongside so tests can inspect it directly.
    pub fn with_internal() -> (Self, Arc<InternalFs>) {
        let fs = Arc::new(InternalFs::new());
        let mut router = Self::new();
        router.insert(INTERNAL_SCHEME.to_string(), fs.clone());
        (router, fs)
    }

    /// Build a router from configuration: one [`InternalFs`] under the
    /// configured scheme, preloaded with the configured files.
    ///
    /// Fails with [`FsError::InvalidScheme`] if the configured scheme could
    /// never appear in a URL.
    pub fn from_config(config: &UrlfsConfig) -> FsResult<(Self, Arc<InternalFs>)> {
        let fs = Arc::new(config.build_backend());
        let mut router = Self::new();
        router.register_arc(&config.scheme, fs.clone())?;
        Ok((router, fs))
    }

    /// Register a backend for `scheme`, replacing any previous one.
    pub fn register(
        &mut self,
        scheme: impl AsRef<str>,
        fs: impl FileSystem + 'static,
    ) -> FsResult<()> {
        self.register_arc(scheme, Arc::new(fs))
    }

    /// Register a backend (already wrapped in Arc) for `scheme`.
    ///
    /// The scheme must be a letter followed by letters, digits, `+`, `-` or
    /// `.`; anything else is rejected with [`FsError::InvalidScheme`].
    pub fn register_arc(
        &mut self,
        scheme: impl AsRef<str>,
        fs: Arc<dyn FileSystem>,
    ) -> FsResult<()> {
        let scheme = scheme.as_ref();
        if !is_valid_scheme(scheme) {
            return Err(FsError::InvalidScheme(scheme.to_string()));
        }
        self.insert(scheme.to_ascii_lowercase(), fs);
        Ok(())
    }

    fn insert(&mut self, scheme: String, fs: Arc<dyn FileSystem>) {
        if self.backends.insert(scheme.clone(), fs).is_some() {
            tracing::debug!(scheme = %scheme, "replaced filesystem backend");
        } else {
            tracing::debug!(scheme = %scheme, "registered filesystem backend");
        }
    }

    /// Remove the backend for `scheme`.
    ///
    /// Returns `true` if a backend was removed, `false` if none was registered.
    pub fn unregister(&mut self, scheme: &str) -> bool {
        let removed = self
            .backends
            .remove(&scheme.to_ascii_lowercase())
            .is_some();
        if removed {
            tracing::debug!(scheme, "unregistered filesystem backend");
        }
        removed
    }

    /// All registered schemes, sorted.
    pub fn schemes(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// The backend registered for `scheme`, if any.
    pub fn backend(&self, scheme: &str) -> Option<Arc<dyn FileSystem>> {
        self.backends.get(&scheme.to_ascii_lowercase()).cloned()
    }

    /// Split `url` and find the backend for its scheme.
    fn resolve(&self, url: &str) -> FsResult<(Arc<dyn FileSystem>, Location)> {
        let location = Location::parse(url)?;
        let fs = self
            .backends
            .get(&location.scheme)
            .cloned()
            .ok_or_else(|| FsError::NoBackend(location.scheme.clone()))?;
        Ok((fs, location))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn open_reader(&self, url: &str) -> FsResult<Box<dyn FileReader>> {
        let (fs, location) = self.resolve(url)?;
        fs.open_reader(&location.path).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn open_writer(&self, url: &str) -> FsResult<Box<dyn FileWriter>> {
        let (fs, location) = self.resolve(url)?;
        fs.open_writer(&location.path).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn open_appender(&self, url: &str) -> FsResult<Box<dyn FileWriter>> {
        let (fs, location) = self.resolve(url)?;
        fs.open_appender(&location.path).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_entries(&self, url: &str) -> FsResult<Vec<String>> {
        let (fs, location) = self.resolve(url)?;
        fs.list_entries(&location.path).await
    }

    #[tracing::instrument(level = "debug", skip(self, on_change))]
    pub async fn watch_file(&self, url: &str, on_change: WatchCallback) -> FsResult<WatchHandle> {
        let (fs, location) = self.resolve(url)?;
        fs.watch_file(&location.path, on_change).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn remove(&self, url: &str) -> FsResult<()> {
        let (fs, location) = self.resolve(url)?;
        fs.remove(&location.path).await
    }
}
