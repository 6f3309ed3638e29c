//! Memoised access to scene documents.

use std::cell::Cell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use super::config::SceneConfig;
use super::error::{ConfigLoadError, Result};

/// Where scene documents come from
pub trait ConfigSource {
    /// Raw document text for `id`
    fn fetch(&self, id: &str) -> Result<String>;
}

/// Reads `<root>/<id>.json`
#[derive(Debug, Clone)]
pub struct FsConfigSource {
    root: PathBuf,
}

impl FsConfigSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: &str) -> Result<PathBuf> {
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !id.contains(['/', '\\']) => {
                Ok(self.root.join(format!("{id}.json")))
            }
            _ => Err(ConfigLoadError::InvalidId(id.to_string())),
        }
    }
}

impl ConfigSource for FsConfigSource {
    fn fetch(&self, id: &str) -> Result<String> {
        let path = self.document_path(id)?;
        log::debug!("reading scene config {}", path.display());
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigLoadError::NotFound(id.to_string()),
            _ => ConfigLoadError::Fetch {
                id: id.to_string(),
                reason: e.to_string(),
            },
        })
    }
}

/// In-memory documents, counting fetches
#[derive(Debug, Default)]
pub struct MemoryConfigSource {
    documents: HashMap<String, String>,
    fetches: Cell<usize>,
}

impl MemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, document: impl Into<String>) -> Self {
        self.insert(id, document);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, document: impl Into<String>) {
        self.documents.insert(id.into(), document.into());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.documents.remove(id)
    }

    /// Number of `fetch` calls so far, failed ones included
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl ConfigSource for MemoryConfigSource {
    fn fetch(&self, id: &str) -> Result<String> {
        self.fetches.set(self.fetches.get() + 1);
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigLoadError::NotFound(id.to_string()))
    }
}

/// Scene documents cached by id for the lifetime of the store.
///
/// A cached config is handed out as the same `Rc` every time. Failed loads
/// leave no entry behind.
#[derive(Debug, Default)]
pub struct SceneConfigStore {
    cache: HashMap<String, Rc<SceneConfig>>,
}

impl SceneConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached config for `id`, fetching and validating it on first use
    pub fn load(&mut self, source: &impl ConfigSource, id: &str) -> Result<Rc<SceneConfig>> {
        if let Some(config) = self.cache.get(id) {
            log::debug!("scene config {id} served from cache");
            return Ok(Rc::clone(config));
        }
        let text = source.fetch(id)?;
        self.ingest(id, &text)
    }

    /// Parse a document fetched elsewhere and cache it under `id`.
    /// An existing entry wins over the new text.
    pub fn ingest(&mut self, id: &str, text: &str) -> Result<Rc<SceneConfig>> {
        if let Some(config) = self.cache.get(id) {
            return Ok(Rc::clone(config));
        }
        let config = Rc::new(SceneConfig::from_json(text)?);
        log::info!(
            "loaded scene config {id}: {} modules, base model {}",
            config.modules.len(),
            if config.base_model.is_some() { "present" } else { "absent" }
        );
        self.cache.insert(id.to_string(), Rc::clone(&config));
        Ok(config)
    }

    pub fn cached(&self, id: &str) -> Option<Rc<SceneConfig>> {
        self.cache.get(id).cloned()
    }

    /// Drop one entry; absent ids are ignored
    pub fn invalidate(&mut self, id: &str) {
        self.cache.remove(id);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
