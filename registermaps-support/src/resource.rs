//! Resource resolution with per-kind LRU caches.
//!
//! # Naming
//!
//! Resources are addressed by `/`-separated names relative to the bundle
//! root. A leading [`RESOURCE_ROOT`] (`"resource/"`) is stripped once, so
//! `"resource/html/README.rst"` and `"html/README.rst"` are the same
//! resource and share a cache slot.
//!
//! # Stores
//!
//! | Store           | Source                                           |
//! |-----------------|--------------------------------------------------|
//! | [`BUNDLE`]      | Files under `resource/`, compiled into the crate |
//! | [`DirStore`]    | A directory on disk                              |
//! | [`MemoryStore`] | An in-process map, mostly for tests              |
//! | [`StoreChain`]  | Several stores; the first hit wins               |
//!
//! # Caching
//!
//! [`Resources`] memoizes `bytes`, `text`, and `template` independently, each
//! in an LRU of [`DEFAULT_CACHE_CAPACITY`] entries unless configured
//! otherwise. Resources are assumed immutable for the life of the process.

use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lru::LruCache;

use crate::encoding::{decode, DecodeErrors, Encoding, InvalidAt};
use crate::error::{io_err, SupportError};
use crate::template::{normalize_newlines, Template, TemplateEnvironment};

/// Prefix that may lead any resource name; stripped before lookup.
pub const RESOURCE_ROOT: &str = "resource/";

/// Entries kept per resolver kind before LRU eviction.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Name handling
// ---------------------------------------------------------------------------

/// Return `name` with one leading [`RESOURCE_ROOT`] removed, if present.
pub fn strip_resource(name: &str) -> &str {
    name.strip_prefix(RESOURCE_ROOT).unwrap_or(name)
}

/// Strip the root marker and reject names that cannot address a bundled file.
pub(crate) fn normalize(name: &str) -> Result<&str, SupportError> {
    let stripped = strip_resource(name);
    let escapes = stripped.is_empty()
        || stripped.starts_with('/')
        || stripped.contains('\\')
        || stripped.split('/').any(|part| part == "..");
    if escapes {
        tracing::warn!(name, "rejected resource name outside the bundle");
        return Err(SupportError::ResourceNotFound {
            name: name.to_string(),
        });
    }
    Ok(stripped)
}

/// Read `name` from `store`, turning absence into [`SupportError::ResourceNotFound`].
pub(crate) fn read_required(store: &dyn ResourceStore, name: &str) -> Result<Vec<u8>, SupportError> {
    tracing::debug!(name, store = %store.describe(), "reading resource");
    store
        .read(name)?
        .ok_or_else(|| SupportError::ResourceNotFound {
            name: name.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// A source of raw resource bytes.
///
/// `name` is already normalized. Implementations return `Ok(None)` when the
/// resource does not exist and reserve `Err` for real I/O failures.
pub trait ResourceStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SupportError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Resources compiled into the binary as a static `(name, bytes)` table.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedStore {
    entries: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedStore {
    pub const fn new(entries: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { entries }
    }

    /// Names of all embedded resources, in table order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl ResourceStore for EmbeddedStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SupportError> {
        Ok(self
            .entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, bytes)| bytes.to_vec()))
    }

    fn describe(&self) -> String {
        format!("embedded({} entries)", self.entries.len())
    }
}

/// The resources shipped with this crate, baked in via `include_bytes!`.
pub static BUNDLE: EmbeddedStore = EmbeddedStore::new(&[(
    "common/banner.tera",
    include_bytes!("../resource/common/banner.tera").as_slice(),
)]);

/// Resources read from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name>`, joining each `/`-separated component.
    pub fn path_of(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl ResourceStore for DirStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SupportError> {
        let path = self.path_of(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(path, e)),
        }
    }

    fn describe(&self) -> String {
        format!("dir({})", self.root.display())
    }
}

/// Resources held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource. A leading `resource/` is stripped.
    pub fn insert(&mut self, name: impl AsRef<str>, bytes: impl Into<Vec<u8>>) {
        let name = strip_resource(name.as_ref()).to_string();
        self.entries.insert(name, bytes.into());
    }
}

impl ResourceStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SupportError> {
        Ok(self.entries.get(name).cloned())
    }

    fn describe(&self) -> String {
        format!("memory({} entries)", self.entries.len())
    }
}

/// Several stores searched in order; the first one holding a name wins.
///
/// Used to layer a user override directory over [`BUNDLE`].
#[derive(Default)]
pub struct StoreChain {
    stores: Vec<Box<dyn ResourceStore>>,
}

impl StoreChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `store` with lower priority than every store already added.
    pub fn then(mut self, store: impl ResourceStore + 'static) -> Self {
        self.stores.push(Box::new(store));
        self
    }
}

impl ResourceStore for StoreChain {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SupportError> {
        for store in &self.stores {
            if let Some(bytes) = store.read(name)? {
                return Ok(Some(bytes));
            }
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.stores.iter().map(|s| s.describe()).collect();
        format!("chain[{}]", parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Cache statistics
// ---------------------------------------------------------------------------

/// Hit/miss counters for one resolver kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    pub hits: u64,
    pub misses: u64,
}

/// Hit/miss counters for all three resolver kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub bytes: KindStats,
    pub text: KindStats,
    pub templates: KindStats,
}

type TextKey = (String, Encoding, DecodeErrors);

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Cached resolver for bytes, text, and templates.
///
/// Not thread-safe; one instance serves one single-threaded process.
pub struct Resources {
    store: Rc<dyn ResourceStore>,
    env: TemplateEnvironment,
    bytes: RefCell<LruCache<String, Rc<[u8]>>>,
    text: RefCell<LruCache<TextKey, Rc<str>>>,
    templates: RefCell<LruCache<String, Rc<Template>>>,
    stats: RefCell<CacheStats>,
}

impl Resources {
    /// Resolver over `store` with [`DEFAULT_CACHE_CAPACITY`] entries per kind.
    pub fn new(store: impl ResourceStore + 'static) -> Self {
        let capacity =
            NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(store, capacity)
    }

    pub fn with_capacity(store: impl ResourceStore + 'static, capacity: NonZeroUsize) -> Self {
        let store: Rc<dyn ResourceStore> = Rc::new(store);
        Self {
            env: TemplateEnvironment::new(Rc::clone(&store)),
            store,
            bytes: RefCell::new(LruCache::new(capacity)),
            text: RefCell::new(LruCache::new(capacity)),
            templates: RefCell::new(LruCache::new(capacity)),
            stats: RefCell::new(CacheStats::default()),
        }
    }

    /// Resolver over the crate's embedded [`BUNDLE`].
    pub fn bundled() -> Self {
        Self::new(BUNDLE)
    }

    pub fn store(&self) -> &dyn ResourceStore {
        self.store.as_ref()
    }

    pub fn environment(&self) -> &TemplateEnvironment {
        &self.env
    }

    /// The entire resource as bytes.
    pub fn bytes(&self, name: &str) -> Result<Rc<[u8]>, SupportError> {
        let key = normalize(name)?;
        let cached = self.bytes.borrow_mut().get(key).cloned();
        if let Some(hit) = cached {
            self.stats.borrow_mut().bytes.hits += 1;
            return Ok(hit);
        }
        self.stats.borrow_mut().bytes.misses += 1;

        let data: Rc<[u8]> = read_required(self.store.as_ref(), key)?.into();
        self.bytes.borrow_mut().put(key.to_string(), Rc::clone(&data));
        Ok(data)
    }

    /// The resource decoded as strict UTF-8.
    pub fn text(&self, name: &str) -> Result<Rc<str>, SupportError> {
        self.text_with(name, Encoding::Utf8, DecodeErrors::Strict)
    }

    /// The resource decoded with `encoding`, applying `errors` to invalid input.
    ///
    /// Line endings are normalized to `\n`.
    pub fn text_with(
        &self,
        name: &str,
        encoding: Encoding,
        errors: DecodeErrors,
    ) -> Result<Rc<str>, SupportError> {
        let key: TextKey = (normalize(name)?.to_string(), encoding, errors);
        let cached = self.text.borrow_mut().get(&key).cloned();
        if let Some(hit) = cached {
            self.stats.borrow_mut().text.hits += 1;
            return Ok(hit);
        }
        self.stats.borrow_mut().text.misses += 1;

        let raw = read_required(self.store.as_ref(), &key.0)?;
        let decoded = decode(&raw, encoding, errors).map_err(|InvalidAt(offset)| {
            SupportError::Decode {
                name: key.0.clone(),
                encoding: encoding.name(),
                offset,
            }
        })?;
        let text: Rc<str> = normalize_newlines(decoded).into();
        self.text.borrow_mut().put(key, Rc::clone(&text));
        Ok(text)
    }

    /// The resource compiled as a template in the shared environment.
    pub fn template(&self, name: &str) -> Result<Rc<Template>, SupportError> {
        let key = normalize(name)?;
        let cached = self.templates.borrow_mut().get(key).cloned();
        if let Some(hit) = cached {
            self.stats.borrow_mut().templates.hits += 1;
            return Ok(hit);
        }
        self.stats.borrow_mut().templates.misses += 1;

        let template = Rc::new(self.env.get_template(key)?);
        self.templates
            .borrow_mut()
            .put(key.to_string(), Rc::clone(&template));
        Ok(template)
    }

    pub fn cache_stats(&self) -> CacheStats {
        *self.stats.borrow()
    }

    /// Drop every cached entry. Compiled templates stay in the environment.
    pub fn clear_caches(&self) {
        self.bytes.borrow_mut().clear();
        self.text.borrow_mut().clear();
        self.templates.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_resource_removes_prefix_once() {
        assert_eq!(strip_resource("resource/a.txt"), "a.txt");
        assert_eq!(strip_resource("resource/resource/a.txt"), "resource/a.txt");
        assert_eq!(strip_resource("a.txt"), "a.txt");
        assert_eq!(strip_resource("resources/a.txt"), "resources/a.txt");
    }

    #[test]
    fn normalize_rejects_escaping_names() {
        for bad in ["", "resource/", "/etc/passwd", "../x", "a/../../x", "a\\b"] {
            let err = normalize(bad).unwrap_err();
            assert!(err.is_not_found(), "{bad:?} should be rejected");
        }
        assert_eq!(normalize("resource/html/README.rst").unwrap(), "html/README.rst");
    }

    #[test]
    fn dir_store_joins_components() {
        let store = DirStore::new("/opt/bundle");
        assert_eq!(store.path_of("html/page.tera"), PathBuf::from("/opt/bundle/html/page.tera"));
    }

    #[test]
    fn chain_prefers_earlier_store() {
        let mut first = MemoryStore::new();
        first.insert("x", b"first".to_vec());
        let mut second = MemoryStore::new();
        second.insert("x", b"second".to_vec());
        second.insert("y", b"only-second".to_vec());
        let chain = StoreChain::new().then(first).then(second);

        assert_eq!(chain.read("x").unwrap().unwrap(), b"first");
        assert_eq!(chain.read("y").unwrap().unwrap(), b"only-second");
        assert!(chain.read("z").unwrap().is_none());
    }

    #[test]
    fn bundle_contains_banner() {
        assert!(BUNDLE.names().any(|n| n == "common/banner.tera"));
        assert!(BUNDLE.read("common/banner.tera").unwrap().is_some());
    }
}
