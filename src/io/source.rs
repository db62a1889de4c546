use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::util::sanitize_path;

/// A read-only store of declared package files, keyed by manifest href.
pub trait ContentSource {
    /// Whether a file exists for `href`.
    fn contains(&self, href: &str) -> bool;

    /// Read the full contents of `href`.
    ///
    /// A missing file must be reported as [`io::ErrorKind::NotFound`].
    fn read(&self, href: &str) -> io::Result<Vec<u8>>;
}

// --- Implementation: Build directory ---

/// Files under a build output directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an href below the root, refusing anything that escapes it.
    fn resolve(&self, href: &str) -> Option<PathBuf> {
        let relative = PathBuf::from(sanitize_path(href));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ContentSource for DirSource {
    fn contains(&self, href: &str) -> bool {
        self.resolve(href).is_some_and(|p| p.is_file())
    }

    fn read(&self, href: &str) -> io::Result<Vec<u8>> {
        match self.resolve(href) {
            Some(path) => fs::read(path),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("href escapes the build directory: {href}"),
            )),
        }
    }
}

// --- Implementation: In-memory ---

/// Files held in memory, for tests and generated content.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, href: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(sanitize_path(&href.into()), data.into());
    }

    pub fn with_file(mut self, href: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(href, data);
        self
    }
}

impl ContentSource for MemorySource {
    fn contains(&self, href: &str) -> bool {
        self.files.contains_key(&sanitize_path(href))
    }

    fn read(&self, href: &str) -> io::Result<Vec<u8>> {
        self.files.get(&sanitize_path(href)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {href}"))
        })
    }
}

impl<S: ContentSource + ?Sized> ContentSource for &S {
    fn contains(&self, href: &str) -> bool {
        (**self).contains(href)
    }

    fn read(&self, href: &str) -> io::Result<Vec<u8>> {
        (**self).read(href)
    }
}
