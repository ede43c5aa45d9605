//! Abstraction over the file system used to resolve companion files.

use std::borrow::Cow;
use std::path::PathBuf;

/// Provides the bytes of auxiliary files referenced by a model.
///
/// Studio models may point at sibling files on disk (an external texture file
/// and demand-loaded sequence group files). Resolution is abstracted behind
/// this trait so models can be composed from a directory on disk, an archive,
/// or an in-memory table. `open` returns `None` when no file exists at `path`.
pub trait FileLoader {
    fn open(&self, path: &str) -> Option<Cow<'static, [u8]>>;
}

pub struct FileWithCallback<F> {
    callback: F,
}

impl<F> FileWithCallback<F>
where
    F: Fn(&str) -> Option<Cow<'static, [u8]>>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> FileLoader for FileWithCallback<F>
where
    F: Fn(&str) -> Option<Cow<'static, [u8]>>,
{
    fn open(&self, path: &str) -> Option<Cow<'static, [u8]>> {
        (self.callback)(path)
    }
}

/// Resolves companion files against a directory on disk.
pub struct DiskFileLoader {
    root: PathBuf,
}

impl DiskFileLoader {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl FileLoader for DiskFileLoader {
    fn open(&self, path: &str) -> Option<Cow<'static, [u8]>> {
        std::fs::read(self.root.join(path)).ok().map(Cow::Owned)
    }
}
