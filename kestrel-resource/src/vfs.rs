//! Virtual file system collaborator (spec §6 "Virtual File System"). The
//! core never touches the real filesystem directly; every asset path is
//! resolved through an implementation of this trait.

use std::io::Read;
use std::path::{Path, PathBuf};

use kestrel_core::{EngineError, EngineResult};

/// `{locate, open, add_search_path, remove_search_path}` from spec §6.
pub trait VirtualFileSystem {
    /// Resolves `path` against the search paths, returning the canonical
    /// location if found.
    fn locate(&self, path: &Path) -> Option<PathBuf>;

    /// Opens a located path as a byte stream.
    fn open(&self, path: &Path) -> EngineResult<Box<dyn Read>>;

    fn add_search_path(&mut self, path: &Path) -> bool;

    fn remove_search_path(&mut self, path: &Path);
}

/// Resolves `path` through `vfs`, turning a miss into [`EngineError::NotFound`]
/// rather than leaving callers to match on `Option` at every call site.
pub fn locate_or_not_found(
    vfs: &dyn VirtualFileSystem,
    path: &Path,
) -> EngineResult<PathBuf> {
    vfs.locate(path).ok_or(EngineError::NotFound)
}
