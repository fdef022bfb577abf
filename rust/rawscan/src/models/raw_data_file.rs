use std::ops::{
    Deref,
    DerefMut,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};
use tracing::debug;

use crate::errors::{
    ParseError,
    ScanAccessError,
};
use crate::traits::ParserHandle;

type HandleSlot = Option<Box<dyn ParserHandle>>;

/// One imported raw file and the parser that reads it.
///
/// The parser handle lives in a mutex-guarded slot. Every read goes through
/// that lock, and [`RawDataFile::dispose`] takes the same lock to empty the
/// slot, so a read either finishes before disposal or sees an empty slot.
/// There is no window in which a released parser can be touched.
///
/// Scans hold an `Arc<RawDataFile>`. Sharing the `Arc` keeps the metadata
/// (name, path) alive, but does not keep the parser alive: once disposed,
/// the file stays disposed.
pub struct RawDataFile {
    name: String,
    path: Option<PathBuf>,
    format_name: &'static str,
    handle: Mutex<HandleSlot>,
}

impl RawDataFile {
    pub fn new(
        name: impl Into<String>,
        path: Option<PathBuf>,
        parser: Box<dyn ParserHandle>,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            format_name: parser.format_name(),
            handle: Mutex::new(Some(parser)),
        }
    }

    /// Shorthand for an in-memory or otherwise path-less source.
    pub fn from_parser(
        name: impl Into<String>,
        parser: impl ParserHandle + 'static,
    ) -> Arc<Self> {
        Arc::new(Self::new(name, None, Box::new(parser)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn format_name(&self) -> &'static str {
        self.format_name
    }

    // The slot is a plain Option, a panic while it was held cannot leave it
    // half updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, HandleSlot> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locked access to the live parser, `None` once the file is disposed.
    ///
    /// The returned guard holds the file's lock: other extractions and
    /// [`RawDataFile::dispose`] wait until it is dropped.
    pub fn parser_handle(&self) -> Option<ParserHandleGuard<'_>> {
        let guard = self.lock();
        if guard.is_some() {
            Some(ParserHandleGuard { guard })
        } else {
            None
        }
    }

    /// Runs `f` against the live parser, under the lock.
    pub fn with_parser<R>(
        &self,
        f: impl FnOnce(&mut dyn ParserHandle) -> Result<R, ParseError>,
    ) -> Result<R, ScanAccessError> {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(handle) => Ok(f(&mut **handle)?),
            None => Err(ScanAccessError::ResourceDisposed {
                file: self.name.clone(),
            }),
        }
    }

    /// Releases the parser. Idempotent.
    ///
    /// Returns `true` only for the call that actually released it; the
    /// parser's `close` runs exactly once.
    pub fn dispose(&self) -> bool {
        let taken = self.lock().take();
        match taken {
            Some(mut handle) => {
                debug!("Disposing raw data file {}", self.name);
                handle.close();
                true
            }
            None => false,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().is_none()
    }
}

impl Drop for RawDataFile {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for RawDataFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDataFile")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("format_name", &self.format_name)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Exclusive access to a live parser handle. See [`RawDataFile::parser_handle`].
pub struct ParserHandleGuard<'a> {
    guard: MutexGuard<'a, HandleSlot>,
}

impl Deref for ParserHandleGuard<'_> {
    type Target = dyn ParserHandle;

    fn deref(&self) -> &Self::Target {
        self.guard
            .as_deref()
            .expect("Guard is only built around a live handle")
    }
}

impl DerefMut for ParserHandleGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
            .as_deref_mut()
            .expect("Guard is only built around a live handle")
    }
}
