//! Scope guard that closes an archive handle exactly once.

use tracing::warn;
use unarc_core::ArchiveHandle;
use unarc_core::error::Result;

/// Owns an opened handle and closes it on every exit path.
///
/// [`release`](Self::release) closes explicitly and reports the outcome.
/// Any other way out (an early `?` return, a panic) closes from `Drop`, where
/// a close failure can only be logged.
pub(crate) struct HandleGuard {
    handle: Box<dyn ArchiveHandle>,
    closed: bool,
}

impl HandleGuard {
    pub(crate) fn new(handle: Box<dyn ArchiveHandle>) -> Self {
        Self {
            handle,
            closed: false,
        }
    }

    pub(crate) fn handle(&mut self) -> &mut dyn ArchiveHandle {
        self.handle.as_mut()
    }

    pub(crate) fn release(mut self) -> Result<()> {
        self.closed = true;
        self.handle.close()
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.handle.close() {
            warn!(format = self.handle.format_name(), error = %e, "failed to close archive");
        }
    }
}
