//! Cancellation source - polled, never blocking.
//!
//! Cancellation is owned by an external controller. The dispatcher only
//! reads it, once per poll iteration; once it reads `true` it stays `true`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Read-only view of a run's kill switch
pub trait CancellationSource {
    fn is_cancelled(&self) -> bool;
}

impl CancellationSource for CancellationToken {
    #[inline]
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl CancellationSource for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: CancellationSource + ?Sized> CancellationSource for Arc<T> {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancellationSource + ?Sized> CancellationSource for &T {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// For runs without an external controller
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationSource for NeverCancelled {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}
