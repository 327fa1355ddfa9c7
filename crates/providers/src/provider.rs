//! The provider trait every platform source implements.

use async_trait::async_trait;
use napwatch_core::platform::{FetchFailure, PlatformTarget, RawSnapshot};

/// Retrieves one platform's currently published identity snapshot.
///
/// Implementations must never panic on bad input or transport errors; every
/// failure is reported as a [`FetchFailure`].
#[async_trait]
pub trait PlatformProvider: Send + Sync {
    async fn fetch_snapshot(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure>;
}

#[async_trait]
impl<P: PlatformProvider + ?Sized> PlatformProvider for std::sync::Arc<P> {
    async fn fetch_snapshot(&self, target: &PlatformTarget) -> Result<RawSnapshot, FetchFailure> {
        (**self).fetch_snapshot(target).await
    }
}
