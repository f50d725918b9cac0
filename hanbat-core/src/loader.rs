//! Loading of a map SDK that may also be loaded by someone else.
//!
//! The SDK is a process-wide resource: another part of the application can load it
//! first and announce readiness. [`SdkLoader`] triggers at most one load and lets every
//! caller wait on the same readiness signal.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::map::MapError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Load state of the SDK.
pub enum SdkStatus {
    /// Nobody asked for the SDK yet.
    Idle,
    /// A load is in flight.
    Loading,
    /// The SDK can be used.
    Ready,
    /// Loading failed; terminal for this session.
    Failed(MapError),
}

impl SdkStatus {
    /// Whether waiting is over.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed(_))
    }
}

#[async_trait(?Send)]
/// Whatever actually brings the SDK into the process.
pub trait ScriptSource {
    /// Whether the SDK is already available without loading.
    fn is_loaded(&self) -> bool;

    /// Load the SDK.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] describing why the SDK is unusable.
    async fn load(&self) -> Result<(), MapError>;
}

/// Idempotent SDK loader with a shared readiness signal.
pub struct SdkLoader<S> {
    source: S,
    status: watch::Sender<SdkStatus>,
}

impl<S: ScriptSource> SdkLoader<S> {
    /// Create an idle loader.
    #[must_use]
    pub fn new(source: S) -> Self {
        let (status, _) = watch::channel(SdkStatus::Idle);
        Self { source, status }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SdkStatus {
        self.status.borrow().clone()
    }

    /// Readiness event raised by whoever loaded the SDK elsewhere.
    pub fn announce_ready(&self) {
        self.status.send_if_modified(|status| {
            if status.is_settled() {
                return false;
            }
            log::debug!("Map SDK announced ready");
            *status = SdkStatus::Ready;
            true
        });
    }

    /// Failure reported by whoever tried to load the SDK elsewhere. Terminal, like a
    /// failed load of our own.
    pub fn announce_failed(&self, err: MapError) {
        self.status.send_if_modified(|status| {
            if status.is_settled() {
                return false;
            }
            log::error!("Map SDK failed to load: {err}");
            *status = SdkStatus::Failed(err.clone());
            true
        });
    }

    /// Resolve once the SDK is usable, loading it if nobody else does.
    ///
    /// # Errors
    ///
    /// Returns the [`MapError`] the load failed with, now or earlier.
    pub async fn ensure_ready(&self) -> Result<(), MapError> {
        let mut status_rx = self.status.subscribe();

        if self.source.is_loaded() {
            self.announce_ready();
        }

        let claimed = self.status.send_if_modified(|status| {
            if *status != SdkStatus::Idle {
                return false;
            }
            *status = SdkStatus::Loading;
            true
        });

        if claimed {
            log::debug!("Loading map SDK");
            let outcome = self.source.load().await;
            if let Err(err) = &outcome {
                log::error!("Map SDK failed to load: {err}");
            }
            self.status.send_if_modified(|status| {
                // The readiness event may have settled things while we were loading.
                if *status != SdkStatus::Loading {
                    return false;
                }
                *status = match outcome {
                    Ok(()) => SdkStatus::Ready,
                    Err(err) => SdkStatus::Failed(err),
                };
                true
            });
        }

        let Ok(settled) = status_rx.wait_for(SdkStatus::is_settled).await else {
            return Err(MapError::NotReady);
        };
        match &*settled {
            SdkStatus::Failed(err) => Err(err.clone()),
            SdkStatus::Ready => Ok(()),
            SdkStatus::Idle | SdkStatus::Loading => Err(MapError::NotReady),
        }
    }
}
