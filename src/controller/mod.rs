//! Input controllers.
//!
//! A controller owns one input source's acquisition lifecycle and turns its
//! raw tracking output into intent events. Implementations are independent
//! types behind a capability trait; the registry selects one by string key
//! and owns the session state that arbitrates concurrent initializations.

mod webcam;

pub use webcam::{TrackingPlatform, WebcamController};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Controller lifecycle status, driving host UI affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerStatus {
    Idle,
    Initializing,
    Active,
    Error,
    PermissionDenied,
}

/// Capability interface implemented per input source.
#[async_trait]
pub trait InputController: Send + Sync {
    /// Acquire the input hardware and tracking model. Failure is reported
    /// through `status` and the returned error; it is never fatal to the
    /// host, which may retry by calling `initialize` again.
    async fn initialize(&self) -> Result<(), CoreError>;

    /// Begin submitting frames.
    fn start(&self);

    /// Stop submitting frames without releasing resources.
    fn stop(&self);

    /// Release all resources. Idempotent.
    async fn destroy(&self);

    fn status(&self) -> ControllerStatus;

    /// Machine-readable code for the most recent error, if any.
    fn error_code(&self) -> Option<String>;

    /// Current world zoom, used to keep screen-space gesture speed constant.
    fn set_zoom_level(&self, level: f32);
}

type ControllerFactory = Box<dyn Fn() -> Arc<dyn InputController> + Send + Sync>;

/// Session-scoped controller registry.
///
/// Explicit replacement for module-level singletons: the host constructs
/// one registry, registers factories under string keys, and tears the
/// whole thing down with `shutdown`. The monotonic attempt counter
/// guarantees at most one live input session: an `activate` that resolves
/// after a newer attempt began discards its result and tears down the
/// controller it produced.
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
    attempt: AtomicU64,
    active: tokio::sync::Mutex<Option<Arc<dyn InputController>>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            attempt: AtomicU64::new(0),
            active: tokio::sync::Mutex::new(None),
        }
    }

    /// Register an input source under a key, e.g. "webcam".
    pub fn register(
        &mut self,
        key: impl Into<String>,
        factory: impl Fn() -> Arc<dyn InputController> + Send + Sync + 'static,
    ) {
        self.factories.insert(key.into(), Box::new(factory));
    }

    /// Build, initialize, and start the controller registered under `key`.
    ///
    /// If another `activate` begins while this one is still resolving, the
    /// stale attempt is discarded: its controller is destroyed rather than
    /// started, and `CoreError::Superseded` is returned.
    pub async fn activate(&self, key: &str) -> Result<Arc<dyn InputController>, CoreError> {
        let factory = self.factories.get(key).ok_or_else(|| {
            CoreError::InitializationFailed(format!("unknown input source: {key}"))
        })?;

        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        let controller = factory();

        let result = controller.initialize().await;

        if self.attempt.load(Ordering::SeqCst) != attempt {
            tracing::debug!(key, attempt, "discarding superseded initialization");
            controller.destroy().await;
            return Err(CoreError::Superseded);
        }
        result?;

        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            previous.destroy().await;
        }
        controller.start();
        *active = Some(Arc::clone(&controller));
        tracing::info!(key, "input controller active");
        Ok(controller)
    }

    /// Destroy the active controller, if any. Idempotent.
    pub async fn shutdown(&self) {
        if let Some(controller) = self.active.lock().await.take() {
            controller.destroy().await;
        }
    }

    /// Status of the active controller, or `Idle` when none is active.
    pub async fn status(&self) -> ControllerStatus {
        match self.active.lock().await.as_ref() {
            Some(controller) => controller.status(),
            None => ControllerStatus::Idle,
        }
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
