use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::models::ControlSettings;

/// In-memory copy of the most recently published control command.
///
/// Starts as `MANUAL` with both outputs off and is overwritten after every
/// successful publish. Not persisted: the `control_commands` table stays the
/// authoritative history. Clones share the same value.
#[derive(Clone, Default)]
pub struct LastCommandCache {
    inner: Arc<RwLock<ControlSettings>>,
}

impl LastCommandCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached command. Last write wins.
    pub async fn set(&self, settings: ControlSettings) {
        *self.inner.write().await = settings;
    }

    pub async fn get(&self) -> ControlSettings {
        *self.inner.read().await
    }
}
