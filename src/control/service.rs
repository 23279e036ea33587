use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use super::request::{parse_control_request, ValidationError};
use crate::{
    command_cache::LastCommandCache,
    db::{models::ControlCommand, ControlCommandRepository},
    mqtt::CommandPublisher,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("failed to publish control command: {0}")]
    Publish(anyhow::Error),
    /// The device already received the command; only the record is missing.
    #[error("control command published but not persisted: {0}")]
    Persist(anyhow::Error),
}

/// Validates control requests, sends them to the device and records them.
pub struct CommandDispatcher {
    publisher: Arc<dyn CommandPublisher>,
    commands: Arc<dyn ControlCommandRepository>,
    last_command: LastCommandCache,
}

impl CommandDispatcher {
    pub fn new(
        publisher: Arc<dyn CommandPublisher>,
        commands: Arc<dyn ControlCommandRepository>,
        last_command: LastCommandCache,
    ) -> Self {
        Self {
            publisher,
            commands,
            last_command,
        }
    }

    /// validate → publish → remember → persist.
    ///
    /// Nothing is published or stored for an invalid body, and nothing is
    /// stored when the publish fails.
    pub async fn dispatch(&self, body: &Value) -> Result<ControlCommand, DispatchError> {
        let settings = parse_control_request(body)?;

        self.publisher.publish(settings).await.map_err(|e| {
            error!(error = %e, mode = %settings.mode, "Failed to publish control command");
            DispatchError::Publish(e)
        })?;

        info!(
            mode = %settings.mode,
            fan = settings.fan,
            sprinkler = settings.sprinkler,
            "Control command published"
        );
        self.last_command.set(settings).await;

        // Logged once, by the HTTP layer.
        let command = self
            .commands
            .insert(settings)
            .await
            .map_err(DispatchError::Persist)?;

        info!(id = %command.id, "Control command persisted");
        Ok(command)
    }
}
