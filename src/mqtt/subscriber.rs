use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, Outgoing, Packet, QoS};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::SENSOR_TOPIC;

/// Pause after a connection error before polling (and thus reconnecting) again.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
/// How long shutdown waits for the DISCONNECT packet to go out.
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// What happened to one inbound publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Forwarded {
    Queued,
    /// Ingest queue full; message dropped.
    Dropped,
    /// Not the sensor topic.
    Ignored,
    /// Ingest worker is gone.
    Closed,
}

/// Drive the MQTT connection until `shutdown` is cancelled or the client
/// disconnects.
///
/// Subscribes to the sensor topic on every `ConnAck`, so a broker-side
/// reconnect restores the subscription. Sensor payloads go into `queue`
/// without waiting: when it is full the message is dropped with a warning.
/// `shutdown` is honoured while polling and while backing off, so an
/// unreachable broker cannot hold the process up.
pub async fn run_event_loop(
    client: AsyncClient,
    mut eventloop: EventLoop,
    queue: mpsc::Sender<Vec<u8>>,
    shutdown: CancellationToken,
) {
    info!(topic = SENSOR_TOPIC, "MQTT event loop started");

    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => {
                disconnect(&client, &mut eventloop).await;
                break;
            }
            event = eventloop.poll() => event,
        };

        match event {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to MQTT broker");
                if let Err(e) = client.try_subscribe(SENSOR_TOPIC, QoS::AtMostOnce) {
                    error!(topic = SENSOR_TOPIC, error = %e, "Failed to subscribe to sensor topic");
                }
            }
            Ok(Event::Incoming(Packet::SubAck(_))) => {
                info!(topic = SENSOR_TOPIC, "Subscribed to sensor topic");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                forward_message(&queue, &publish.topic, &publish.payload);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("MQTT client disconnecting");
                break;
            }
            Ok(_) => {}
            Err(ConnectionError::RequestsDone) => {
                debug!("All MQTT client handles dropped");
                break;
            }
            Err(e) => {
                error!(error = %e, "MQTT connection error; retrying");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                }
            }
        }
    }

    info!("MQTT event loop stopped");
}

/// Best-effort DISCONNECT, bounded by `DISCONNECT_GRACE`.
async fn disconnect(client: &AsyncClient, eventloop: &mut EventLoop) {
    if let Err(e) = client.try_disconnect() {
        debug!(error = %e, "Could not queue MQTT disconnect");
        return;
    }

    let flushed = tokio::time::timeout(DISCONNECT_GRACE, async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => return true,
                Ok(_) => {}
                Err(_) => return false,
            }
        }
    })
    .await;

    if !matches!(flushed, Ok(true)) {
        warn!("MQTT disconnect not sent; broker unreachable");
    }
}

pub(crate) fn forward_message(queue: &mpsc::Sender<Vec<u8>>, topic: &str, payload: &[u8]) -> Forwarded {
    if topic != SENSOR_TOPIC {
        debug!(topic = %topic, "Ignoring message on unexpected topic");
        return Forwarded::Ignored;
    }

    match queue.try_send(payload.to_vec()) {
        Ok(()) => Forwarded::Queued,
        Err(TrySendError::Full(_)) => {
            warn!(topic = %topic, payload_size = payload.len(), "Ingest queue full; dropping telemetry message");
            Forwarded::Dropped
        }
        Err(TrySendError::Closed(_)) => {
            error!(topic = %topic, "Ingest worker stopped; dropping telemetry message");
            Forwarded::Closed
        }
    }
}
